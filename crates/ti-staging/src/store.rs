//! The staging store: write side ([`StagingStore`]) used during ingestion
//! and read side ([`StagingReader`]) used during write-back.
//!
//! # Schema
//!
//! ```text
//! transport_route      (id PK, type, operator, ref, name, name_en, dist)
//! transport_route_stop (stop, route, ord, direction, PK(route, ord, direction))
//!                      + indexes on stop and on route
//! transport_stop       (id PK, latitude, longitude, name, name_en)
//!                      + index on (latitude, longitude)
//! ```
//!
//! `direction` is `1` for forward and `0` for backward; `ord` is the position
//! of the stop within that direction's sequence, from 0.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, OptionalExtension};

use ti_core::{DEFAULT_BATCH_SIZE, Direction, RouteId, StopId};

use crate::batch::RecordBatch;
use crate::row::{RouteRow, RouteStopRow, StopRow};
use crate::StagingResult;

/// Schema version stored in `PRAGMA user_version`.
pub const TRANSPORT_TABLE_VERSION: i64 = 1;

const SCHEMA: &str = "
    CREATE TABLE transport_route (
        id       BIGINT PRIMARY KEY,
        type     VARCHAR(255),
        operator VARCHAR(255),
        ref      VARCHAR(255),
        name     VARCHAR(255),
        name_en  VARCHAR(255),
        dist     INT
    );
    CREATE TABLE transport_route_stop (
        stop      BIGINT,
        route     BIGINT,
        ord       INT,
        direction SMALLINT,
        PRIMARY KEY (route, ord, direction)
    );
    CREATE INDEX transport_route_stop_stop  ON transport_route_stop (stop);
    CREATE INDEX transport_route_stop_route ON transport_route_stop (route);
    CREATE TABLE transport_stop (
        id        BIGINT PRIMARY KEY,
        latitude  DOUBLE,
        longitude DOUBLE,
        name      VARCHAR(255),
        name_en   VARCHAR(255)
    );
    CREATE INDEX transport_stop_location ON transport_stop (latitude, longitude);
";

// ── Write side ────────────────────────────────────────────────────────────────

/// Batched sink for routes, stops, and route-stop associations.
///
/// Each record kind has its own [`RecordBatch`]; rows become visible to
/// readers only after their batch commits.  Call [`finish`](Self::finish)
/// to commit the tail and switch to read-only access.
pub struct StagingStore {
    conn:        Connection,
    routes:      RecordBatch<RouteRow>,
    stops:       RecordBatch<StopRow>,
    route_stops: RecordBatch<RouteStopRow>,
}

impl StagingStore {
    /// Create a fresh staging database at `path`, deleting any previous one.
    pub fn create(path: &Path, batch_size: usize) -> StagingResult<Self> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;",
        )?;
        Self::init(conn, batch_size)
    }

    /// Staging in a private in-memory database.
    pub fn in_memory() -> StagingResult<Self> {
        Self::init(Connection::open_in_memory()?, DEFAULT_BATCH_SIZE)
    }

    fn init(conn: Connection, batch_size: usize) -> StagingResult<Self> {
        conn.execute_batch(SCHEMA)?;
        conn.pragma_update(None, "user_version", TRANSPORT_TABLE_VERSION)?;
        Ok(Self {
            conn,
            routes:      RecordBatch::new(batch_size),
            stops:       RecordBatch::new(batch_size),
            route_stops: RecordBatch::new(batch_size),
        })
    }

    pub fn insert_route(&mut self, row: RouteRow) -> StagingResult<()> {
        self.routes.add(&self.conn, row)?;
        Ok(())
    }

    /// Queue a stop row.  The caller guarantees each stop id is inserted at
    /// most once per build; a second insert fails at commit on the primary
    /// key.
    pub fn insert_stop(&mut self, row: StopRow) -> StagingResult<()> {
        self.stops.add(&self.conn, row)?;
        Ok(())
    }

    pub fn insert_route_stop(&mut self, row: RouteStopRow) -> StagingResult<()> {
        self.route_stops.add(&self.conn, row)?;
        Ok(())
    }

    /// Rows queued but not yet committed, across all record kinds.
    pub fn pending(&self) -> usize {
        self.routes.pending() + self.stops.pending() + self.route_stops.pending()
    }

    /// Commit every pending batch and return a read-only view.
    pub fn finish(mut self) -> StagingResult<StagingReader> {
        self.routes.flush(&self.conn)?;
        self.stops.flush(&self.conn)?;
        self.route_stops.flush(&self.conn)?;
        log::info!(
            "staging committed: {} routes, {} stops, {} route stops",
            self.routes.written(),
            self.stops.written(),
            self.route_stops.written()
        );
        self.conn.pragma_update(None, "query_only", true)?;
        Ok(StagingReader { conn: self.conn })
    }
}

// ── Read side ─────────────────────────────────────────────────────────────────

/// Row counts of the three staging tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StagingCounts {
    pub routes:      u64,
    pub stops:       u64,
    pub route_stops: u64,
}

/// Read-only queries over committed staging content.
pub struct StagingReader {
    conn: Connection,
}

impl StagingReader {
    /// Open an existing staging database read-only.
    pub fn open(path: &Path) -> StagingResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Every staged route, in insertion order.
    pub fn routes(&self) -> StagingResult<Vec<RouteRow>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, type, operator, ref, name, name_en, dist \
             FROM transport_route ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |r| {
            Ok(RouteRow {
                id:       RouteId(r.get(0)?),
                mode:     r.get(1)?,
                operator: r.get(2)?,
                r#ref:    r.get(3)?,
                name:     r.get::<_, Option<String>>(4)?.unwrap_or_default(),
                name_en:  r.get(5)?,
                distance: r.get(6)?,
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Stops of `route` with their direction, each direction in ordinal order.
    pub fn route_stops(&self, route: RouteId) -> StagingResult<Vec<(Direction, StopRow)>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT S.direction, A.id, A.latitude, A.longitude, A.name, A.name_en \
             FROM transport_route_stop S INNER JOIN transport_stop A ON A.id = S.stop \
             WHERE S.route = ?1 ORDER BY S.direction DESC, S.ord ASC",
        )?;
        let rows = stmt.query_map([route.0], |r| {
            Ok((
                Direction::from_flag(r.get(0)?),
                StopRow {
                    id:        StopId(r.get(1)?),
                    latitude:  r.get(2)?,
                    longitude: r.get(3)?,
                    name:      r.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    name_en:   r.get(5)?,
                },
            ))
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn stop(&self, id: StopId) -> StagingResult<Option<StopRow>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, latitude, longitude, name, name_en FROM transport_stop WHERE id = ?1",
        )?;
        let row = stmt
            .query_row([id.0], |r| {
                Ok(StopRow {
                    id:        StopId(r.get(0)?),
                    latitude:  r.get(1)?,
                    longitude: r.get(2)?,
                    name:      r.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    name_en:   r.get(4)?,
                })
            })
            .optional()?;
        Ok(row)
    }

    /// Distinct routes with an association to `stop`, ascending by id.
    pub fn routes_for_stop(&self, stop: StopId) -> StagingResult<Vec<RouteId>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT DISTINCT route FROM transport_route_stop WHERE stop = ?1 ORDER BY route",
        )?;
        let rows = stmt.query_map([stop.0], |r| r.get(0).map(RouteId))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Associations of one route, in `(direction, ordinal)` order.
    pub fn associations(&self, route: RouteId) -> StagingResult<Vec<RouteStopRow>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT route, stop, direction, ord FROM transport_route_stop \
             WHERE route = ?1 ORDER BY direction DESC, ord ASC",
        )?;
        let rows = stmt.query_map([route.0], |r| {
            Ok(RouteStopRow {
                route:     RouteId(r.get(0)?),
                stop:      StopId(r.get(1)?),
                direction: Direction::from_flag(r.get(2)?),
                ordinal:   r.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn counts(&self) -> StagingResult<StagingCounts> {
        let count = |table: &str| -> rusqlite::Result<u64> {
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get::<_, i64>(0))
                .map(|n| n as u64)
        };
        Ok(StagingCounts {
            routes:      count("transport_route")?,
            stops:       count("transport_stop")?,
            route_stops: count("transport_route_stop")?,
        })
    }

    /// Schema version recorded by the writer.
    pub fn schema_version(&self) -> StagingResult<i64> {
        Ok(self.conn.pragma_query_value(None, "user_version", |r| r.get(0))?)
    }
}
