//! Owned batching helper: buffer rows of one kind and write them in a single
//! transaction once a threshold is reached.

use rusqlite::{Connection, Statement};

use crate::row::{RouteRow, RouteStopRow, StopRow};
use crate::StagingResult;

/// A row type with a fixed insert statement.
pub trait StagingRecord {
    /// Parameterised `INSERT` for this row type.
    const INSERT_SQL: &'static str;

    /// Bind this row's values and execute `stmt` (prepared from `INSERT_SQL`).
    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize>;
}

impl StagingRecord for RouteRow {
    const INSERT_SQL: &'static str =
        "INSERT INTO transport_route (id, type, operator, ref, name, name_en, dist) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(rusqlite::params![
            self.id.0,
            self.mode,
            self.operator,
            self.r#ref,
            self.name,
            self.name_en,
            self.distance,
        ])
    }
}

impl StagingRecord for StopRow {
    const INSERT_SQL: &'static str =
        "INSERT INTO transport_stop (id, latitude, longitude, name, name_en) \
         VALUES (?1, ?2, ?3, ?4, ?5)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(rusqlite::params![
            self.id.0,
            self.latitude,
            self.longitude,
            self.name,
            self.name_en,
        ])
    }
}

impl StagingRecord for RouteStopRow {
    const INSERT_SQL: &'static str =
        "INSERT INTO transport_route_stop (route, stop, direction, ord) \
         VALUES (?1, ?2, ?3, ?4)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(rusqlite::params![
            self.route.0,
            self.stop.0,
            self.direction.as_flag(),
            self.ordinal,
        ])
    }
}

/// Pending rows of one kind.
///
/// [`add`](Self::add) executes and commits the whole batch once `threshold`
/// rows are pending; [`flush`](Self::flush) writes whatever is left.  A
/// failed flush rolls the transaction back and keeps the rows pending.
pub struct RecordBatch<R: StagingRecord> {
    pending:   Vec<R>,
    threshold: usize,
    written:   u64,
}

impl<R: StagingRecord> RecordBatch<R> {
    pub fn new(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self { pending: Vec::with_capacity(threshold), threshold, written: 0 }
    }

    /// Queue `record`; returns `true` when the call triggered a flush.
    pub fn add(&mut self, conn: &Connection, record: R) -> StagingResult<bool> {
        self.pending.push(record);
        if self.pending.len() >= self.threshold {
            self.flush(conn)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Execute all pending rows in one transaction and commit.
    pub fn flush(&mut self, conn: &Connection) -> StagingResult<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        let tx = conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(R::INSERT_SQL)?;
            for record in &self.pending {
                record.insert(&mut stmt)?;
            }
        }
        tx.commit()?;

        let n = self.pending.len();
        self.written += n as u64;
        self.pending.clear();
        log::debug!("staging batch committed: {n} rows ({} total)", self.written);
        Ok(n)
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Rows committed so far.
    #[inline]
    pub fn written(&self) -> u64 {
        self.written
    }
}
