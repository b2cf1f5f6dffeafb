//! Unit tests for ti-staging.

#[cfg(test)]
mod fixtures {
    use ti_core::{Direction, GeoPoint, RouteId, StopId, TransportMode, TransportRoute, TransportStop};

    use crate::{RouteRow, RouteStopRow, StopRow};

    pub fn route(id: i64) -> RouteRow {
        let mut r = TransportRoute::new(RouteId(id), TransportMode::Bus, format!("{id}"));
        r.name = format!("Line {id}");
        RouteRow::from(&r)
    }

    pub fn stop(id: i64) -> StopRow {
        let s = TransportStop::new(StopId(id), GeoPoint::new(52.0 + id as f64 * 1e-3, 4.9), format!("Stop {id}"));
        StopRow::from(&s)
    }

    pub fn link(route: i64, stop: i64, direction: Direction, ordinal: u32) -> RouteStopRow {
        RouteStopRow { route: RouteId(route), stop: StopId(stop), direction, ordinal }
    }
}

// ── Batching ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod batching {
    use rusqlite::Connection;

    use super::fixtures::{route, stop};
    use crate::{RecordBatch, RouteRow, StagingError, StagingStore};

    fn route_table() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE transport_route (id BIGINT PRIMARY KEY, type, operator, ref, name, name_en, dist)",
        )
        .unwrap();
        conn
    }

    fn route_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM transport_route", [], |r| r.get(0)).unwrap()
    }

    #[test]
    fn flush_triggered_at_threshold() {
        let conn = route_table();
        let mut batch: RecordBatch<RouteRow> = RecordBatch::new(3);
        assert!(!batch.add(&conn, route(1)).unwrap());
        assert!(!batch.add(&conn, route(2)).unwrap());
        assert_eq!(route_count(&conn), 0);
        assert!(batch.add(&conn, route(3)).unwrap());
        assert_eq!(route_count(&conn), 3);
        assert_eq!(batch.pending(), 0);
        assert_eq!(batch.written(), 3);
    }

    #[test]
    fn explicit_flush_writes_tail() {
        let conn = route_table();
        let mut batch: RecordBatch<RouteRow> = RecordBatch::new(10);
        batch.add(&conn, route(1)).unwrap();
        batch.add(&conn, route(2)).unwrap();
        assert_eq!(batch.flush(&conn).unwrap(), 2);
        assert_eq!(batch.flush(&conn).unwrap(), 0);
        assert_eq!(route_count(&conn), 2);
    }

    #[test]
    fn zero_threshold_treated_as_one() {
        let conn = route_table();
        let mut batch: RecordBatch<RouteRow> = RecordBatch::new(0);
        assert!(batch.add(&conn, route(1)).unwrap());
        assert_eq!(route_count(&conn), 1);
    }

    #[test]
    fn failed_flush_keeps_rows_pending() {
        let conn = route_table();
        let mut batch: RecordBatch<RouteRow> = RecordBatch::new(10);
        batch.add(&conn, route(1)).unwrap();
        batch.add(&conn, route(1)).unwrap();
        assert!(matches!(batch.flush(&conn), Err(StagingError::Sqlite(_))));
        assert_eq!(batch.pending(), 2);
        assert_eq!(route_count(&conn), 0);
    }

    #[test]
    fn store_tracks_pending_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = StagingStore::create(&dir.path().join("staging.db"), 2).unwrap();
        store.insert_route(route(1)).unwrap();
        assert_eq!(store.pending(), 1);
        store.insert_route(route(2)).unwrap();
        assert_eq!(store.pending(), 0);
        store.insert_stop(stop(7)).unwrap();
        assert_eq!(store.pending(), 1);
    }

    #[test]
    fn duplicate_stop_rejected() {
        let mut store = StagingStore::in_memory().unwrap();
        store.insert_stop(stop(7)).unwrap();
        store.insert_stop(stop(7)).unwrap();
        assert!(matches!(store.finish(), Err(StagingError::Sqlite(_))));
    }
}

// ── Read-back ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod read_back {
    use tempfile::TempDir;
    use ti_core::{Direction, RouteId, StopId, TransportStop};

    use super::fixtures::{link, route, stop};
    use crate::{StagingCounts, StagingReader, StagingStore, TRANSPORT_TABLE_VERSION};

    /// Two routes sharing stop 2.  Route 30 is inserted before route 10.
    fn populated(dir: &TempDir) -> StagingReader {
        let mut store = StagingStore::create(&dir.path().join("transport.db"), 2).unwrap();
        store.insert_route(route(30)).unwrap();
        store.insert_route(route(10)).unwrap();
        for id in 1..=3 {
            store.insert_stop(stop(id)).unwrap();
        }
        store.insert_route_stop(link(30, 1, Direction::Forward, 0)).unwrap();
        store.insert_route_stop(link(30, 2, Direction::Forward, 1)).unwrap();
        store.insert_route_stop(link(30, 2, Direction::Backward, 0)).unwrap();
        store.insert_route_stop(link(30, 1, Direction::Backward, 1)).unwrap();
        store.insert_route_stop(link(10, 3, Direction::Forward, 1)).unwrap();
        store.insert_route_stop(link(10, 2, Direction::Forward, 0)).unwrap();
        store.finish().unwrap()
    }

    #[test]
    fn routes_in_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let reader = populated(&dir);
        let ids: Vec<i64> = reader.routes().unwrap().iter().map(|r| r.id.0).collect();
        assert_eq!(ids, [30, 10]);
        assert_eq!(reader.routes().unwrap()[0].name, "Line 30");
        assert_eq!(reader.routes().unwrap()[0].mode, "bus");
    }

    #[test]
    fn route_stops_forward_first_then_by_ordinal() {
        let dir = tempfile::tempdir().unwrap();
        let reader = populated(&dir);
        let seq: Vec<(Direction, i64)> = reader
            .route_stops(RouteId(30))
            .unwrap()
            .into_iter()
            .map(|(d, s)| (d, s.id.0))
            .collect();
        assert_eq!(
            seq,
            [
                (Direction::Forward, 1),
                (Direction::Forward, 2),
                (Direction::Backward, 2),
                (Direction::Backward, 1),
            ]
        );

        let ten: Vec<i64> =
            reader.route_stops(RouteId(10)).unwrap().into_iter().map(|(_, s)| s.id.0).collect();
        assert_eq!(ten, [2, 3]);
    }

    #[test]
    fn routes_for_stop_distinct_and_ascending() {
        let dir = tempfile::tempdir().unwrap();
        let reader = populated(&dir);
        assert_eq!(reader.routes_for_stop(StopId(2)).unwrap(), [RouteId(10), RouteId(30)]);
        assert_eq!(reader.routes_for_stop(StopId(1)).unwrap(), [RouteId(30)]);
        assert!(reader.routes_for_stop(StopId(99)).unwrap().is_empty());
    }

    #[test]
    fn stop_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let reader = populated(&dir);
        let s = reader.stop(StopId(3)).unwrap().unwrap();
        assert_eq!(s.name, "Stop 3");
        assert!((s.latitude - 52.003).abs() < 1e-9);
        assert_eq!(s.location().lon, 4.9);
        assert_eq!(TransportStop::from(s).location.lat, 52.0 + 3.0 * 1e-3);
        assert!(reader.stop(StopId(4)).unwrap().is_none());
    }

    #[test]
    fn associations_keep_ordinals() {
        let dir = tempfile::tempdir().unwrap();
        let reader = populated(&dir);
        let ords: Vec<(Direction, u32)> = reader
            .associations(RouteId(30))
            .unwrap()
            .iter()
            .map(|a| (a.direction, a.ordinal))
            .collect();
        assert_eq!(
            ords,
            [
                (Direction::Forward, 0),
                (Direction::Forward, 1),
                (Direction::Backward, 0),
                (Direction::Backward, 1),
            ]
        );
    }

    #[test]
    fn counts_and_version() {
        let dir = tempfile::tempdir().unwrap();
        let reader = populated(&dir);
        assert_eq!(reader.counts().unwrap(), StagingCounts { routes: 2, stops: 3, route_stops: 6 });
        assert_eq!(reader.schema_version().unwrap(), TRANSPORT_TABLE_VERSION);
    }

    #[test]
    fn reopen_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let reader = populated(&dir);
        drop(reader);
        let reopened = StagingReader::open(&dir.path().join("transport.db")).unwrap();
        assert_eq!(reopened.counts().unwrap().routes, 2);
    }

    #[test]
    fn create_replaces_previous_database() {
        let dir = tempfile::tempdir().unwrap();
        drop(populated(&dir));
        let reader = StagingStore::create(&dir.path().join("transport.db"), 10)
            .unwrap()
            .finish()
            .unwrap();
        assert_eq!(reader.counts().unwrap(), StagingCounts::default());
    }
}
