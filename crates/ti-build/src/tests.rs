//! End-to-end tests for ti-build.

#[cfg(test)]
mod fixtures {
    use std::io::Cursor;

    use tempfile::TempDir;
    use ti_binary::{read_index, TransportIndex};
    use ti_core::{BuildConfig, GeoPoint};
    use ti_extract::{MemberElement, OsmNode, Relation};

    use crate::{BuildSummary, TransportIndexBuilder};

    pub fn location(stop: i64) -> GeoPoint {
        GeoPoint::new(52.30 + (stop % 10) as f64 * 0.004, 4.80 + (stop / 10) as f64 * 0.004)
    }

    pub fn node(stop: i64) -> MemberElement {
        MemberElement::Node(OsmNode::new(stop, location(stop)).with_tag("name", &format!("Stop {stop}")))
    }

    /// Bus route `id` calling at `stops` in both directions.
    pub fn bus(id: i64, stops: &[i64]) -> Relation {
        stops.iter().fold(
            Relation::new(id).with_tag("route", "bus").with_tag("ref", &id.to_string()),
            |rel, &s| rel.with_member("stop", node(s)),
        )
    }

    pub fn builder(dir: &TempDir) -> TransportIndexBuilder {
        TransportIndexBuilder::create(BuildConfig::new(dir.path(), "Test").with_batch_size(7)).unwrap()
    }

    pub fn write(builder: TransportIndexBuilder) -> (BuildSummary, TransportIndex) {
        let mut out = Cursor::new(Vec::new());
        let summary = builder.write_index(&mut out).unwrap();
        (summary, read_index(out.get_ref()).unwrap())
    }
}

// ── Configuration and ingestion ───────────────────────────────────────────────

#[cfg(test)]
mod ingestion {
    use ti_core::{BuildConfig, Direction, RouteId, StopId};
    use ti_extract::Relation;
    use ti_staging::StagingReader;

    use super::fixtures::{builder, bus, write};
    use crate::{BuildError, TransportIndexBuilder};

    #[test]
    fn invalid_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuildConfig::new(dir.path(), "  ");
        assert!(matches!(TransportIndexBuilder::create(config), Err(BuildError::Core(_))));
    }

    #[test]
    fn rejected_relations_counted() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = builder(&dir);
        assert!(b.ingest_relation(&bus(1, &[1, 2])).unwrap());
        let foot = Relation::new(2).with_tag("route", "foot").with_tag("ref", "x");
        assert!(!b.ingest_relation(&foot).unwrap());
        let summary = b.ingest_summary();
        assert_eq!((summary.relations, summary.rejected, summary.routes), (2, 1, 1));
    }

    #[test]
    fn shared_stop_staged_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = builder(&dir);
        b.ingest_relation(&bus(1, &[1, 2, 3])).unwrap();
        b.ingest_relation(&bus(2, &[3, 4])).unwrap();
        assert_eq!(b.ingest_summary().stops, 4);
        let staging_path = b.config().staging_path.clone();
        let (summary, index) = write(b);

        let reader = StagingReader::open(&staging_path).unwrap();
        let counts = reader.counts().unwrap();
        assert_eq!(counts.stops, 4);
        // Both directions of both routes.
        assert_eq!(counts.route_stops, 10);
        assert_eq!(reader.routes_for_stop(StopId(3)).unwrap(), [RouteId(1), RouteId(2)]);

        assert_eq!(summary.write.stops_written, 4);
        let ids: Vec<i64> = index.stops().iter().map(|s| s.id.0).collect();
        assert_eq!(ids.iter().filter(|&&id| id == 3).count(), 1);
        let shared = index.stops().into_iter().find(|s| s.id == StopId(3)).unwrap();
        assert_eq!(shared.routes.len(), 2);
    }

    #[test]
    fn associations_use_emitted_positions() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = builder(&dir);
        b.ingest_relation(&bus(1, &[10, 11, 12])).unwrap();
        let staging_path = b.config().staging_path.clone();
        write(b);

        let reader = StagingReader::open(&staging_path).unwrap();
        let rows = reader.associations(RouteId(1)).unwrap();
        let seq: Vec<(Direction, u32, i64)> =
            rows.iter().map(|r| (r.direction, r.ordinal, r.stop.0)).collect();
        assert_eq!(
            seq,
            [
                (Direction::Forward, 0, 10),
                (Direction::Forward, 1, 11),
                (Direction::Forward, 2, 12),
                (Direction::Backward, 0, 10),
                (Direction::Backward, 1, 11),
                (Direction::Backward, 2, 12),
            ]
        );
    }
}

// ── Write-back ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod write_back {
    use ti_binary::IndexTreeNode;
    use ti_core::{Direction, GeoPoint, OutputRouteId, RouteId, StopId, TileRect, TransportStop, STOP_ZOOM};
    use ti_spatial::StopTree;
    use ti_staging::RouteStopRow;

    use super::fixtures::{builder, bus, location, write};

    fn check_boxes(node: &IndexTreeNode) {
        let mut rects: Vec<TileRect> = node.children.iter().map(|c| c.rect).collect();
        rects.extend(node.stops.iter().map(|s| TileRect::point(s.tile)));
        assert_eq!(TileRect::covering(&rects), Some(node.rect));
        node.children.iter().for_each(check_boxes);
    }

    #[test]
    fn routes_in_staging_order_with_directions() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = builder(&dir);
        b.ingest_relation(&bus(20, &[1, 2, 3])).unwrap();
        b.ingest_relation(&bus(10, &[3, 4])).unwrap();
        let (summary, index) = write(b);

        assert_eq!(summary.write.routes_written, 2);
        assert_eq!(index.name, "Test");
        let ids: Vec<i64> = index.routes.iter().map(|r| r.id).collect();
        assert_eq!(ids, [20, 10]);
        let first = &index.routes[0];
        let fwd: Vec<i64> = first.forward.iter().map(|s| s.id.0).collect();
        let bwd: Vec<i64> = first.backward.iter().map(|s| s.id.0).collect();
        assert_eq!(fwd, [1, 2, 3]);
        assert_eq!(bwd, [1, 2, 3]);
        assert_eq!(index.string(first.mode), Some("bus"));
        assert!(first.distance > 0);
    }

    #[test]
    fn leaf_coordinates_within_one_tile() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = builder(&dir);
        let stops: Vec<i64> = (0..40).collect();
        b.ingest_relation(&bus(1, &stops)).unwrap();
        let (_, index) = write(b);

        let decoded = index.stops();
        assert_eq!(decoded.len(), 40);
        for s in decoded {
            let src = location(s.id.0);
            let corner = s.tile.to_geo(STOP_ZOOM);
            let next = ti_core::TilePoint::new(s.tile.x + 1, s.tile.y + 1).to_geo(STOP_ZOOM);
            let eps = 1e-9;
            assert!(src.lon >= corner.lon - eps && src.lon <= next.lon + eps);
            assert!(src.lat <= corner.lat + eps && src.lat >= next.lat - eps);
        }
    }

    #[test]
    fn tree_boxes_cover_children() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = builder(&dir);
        let stops: Vec<i64> = (0..60).collect();
        b.ingest_relation(&bus(1, &stops)).unwrap();
        let tree_path = b.config().tree_path.clone();
        let (_, index) = write(b);

        let root = index.tree.as_ref().unwrap();
        assert!(!root.children.is_empty());
        check_boxes(root);

        let mut tree = StopTree::open(&tree_path).unwrap();
        assert_eq!(tree.leaf_count(), 60);
        assert_eq!(tree.root().unwrap().bounds(), Some(root.rect));
    }

    #[test]
    fn stop_routes_reference_output_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = builder(&dir);
        b.ingest_relation(&bus(50, &[1, 2])).unwrap();
        b.ingest_relation(&bus(40, &[2])).unwrap();
        let (_, index) = write(b);

        let shared = index.stops().into_iter().find(|s| s.id == StopId(2)).unwrap();
        // routes_for_stop is ascending by source id: 40 (output 1), 50 (output 0).
        assert_eq!(shared.routes, [OutputRouteId(1), OutputRouteId(0)]);
    }

    #[test]
    fn empty_build_has_no_tree() {
        let dir = tempfile::tempdir().unwrap();
        let (summary, index) = write(builder(&dir));
        assert!(index.tree.is_none());
        assert!(index.routes.is_empty());
        assert_eq!(summary.write.strings, 8);
        assert_eq!(index.strings.len(), 8);
    }

    #[test]
    fn unknown_route_reference_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = builder(&dir);
        b.ingest_relation(&bus(1, &[1, 2])).unwrap();
        b.staging
            .insert_route_stop(RouteStopRow {
                route:     RouteId(999),
                stop:      StopId(2),
                direction: Direction::Forward,
                ordinal:   0,
            })
            .unwrap();
        let (summary, index) = write(b);

        assert_eq!(summary.write.dangling_routes, 1);
        assert_eq!(summary.write.stops_written, 2);
        let stop = index.stops().into_iter().find(|s| s.id == StopId(2)).unwrap();
        assert_eq!(stop.routes, [OutputRouteId(0)]);
    }

    #[test]
    fn leaf_without_staged_stop_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = builder(&dir);
        b.ingest_relation(&bus(1, &[1])).unwrap();
        let ghost = TransportStop::new(StopId(77), GeoPoint::new(52.31, 4.81), "ghost");
        b.spatial.insert(&ghost).unwrap();
        let (summary, index) = write(b);

        assert_eq!(summary.write.dangling_stops, 1);
        assert_eq!(summary.write.stops_written, 1);
        let ids: Vec<StopId> = index.stops().iter().map(|s| s.id).collect();
        assert_eq!(ids, [StopId(1)]);
    }

    #[test]
    fn english_name_equal_to_transliteration_dropped() {
        use ti_extract::{MemberElement, OsmNode, Relation};

        let dir = tempfile::tempdir().unwrap();
        let mut b = builder(&dir);
        let node = OsmNode::new(5, location(5))
            .with_tag("name", "Москва")
            .with_tag("name:en", "Moskva");
        let rel = Relation::new(1)
            .with_tag("route", "subway")
            .with_tag("ref", "2")
            .with_tag("name", "Линия 2")
            .with_tag("name:en", "Line 2")
            .with_member("stop", MemberElement::Node(node));
        b.ingest_relation(&rel).unwrap();
        let (_, index) = write(b);

        let stop = index.stops()[0];
        assert_eq!(index.string(stop.name), Some("Москва"));
        assert_eq!(stop.name_en, None);
        let route = &index.routes[0];
        assert_eq!(index.string(route.mode), Some("subway"));
        assert_eq!(index.string(route.name_en.unwrap()), Some("Line 2"));
        assert_eq!(route.forward[0].name_en, None);
    }
}
