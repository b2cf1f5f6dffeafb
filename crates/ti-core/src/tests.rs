//! Unit tests for ti-core primitives.

#[cfg(test)]
mod ids {
    use crate::{OutputRouteId, RouteId, StopId};

    #[test]
    fn ordering() {
        assert!(StopId(-5) < StopId(1));
        assert!(RouteId(100) > RouteId(99));
    }

    #[test]
    fn display() {
        assert_eq!(StopId(7).to_string(), "StopId(7)");
        assert_eq!(OutputRouteId(3).to_string(), "OutputRouteId(3)");
    }

    #[test]
    fn output_id_from_index() {
        assert_eq!(OutputRouteId::try_from(12usize).unwrap(), OutputRouteId(12));
        assert_eq!(OutputRouteId(12).index(), 12);
    }
}

#[cfg(test)]
mod geo {
    use crate::{CoreError, GeoPoint, TilePoint, TileRect, MAX_LATITUDE, STOP_ZOOM};

    const TILE_DEG: f64 = 360.0 / (1u64 << 24) as f64;

    #[test]
    fn origin_maps_to_grid_centre() {
        let t = GeoPoint::new(0.0, 0.0).to_tile(STOP_ZOOM).unwrap();
        assert_eq!(t, TilePoint::new(1 << 23, 1 << 23));
    }

    #[test]
    fn antimeridian_stays_on_grid() {
        let t = GeoPoint::new(0.0, 180.0).to_tile(STOP_ZOOM).unwrap();
        assert_eq!(t.x, (1 << 24) - 1);
        let west = GeoPoint::new(0.0, -180.0).to_tile(STOP_ZOOM).unwrap();
        assert_eq!(west.x, 0);
    }

    #[test]
    fn polar_latitude_is_clamped() {
        let north = GeoPoint::new(89.9, 0.0).to_tile(STOP_ZOOM).unwrap();
        let south = GeoPoint::new(-89.9, 0.0).to_tile(STOP_ZOOM).unwrap();
        assert_eq!(north, GeoPoint::new(MAX_LATITUDE, 0.0).to_tile(STOP_ZOOM).unwrap());
        assert_eq!(south, GeoPoint::new(-MAX_LATITUDE, 0.0).to_tile(STOP_ZOOM).unwrap());
        assert!(north.y < 64);
        assert!(south.y > (1 << 24) - 64);
    }

    #[test]
    fn invalid_coordinates_rejected() {
        assert!(matches!(
            GeoPoint::new(f64::NAN, 0.0).to_tile(STOP_ZOOM),
            Err(CoreError::InvalidCoordinate { .. })
        ));
        assert!(GeoPoint::new(91.0, 0.0).to_tile(STOP_ZOOM).is_err());
        assert!(GeoPoint::new(0.0, -180.5).to_tile(STOP_ZOOM).is_err());
    }

    #[test]
    fn quantization_round_trip_within_one_tile() {
        for &(lat, lon) in &[(52.370_216, 4.895_168), (-33.868_82, 151.209_29), (55.755_8, 37.617_3)] {
            let p = GeoPoint::new(lat, lon);
            let back = p.to_tile(STOP_ZOOM).unwrap().to_geo(STOP_ZOOM);
            assert!((back.lon - lon).abs() <= TILE_DEG, "lon {lon} → {}", back.lon);
            assert!((back.lat - lat).abs() <= TILE_DEG, "lat {lat} → {}", back.lat);
            // North-west corner: never east or south of the source point.
            assert!(back.lon <= lon);
            assert!(back.lat >= lat);
        }
    }

    #[test]
    fn quantization_is_deterministic() {
        let p = GeoPoint::new(48.856_6, 2.352_2);
        assert_eq!(p.to_tile(STOP_ZOOM).unwrap(), p.to_tile(STOP_ZOOM).unwrap());
    }

    #[test]
    fn one_degree_latitude_distance() {
        let a = GeoPoint::new(30.0, -88.0);
        let b = GeoPoint::new(31.0, -88.0);
        let d = a.distance_m(b);
        assert!((d - 111_195.0).abs() < 50.0, "got {d}");
    }

    #[test]
    fn rect_union_and_covering() {
        let a = TileRect::point(TilePoint::new(5, 9));
        let b = TileRect::new(1, 10, 3, 12);
        let u = a.union(&b);
        assert_eq!(u, TileRect::new(1, 9, 5, 12));
        assert_eq!(TileRect::covering([&a, &b]), Some(u));
        assert_eq!(TileRect::covering(std::iter::empty()), None);
    }

    #[test]
    fn rect_predicates() {
        let r = TileRect::new(0, 0, 10, 10);
        assert!(r.is_well_formed());
        assert!(!TileRect::new(5, 0, 4, 0).is_well_formed());
        assert!(r.intersects(&TileRect::new(10, 10, 20, 20)));
        assert!(!r.intersects(&TileRect::new(11, 0, 20, 10)));
        assert!(r.contains_point(TilePoint::new(10, 0)));
        assert!(!r.contains_point(TilePoint::new(-1, 0)));
    }
}

#[cfg(test)]
mod model {
    use crate::{Direction, GeoPoint, RouteId, StopId, TransportMode, TransportRoute, TransportStop};

    fn stop(id: i64, lat: f64) -> TransportStop {
        TransportStop::new(StopId(id), GeoPoint::new(lat, -88.0), format!("s{id}"))
    }

    #[test]
    fn direction_flags() {
        assert_eq!(Direction::Forward.as_flag(), 1);
        assert_eq!(Direction::Backward.as_flag(), 0);
        assert_eq!(Direction::from_flag(1), Direction::Forward);
        assert_eq!(Direction::from_flag(0), Direction::Backward);
    }

    #[test]
    fn avg_distance_single_direction() {
        let mut r = TransportRoute::new(RouteId(1), TransportMode::Bus, "1");
        r.forward = vec![stop(1, 30.0), stop(2, 31.0)];
        let d = r.avg_both_distance();
        assert!((d as i64 - 111_195).abs() < 50, "got {d}");
    }

    #[test]
    fn avg_distance_both_directions() {
        let mut r = TransportRoute::new(RouteId(1), TransportMode::Bus, "1");
        r.forward = vec![stop(1, 30.0), stop(2, 31.0)];
        r.backward = vec![stop(2, 31.0), stop(3, 30.5), stop(1, 30.0)];
        let d = r.avg_both_distance();
        assert!((d as i64 - 111_195).abs() < 50, "got {d}");
    }

    #[test]
    fn avg_distance_empty_route() {
        let r = TransportRoute::new(RouteId(1), TransportMode::Tram, "T");
        assert_eq!(r.avg_both_distance(), 0);
        assert!(r.stops(Direction::Forward).is_empty());
    }

    #[test]
    fn mode_tags() {
        let modes = [
            TransportMode::Bus,
            TransportMode::Trolleybus,
            TransportMode::ShareTaxi,
            TransportMode::Subway,
            TransportMode::Train,
            TransportMode::Tram,
            TransportMode::Ferry,
        ];
        for mode in modes {
            assert_eq!(TransportMode::from_tag(mode.as_str()), Some(mode));
        }
        assert_eq!(TransportMode::from_tag("foot"), None);
        assert_eq!(TransportMode::from_tag("taxi"), None);
    }
}

#[cfg(test)]
mod config {
    use std::path::Path;

    use crate::BuildConfig;

    #[test]
    fn defaults_derive_paths() {
        let c = BuildConfig::new(Path::new("/tmp/work"), "Region");
        assert_eq!(c.batch_size, 1000);
        assert!(c.staging_path.ends_with("transport.db"));
        assert!(c.tree_path.ends_with("transport_stops.rtree"));
        c.validate().unwrap();
    }

    #[test]
    fn validation_rejects_bad_values() {
        let c = BuildConfig::new(Path::new("/tmp/work"), " ");
        assert!(c.validate().is_err());
        let c = BuildConfig::new(Path::new("/tmp/work"), "R").with_batch_size(0);
        assert!(c.validate().is_err());
    }
}
