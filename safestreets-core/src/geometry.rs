//! Great-circle helpers on a spherical Earth of radius [`EARTH_RADIUS_M`]
//! (not the GRS80 mean radius behind `geo::Haversine`).

use geo::{Destination, Distance, HaversineMeasure, Point};

use crate::{EARTH_RADIUS_M, Meters};

const EARTH: HaversineMeasure = HaversineMeasure::new(EARTH_RADIUS_M);

/// Great-circle distance between two points (x = longitude, y = latitude)
pub fn haversine_distance(a: Point<f64>, b: Point<f64>) -> Meters {
    EARTH.distance(a, b)
}

/// Point reached by travelling `distance` meters from `origin` along the
/// initial `bearing_deg` (clockwise from north).
pub fn destination(origin: Point<f64>, bearing_deg: f64, distance: Meters) -> Point<f64> {
    EARTH.destination(origin, bearing_deg, distance)
}

/// Arithmetic mean of a set of coordinates, `None` for an empty set
pub fn mean_point<I>(points: I) -> Option<Point<f64>>
where
    I: IntoIterator<Item = Point<f64>>,
{
    let (sum_x, sum_y, count) = points
        .into_iter()
        .fold((0.0, 0.0, 0usize), |(x, y, n), p| (x + p.x(), y + p.y(), n + 1));

    if count == 0 {
        None
    } else {
        #[allow(clippy::cast_precision_loss)]
        let n = count as f64;
        Some(Point::new(sum_x / n, sum_y / n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(0.0, 1.0);
        let expected = EARTH_RADIUS_M * 1f64.to_radians();
        assert!((haversine_distance(a, b) - expected).abs() < 1e-6);
    }

    #[test]
    fn destination_round_trips_through_haversine() {
        let origin = Point::new(-75.1652, 39.9526);
        for bearing in [0.0, 45.0, 90.0, 180.0, 270.0] {
            let target = destination(origin, bearing, 300.0);
            assert!((haversine_distance(origin, target) - 300.0).abs() < 1e-6);
            assert!(target.x() > -76.0 && target.x() < -74.0);
        }
    }

    #[test]
    fn same_point_is_zero_distance() {
        let p = Point::new(-75.1652, 39.9526);
        assert_eq!(haversine_distance(p, p), 0.0);
    }

    #[test]
    fn mean_point_of_empty_set() {
        assert!(mean_point(Vec::new()).is_none());
        let mean = mean_point([Point::new(0.0, 0.0), Point::new(2.0, 4.0)]).unwrap();
        assert_eq!(mean, Point::new(1.0, 2.0));
    }
}
