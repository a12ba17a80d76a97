//! Thin layer over `geo` for the measurements shown on the map.
//!
//! Distances are great-circle distances on a sphere with the mean earth
//! radius. Areas are spherical areas on a sphere with the equatorial radius.

use geo::{
    Centroid, ChamberlainDuquetteArea, Coord, HaversineDistance, HaversineIntermediate, Line,
    LineString, Point, Polygon,
};
use thiserror::Error;

const METERS_PER_KILOMETER: f64 = 1000.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeasureError {
    #[error("polygon ring {ring} is empty")]
    EmptyRing { ring: usize },

    #[error("polygon ring {ring} has {positions} positions, at least 4 are required")]
    TooFewPositions { ring: usize, positions: usize },

    #[error("polygon ring {ring} contains non-finite coordinates")]
    NonFinite { ring: usize },

    #[error("polygon has no center of mass")]
    NoCenter,
}

/// A segment between two consecutive line vertices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    pub length_km: f64,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            length_km: distance_km(start, end),
        }
    }

    pub fn midpoint(&self) -> Point {
        midpoint(self.start, self.end)
    }
}

pub fn distance_km(a: Point, b: Point) -> f64 {
    a.haversine_distance(&b) / METERS_PER_KILOMETER
}

/// Great-circle midpoint of `a` and `b`.
pub fn midpoint(a: Point, b: Point) -> Point {
    a.haversine_intermediate(&b, 0.5)
}

pub fn segments(line: &LineString) -> impl Iterator<Item = Segment> + '_ {
    line.lines()
        .map(|Line { start, end }| Segment::new(Point::from(start), Point::from(end)))
}

pub fn line_length_km(line: &LineString) -> f64 {
    segments(line).map(|segment| segment.length_km).sum()
}

/// Checks that every ring is closed over at least four finite positions.
pub fn validate_polygon(polygon: &Polygon) -> Result<(), MeasureError> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .enumerate()
        .try_for_each(|(ring, line)| validate_ring(ring, line))
}

fn validate_ring(ring: usize, line: &LineString) -> Result<(), MeasureError> {
    let positions = line.0.len();
    if positions == 0 {
        return Err(MeasureError::EmptyRing { ring });
    }
    if !line.0.iter().all(|Coord { x, y }| x.is_finite() && y.is_finite()) {
        return Err(MeasureError::NonFinite { ring });
    }
    if positions < 4 || !line.is_closed() {
        return Err(MeasureError::TooFewPositions { ring, positions });
    }
    Ok(())
}

/// Unsigned spherical area in square meters.
pub fn polygon_area_m2(polygon: &Polygon) -> Result<f64, MeasureError> {
    validate_polygon(polygon)?;
    Ok(polygon.chamberlain_duquette_unsigned_area())
}

pub fn center_of_mass(polygon: &Polygon) -> Result<Point, MeasureError> {
    validate_polygon(polygon)?;
    polygon.centroid().ok_or(MeasureError::NoCenter)
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use geo::{LineString, Polygon, line_string, polygon};

    use super::*;

    #[test]
    fn one_degree_of_latitude() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 1.0)];
        let segments: Vec<_> = segments(&line).collect();

        assert_eq!(segments.len(), 1);
        assert_relative_eq!(segments[0].length_km, 111.195, epsilon = 1e-3);
        assert_relative_eq!(line_length_km(&line), 111.195, epsilon = 1e-3);

        let mid = segments[0].midpoint();
        assert_relative_eq!(mid.x(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(mid.y(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn single_vertex_line_has_no_segments() {
        let line = line_string![(x: 3.0, y: 4.0)];
        assert_eq!(segments(&line).count(), 0);
        assert_eq!(line_length_km(&line), 0.0);
    }

    #[test]
    fn one_degree_square_at_the_equator() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ];

        let area = polygon_area_m2(&square).unwrap();
        // ~12 391 km² for a one degree cell on the equator
        assert_relative_eq!(area / 1e6, 12_391.0, max_relative = 1e-3);

        let center = center_of_mass(&square).unwrap();
        assert_relative_eq!(center.x(), 0.5, epsilon = 1e-9);
        assert_relative_eq!(center.y(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn rejects_invalid_rings() {
        let empty = Polygon::new(LineString::new(vec![]), vec![]);
        assert_eq!(
            polygon_area_m2(&empty),
            Err(MeasureError::EmptyRing { ring: 0 })
        );

        let degenerate = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)];
        assert!(matches!(
            polygon_area_m2(&degenerate),
            Err(MeasureError::TooFewPositions { ring: 0, .. })
        ));

        let not_finite = polygon![
            (x: 0.0, y: 0.0),
            (x: f64::NAN, y: 0.0),
            (x: 1.0, y: 1.0),
        ];
        assert_eq!(
            center_of_mass(&not_finite),
            Err(MeasureError::NonFinite { ring: 0 })
        );
    }
}
