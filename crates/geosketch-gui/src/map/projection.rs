use galileo::MapView;
use galileo_types::{
    cartesian::{CartesianPoint2d, Point2},
    geo::{Datum, GeoPoint, Projection, impls::projection::WebMercator},
};
use geo::Coord;

/// Projects lon/lat coordinates onto the map plane and the screen.
pub struct LabelProjection {
    projection: WebMercator<Coord, Point2>,
}

impl Default for LabelProjection {
    fn default() -> Self {
        Self {
            projection: WebMercator::new(Datum::WGS84),
        }
    }
}

impl LabelProjection {
    pub fn project(&self, lonlat: Coord) -> Option<Point2> {
        self.projection.project(&lonlat)
    }

    /// Screen position of `lonlat` relative to the top left of the map.
    pub fn to_screen(&self, view: &MapView, lonlat: Coord) -> Option<Point2> {
        view.map_to_screen(self.project(lonlat)?)
    }
}

/// Longitude span in degrees covered by `pixels` to the right of `at`.
pub fn tolerance_degrees(view: &MapView, at: Point2, pixels: f64) -> Option<f64> {
    let center = view.screen_to_map_geo(at)?;
    let edge = view.screen_to_map_geo(Point2::new(at.x() + pixels, at.y()))?;

    Some((edge.lon() - center.lon()).abs())
}
