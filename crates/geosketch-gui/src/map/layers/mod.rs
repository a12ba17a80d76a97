use std::sync::Arc;

use galileo::{
    Color,
    layer::{FeatureLayer, Layer as GalileoLayer},
    symbol::{CirclePointSymbol, SimpleContourSymbol, SimplePolygonSymbol},
};
use galileo_types::{
    Disambig, Disambiguate, Geometry,
    geo::Crs,
    geometry_type::GeoSpace2d,
};
use geo::{LineString, MultiPolygon, Point};
use geosketch::feature::Shape;

pub mod label_overlay;
pub mod sketch_layer;

pub use label_overlay::LabelOverlay;
pub use sketch_layer::SketchLayer;

/// Declares a layer holding one kind of drawn geometry. Every update replaces
/// all features of the layer.
macro_rules! shape_layer {
    ($name:ident, $geometry:ty, $symbol:ty) => {
        pub struct $name {
            layer: FeatureLayer<
                <Disambig<$geometry, GeoSpace2d> as Geometry>::Point,
                Disambig<$geometry, GeoSpace2d>,
                $symbol,
                GeoSpace2d,
            >,
        }

        impl $name {
            pub fn new(symbol: $symbol) -> Self {
                Self {
                    layer: FeatureLayer::new(vec![], symbol, Crs::WGS84),
                }
            }

            /// Replaces the content of the layer. Returns the new feature count.
            pub fn replace(&mut self, geometries: impl IntoIterator<Item = $geometry>) -> usize {
                let features = self.layer.features_mut();
                let ids: Vec<_> = features.iter_mut().map(|f| f.0).collect();
                for id in ids {
                    features.remove(id);
                }

                let mut count = 0;
                for geometry in geometries {
                    features.add(geometry.to_geo2d());
                    count += 1;
                }
                self.layer.update_all_features();

                tracing::trace!(layer = stringify!($name), count, "Replaced features");
                count
            }
        }

        impl GalileoLayer for $name {
            fn render(&self, view: &galileo::MapView, canvas: &mut dyn galileo::render::Canvas) {
                self.layer.render(view, canvas)
            }

            fn prepare(&self, view: &galileo::MapView) {
                self.layer.prepare(view)
            }

            fn set_messenger(&mut self, messenger: Box<dyn galileo::Messenger>) {
                self.layer.set_messenger(messenger)
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
                self
            }

            fn attribution(&self) -> Option<galileo::layer::attribution::Attribution> {
                None
            }
        }
    };
}

shape_layer!(PointLayer, Point, CirclePointSymbol);
shape_layer!(LineLayer, LineString, SimpleContourSymbol);
shape_layer!(PolygonLayer, MultiPolygon, SimplePolygonSymbol);

impl Default for PointLayer {
    fn default() -> Self {
        Self::new(CirclePointSymbol::new(Color::rgba(230, 57, 70, 255), 8.0))
    }
}

impl Default for LineLayer {
    fn default() -> Self {
        Self::new(SimpleContourSymbol::new(Color::rgba(255, 209, 102, 255), 3.0))
    }
}

impl Default for PolygonLayer {
    fn default() -> Self {
        Self::new(SimplePolygonSymbol {
            fill_color: Color::rgba(6, 214, 160, 80),
            stroke_color: Color::rgba(6, 214, 160, 255),
            stroke_width: 2.,
            stroke_offset: 0.,
        })
    }
}

/// Point geometries in `shapes`.
pub fn points<'a>(shapes: impl IntoIterator<Item = &'a Shape>) -> Vec<Point> {
    shapes
        .into_iter()
        .filter_map(|shape| match shape {
            Shape::Point(point) => Some(*point),
            _ => None,
        })
        .collect()
}

pub fn lines<'a>(shapes: impl IntoIterator<Item = &'a Shape>) -> Vec<LineString> {
    shapes
        .into_iter()
        .filter_map(|shape| match shape {
            Shape::LineString(line) => Some(line.clone()),
            _ => None,
        })
        .collect()
}

pub fn polygons<'a>(shapes: impl IntoIterator<Item = &'a Shape>) -> Vec<MultiPolygon> {
    shapes
        .into_iter()
        .filter_map(|shape| match shape {
            Shape::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon.clone()])),
            _ => None,
        })
        .collect()
}

/// Shares one messenger between the sub layers of a composite layer.
#[derive(Clone)]
pub(crate) struct ArcMessenger(Arc<Box<dyn galileo::Messenger>>);

impl ArcMessenger {
    pub(crate) fn new(messenger: Box<dyn galileo::Messenger>) -> Self {
        Self(Arc::new(messenger))
    }
}

impl galileo::Messenger for ArcMessenger {
    fn request_redraw(&self) {
        self.0.request_redraw();
    }
}

#[cfg(test)]
mod test {
    use geo::{line_string, point, polygon};

    use super::*;

    #[test]
    fn splits_shapes_by_kind() {
        let shapes = [
            Shape::Point(point!(x: 1.0, y: 2.0)),
            Shape::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]),
            Shape::Polygon(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)]),
            Shape::Point(point!(x: 3.0, y: 4.0)),
        ];

        assert_eq!(points(&shapes).len(), 2);
        assert_eq!(lines(&shapes).len(), 1);
        assert_eq!(polygons(&shapes)[0].0.len(), 1);
    }
}
