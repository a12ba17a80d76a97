use galileo::{
    Color,
    layer::{FeatureLayer, Layer as GalileoLayer},
    symbol::{CirclePointSymbol, SimpleContourSymbol},
};
use galileo_types::{Disambig, Disambiguate, Geometry, geo::Crs, geometry_type::GeoSpace2d};
use geo::{LineString, MultiPoint, Point};
use geosketch::feature::Shape;

use super::ArcMessenger;

/// In-progress sketch and highlighted selection, drawn above all features.
pub struct SketchLayer {
    outline: FeatureLayer<
        <Disambig<LineString, GeoSpace2d> as Geometry>::Point,
        Disambig<LineString, GeoSpace2d>,
        SimpleContourSymbol,
        GeoSpace2d,
    >,
    vertices: FeatureLayer<
        <Disambig<MultiPoint, GeoSpace2d> as Geometry>::Point,
        Disambig<MultiPoint, GeoSpace2d>,
        CirclePointSymbol,
        GeoSpace2d,
    >,
}

impl Default for SketchLayer {
    fn default() -> Self {
        Self {
            outline: FeatureLayer::new(
                vec![],
                SimpleContourSymbol::new(Color::rgba(17, 138, 178, 255), 2.),
                Crs::WGS84,
            ),
            vertices: FeatureLayer::new(
                vec![],
                CirclePointSymbol::new(Color::rgba(255, 255, 255, 255), 6.),
                Crs::WGS84,
            ),
        }
    }
}

impl SketchLayer {
    pub fn update<'a>(
        &mut self,
        sketch: Option<&'a Shape>,
        selected: impl IntoIterator<Item = &'a Shape>,
    ) {
        let mut outlines = Vec::new();
        let mut vertices = Vec::new();

        for shape in sketch.into_iter().chain(selected) {
            match shape {
                Shape::Point(point) => vertices.push(*point),
                Shape::LineString(line) => outlines.push(line.clone()),
                Shape::Polygon(polygon) => outlines.push(polygon.exterior().clone()),
            }
        }

        if let Some(shape) = sketch {
            vertices.extend(sketch_vertices(shape));
        }

        {
            let features = self.outline.features_mut();
            let ids: Vec<_> = features.iter_mut().map(|f| f.0).collect();
            for id in ids {
                features.remove(id);
            }
            for line in outlines {
                features.add(line.to_geo2d());
            }
            self.outline.update_all_features();
        }

        {
            let features = self.vertices.features_mut();
            let ids: Vec<_> = features.iter_mut().map(|f| f.0).collect();
            for id in ids {
                features.remove(id);
            }
            if !vertices.is_empty() {
                features.add(MultiPoint::new(vertices).to_geo2d());
            }
            self.vertices.update_all_features();
        }
    }
}

fn sketch_vertices(shape: &Shape) -> Vec<Point> {
    match shape {
        Shape::Point(_) => vec![],
        Shape::LineString(line) => line.points().collect(),
        Shape::Polygon(polygon) => polygon.exterior().points().collect(),
    }
}

impl GalileoLayer for SketchLayer {
    fn render(&self, view: &galileo::MapView, canvas: &mut dyn galileo::render::Canvas) {
        self.outline.render(view, canvas);
        self.vertices.render(view, canvas);
    }

    fn prepare(&self, view: &galileo::MapView) {
        self.outline.prepare(view);
        self.vertices.prepare(view);
    }

    fn set_messenger(&mut self, messenger: Box<dyn galileo::Messenger>) {
        let messenger = ArcMessenger::new(messenger);
        self.outline.set_messenger(Box::new(messenger.clone()));
        self.vertices.set_messenger(Box::new(messenger));
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
