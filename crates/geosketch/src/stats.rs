use geo::{LineString, Point, Polygon};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::{
    feature::{FeatureCollection, FeatureId, GeometryKind, Shape},
    measure::{self, MeasureError},
};

const SQUARE_METERS_PER_SQUARE_KILOMETER: f64 = 1_000_000.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FeatureCounts {
    pub points: usize,
    pub lines: usize,
    pub polygons: usize,
}

impl FeatureCounts {
    pub fn total(&self) -> usize {
        self.points + self.lines + self.polygons
    }

    pub fn get(&self, kind: GeometryKind) -> usize {
        match kind {
            GeometryKind::Point => self.points,
            GeometryKind::LineString => self.lines,
            GeometryKind::Polygon => self.polygons,
        }
    }

    fn count(&mut self, kind: GeometryKind) {
        match kind {
            GeometryKind::Point => self.points += 1,
            GeometryKind::LineString => self.lines += 1,
            GeometryKind::Polygon => self.polygons += 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelKind {
    /// Length of the `index`-th segment of a line.
    Segment { index: usize },
    Area,
}

/// A synthetic point that only carries a text annotation.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub position: Point,
    pub text: String,
    /// `None` for labels of the in-progress sketch.
    pub feature: Option<FeatureId>,
    pub kind: LabelKind,
}

impl Label {
    /// GeoJSON point feature with a `text` property.
    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [self.position.x(), self.position.y()],
            },
            "properties": {
                "text": self.text,
                "feature": self.feature.map(FeatureId::get),
            },
        })
    }
}

pub fn format_distance(km: f64) -> String {
    format!("{km:.2} km")
}

pub fn format_area(m2: f64) -> String {
    if m2 >= SQUARE_METERS_PER_SQUARE_KILOMETER {
        format!("{:.2} km²", m2 / SQUARE_METERS_PER_SQUARE_KILOMETER)
    } else {
        format!("{m2:.2} m²")
    }
}

/// Everything derived from a snapshot of the feature collection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureStats {
    pub counts: FeatureCounts,
    pub total_distance_km: f64,
    pub total_area_m2: f64,
    pub line_labels: Vec<Label>,
    pub polygon_labels: Vec<Label>,
    /// Polygons left out of the area total because their geometry is invalid.
    pub skipped_polygons: usize,
}

impl FeatureStats {
    #[instrument(skip_all, fields(features = features.len()))]
    pub fn compute(features: &FeatureCollection) -> Self {
        let mut stats = FeatureStats::default();

        for feature in features {
            stats.counts.count(feature.kind());

            match feature.shape() {
                Shape::Point(_) => (),
                Shape::LineString(line) => {
                    let length_km = stats.label_line(line, Some(feature.id()));
                    stats.total_distance_km += length_km;
                }
                Shape::Polygon(polygon) => match polygon_label(polygon, Some(feature.id())) {
                    Ok((area, label)) => {
                        stats.total_area_m2 += area;
                        stats.polygon_labels.push(label);
                    }
                    Err(err) => {
                        tracing::warn!(feature = %feature.id(), %err, "Skipping polygon");
                        stats.skipped_polygons += 1;
                    }
                },
            }
        }

        tracing::debug!(
            "Computed stats: {} features, {:.3} km, {:.1} m²",
            stats.counts.total(),
            stats.total_distance_km,
            stats.total_area_m2
        );

        stats
    }

    /// Adds preview labels for the in-progress sketch. Counts and totals stay
    /// untouched.
    pub fn with_sketch(mut self, sketch: Option<&Shape>) -> Self {
        match sketch {
            Some(Shape::LineString(line)) => {
                self.label_line(line, None);
            }
            Some(Shape::Polygon(polygon)) => match polygon_label(polygon, None) {
                Ok((_, label)) => self.polygon_labels.push(label),
                Err(err) => tracing::trace!(%err, "Sketch has no area yet"),
            },
            Some(Shape::Point(_)) | None => (),
        }
        self
    }

    fn label_line(&mut self, line: &LineString, feature: Option<FeatureId>) -> f64 {
        measure::segments(line)
            .enumerate()
            .map(|(index, segment)| {
                self.line_labels.push(Label {
                    position: segment.midpoint(),
                    text: format_distance(segment.length_km),
                    feature,
                    kind: LabelKind::Segment { index },
                });
                segment.length_km
            })
            .sum()
    }
}

fn polygon_label(
    polygon: &Polygon,
    feature: Option<FeatureId>,
) -> Result<(f64, Label), MeasureError> {
    let area = measure::polygon_area_m2(polygon)?;
    let position = measure::center_of_mass(polygon)?;

    Ok((
        area,
        Label {
            position,
            text: format_area(area),
            feature,
            kind: LabelKind::Area,
        },
    ))
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use geo::{LineString, Polygon, line_string, point, polygon};

    use super::*;
    use crate::feature::Feature;

    fn feature(id: u64, shape: Shape) -> Feature {
        Feature::new(FeatureId::new(id), shape)
    }

    #[test]
    fn counts_every_kind() {
        let features = FeatureCollection::new(vec![
            feature(0, Shape::Point(point!(x: 1.0, y: 1.0))),
            feature(1, Shape::Point(point!(x: 2.0, y: 1.0))),
            feature(
                2,
                Shape::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]),
            ),
            feature(
                3,
                Shape::Polygon(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)]),
            ),
        ]);

        let stats = FeatureStats::compute(&features);

        assert_eq!(
            stats.counts,
            FeatureCounts {
                points: 2,
                lines: 1,
                polygons: 1
            }
        );
        assert_eq!(stats.counts.total(), features.len());
        assert_eq!(stats.line_labels.len(), 1);
        assert_eq!(stats.polygon_labels.len(), 1);
    }

    #[test]
    fn labels_every_segment() {
        let features = FeatureCollection::new(vec![feature(
            7,
            Shape::LineString(line_string![
                (x: 0.0, y: 0.0),
                (x: 0.0, y: 1.0),
                (x: 0.0, y: 2.0),
            ]),
        )]);

        let stats = FeatureStats::compute(&features);

        assert_eq!(stats.line_labels.len(), 2);
        assert_relative_eq!(stats.total_distance_km, 2.0 * 111.195, epsilon = 1e-2);
        assert_eq!(stats.line_labels[0].text, "111.20 km");
        assert_eq!(stats.line_labels[1].kind, LabelKind::Segment { index: 1 });
        assert_eq!(stats.line_labels[1].feature, Some(FeatureId::new(7)));
        assert_relative_eq!(stats.line_labels[1].position.y(), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn invalid_polygon_does_not_change_total() {
        let valid = feature(
            0,
            Shape::Polygon(polygon![
                (x: 0.0, y: 0.0),
                (x: 0.01, y: 0.0),
                (x: 0.01, y: 0.01),
                (x: 0.0, y: 0.01),
            ]),
        );
        let only_valid = FeatureStats::compute(&FeatureCollection::new(vec![valid.clone()]));

        let empty = feature(
            1,
            Shape::Polygon(Polygon::new(LineString::new(vec![]), vec![])),
        );
        let with_invalid = FeatureStats::compute(&FeatureCollection::new(vec![valid, empty]));

        assert_eq!(with_invalid.total_area_m2, only_valid.total_area_m2);
        assert_eq!(with_invalid.polygon_labels.len(), 1);
        assert_eq!(with_invalid.skipped_polygons, 1);
        assert_eq!(with_invalid.counts.polygons, 2);
    }

    #[test]
    fn sketch_labels_leave_totals_alone() {
        let features = FeatureCollection::new(vec![feature(
            0,
            Shape::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]),
        )]);
        let sketch = Shape::LineString(line_string![(x: 5.0, y: 5.0), (x: 5.0, y: 6.0)]);

        let plain = FeatureStats::compute(&features);
        let previewed = FeatureStats::compute(&features).with_sketch(Some(&sketch));

        assert_eq!(previewed.total_distance_km, plain.total_distance_km);
        assert_eq!(previewed.counts, plain.counts);
        assert_eq!(previewed.line_labels.len(), 2);
        assert_eq!(previewed.line_labels[1].feature, None);
    }

    #[test]
    fn formats_areas() {
        assert_eq!(format_area(12.5), "12.50 m²");
        assert_eq!(format_area(2_500_000.0), "2.50 km²");
        assert_eq!(format_distance(0.5), "0.50 km");
    }

    #[test]
    fn label_geojson() {
        let label = Label {
            position: point!(x: 1.0, y: 2.0),
            text: "1.00 km".to_string(),
            feature: Some(FeatureId::new(3)),
            kind: LabelKind::Segment { index: 0 },
        };

        let value = label.to_geojson();
        assert_eq!(value["geometry"]["coordinates"][1], 2.0);
        assert_eq!(value["properties"]["text"], "1.00 km");
        assert_eq!(value["properties"]["feature"], 3);
    }
}
