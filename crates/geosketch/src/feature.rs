//! Feature model of the drawing: shapes, features and the ordered feature
//! collection, plus GeoJSON import and export.

use std::fmt::Display;

use geo::{Geometry, LineString, Point, Polygon};
use geozero::{ToGeo, ToJson, geojson::GeoJson};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value, json};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(u64);

impl FeatureId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The geometry kinds a drawing can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 3] = [
        GeometryKind::Point,
        GeometryKind::LineString,
        GeometryKind::Polygon,
    ];

    /// Plural name used for counters and toggles.
    pub fn plural(self) -> &'static str {
        match self {
            GeometryKind::Point => "points",
            GeometryKind::LineString => "lines",
            GeometryKind::Polygon => "polygons",
        }
    }
}

impl Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                GeometryKind::Point => "Point",
                GeometryKind::LineString => "LineString",
                GeometryKind::Polygon => "Polygon",
            }
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Point(Point),
    LineString(LineString),
    Polygon(Polygon),
}

impl Shape {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Shape::Point(_) => GeometryKind::Point,
            Shape::LineString(_) => GeometryKind::LineString,
            Shape::Polygon(_) => GeometryKind::Polygon,
        }
    }
}

impl From<Shape> for Geometry {
    fn from(value: Shape) -> Self {
        match value {
            Shape::Point(point) => Geometry::Point(point),
            Shape::LineString(line) => Geometry::LineString(line),
            Shape::Polygon(polygon) => Geometry::Polygon(polygon),
        }
    }
}

impl TryFrom<Geometry> for Shape {
    type Error = GeoJsonError;

    fn try_from(value: Geometry) -> Result<Self, Self::Error> {
        match value {
            Geometry::Point(point) => Ok(Shape::Point(point)),
            Geometry::LineString(line) => Ok(Shape::LineString(line)),
            Geometry::Polygon(polygon) => Ok(Shape::Polygon(polygon)),
            // A lone geometry is sometimes handed back wrapped in a collection.
            Geometry::GeometryCollection(mut collection) if collection.0.len() == 1 => {
                Shape::try_from(collection.0.remove(0))
            }
            other => Err(GeoJsonError::UnsupportedGeometry(
                geometry_name(&other).to_string(),
            )),
        }
    }
}

fn geometry_name(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    id: FeatureId,
    shape: Shape,
    properties: JsonMap<String, Value>,
}

impl Feature {
    pub fn new(id: FeatureId, shape: Shape) -> Self {
        Self {
            id,
            shape,
            properties: JsonMap::new(),
        }
    }

    pub fn with_properties(mut self, properties: JsonMap<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    pub fn id(&self) -> FeatureId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: FeatureId) {
        self.id = id;
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn kind(&self) -> GeometryKind {
        self.shape.kind()
    }

    pub fn properties(&self) -> &JsonMap<String, Value> {
        &self.properties
    }
}

/// Ordered set of features. Insertion order is draw order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureCollection {
    features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    pub fn ids(&self) -> Vec<FeatureId> {
        self.features.iter().map(Feature::id).collect()
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.iter().find(|feature| feature.id == id)
    }

    pub fn of_kind(&self, kind: GeometryKind) -> impl Iterator<Item = &Feature> {
        self.features
            .iter()
            .filter(move |feature| feature.kind() == kind)
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn remove(&mut self, id: FeatureId) -> Option<Feature> {
        let index = self.features.iter().position(|feature| feature.id == id)?;
        Some(self.features.remove(index))
    }

    pub fn into_features(self) -> Vec<Feature> {
        self.features
    }

    /// Serializes the collection as a GeoJSON `FeatureCollection`.
    pub fn to_geojson(&self) -> Result<String, GeoJsonError> {
        let features = self
            .features
            .iter()
            .map(|feature| {
                let geometry = Geometry::from(feature.shape.clone()).to_json()?;
                let geometry: Value = serde_json::from_str(&geometry)?;

                Ok(json!({
                    "type": "Feature",
                    "id": feature.id.get(),
                    "geometry": geometry,
                    "properties": feature.properties,
                }))
            })
            .collect::<Result<Vec<_>, GeoJsonError>>()?;

        Ok(serde_json::to_string_pretty(&json!({
            "type": "FeatureCollection",
            "features": features,
        }))?)
    }

    /// Parses a GeoJSON `FeatureCollection` or a single `Feature`.
    ///
    /// Features are numbered in file order. Features without a geometry or
    /// with a geometry type other than Point, LineString or Polygon are
    /// skipped.
    pub fn from_geojson(input: &str) -> Result<Self, GeoJsonError> {
        let value: Value = serde_json::from_str(input)?;

        let features = match value.get("type").and_then(Value::as_str) {
            Some("FeatureCollection") => value
                .get("features")
                .and_then(Value::as_array)
                .cloned()
                .ok_or(GeoJsonError::NotAFeatureCollection)?,
            Some("Feature") => vec![value],
            _ => return Err(GeoJsonError::NotAFeatureCollection),
        };

        let mut collection = FeatureCollection::default();
        for (index, feature) in features.into_iter().enumerate() {
            let Some(geometry) = feature.get("geometry").filter(|g| !g.is_null()) else {
                tracing::warn!(index, "Skipping feature without geometry");
                continue;
            };

            let geometry = GeoJson(&geometry.to_string()).to_geo()?;
            let shape = match Shape::try_from(geometry) {
                Ok(shape) => shape,
                Err(err) => {
                    tracing::warn!(index, %err, "Skipping feature");
                    continue;
                }
            };

            let properties = feature
                .get("properties")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();

            collection.push(
                Feature::new(FeatureId::new(collection.len() as u64), shape)
                    .with_properties(properties),
            );
        }

        tracing::debug!("Parsed {} features from GeoJSON", collection.len());

        Ok(collection)
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

#[derive(Debug, Error)]
pub enum GeoJsonError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid geometry: {0}")]
    Geometry(#[from] geozero::error::GeozeroError),

    #[error("expected a GeoJSON FeatureCollection or Feature")]
    NotAFeatureCollection,

    #[error("unsupported geometry type {0}")]
    UnsupportedGeometry(String),
}

#[cfg(test)]
mod test {
    use geo::{line_string, point, polygon};
    use serde_json::json;

    use super::*;

    fn collection() -> FeatureCollection {
        let mut properties = JsonMap::new();
        properties.insert("name".to_string(), json!("well"));

        FeatureCollection::new(vec![
            Feature::new(FeatureId::new(0), Shape::Point(point!(x: 13.35, y: 52.53)))
                .with_properties(properties),
            Feature::new(
                FeatureId::new(1),
                Shape::LineString(line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 1.0)]),
            ),
            Feature::new(
                FeatureId::new(2),
                Shape::Polygon(polygon![
                    (x: 0.0, y: 0.0),
                    (x: 1.0, y: 0.0),
                    (x: 1.0, y: 1.0),
                    (x: 0.0, y: 0.0),
                ]),
            ),
        ])
    }

    #[test]
    fn geojson_keeps_shapes_and_properties() {
        let features = collection();
        let geojson = features.to_geojson().unwrap();
        let parsed = FeatureCollection::from_geojson(&geojson).unwrap();

        assert_eq!(parsed.len(), 3);
        for (expected, actual) in features.iter().zip(parsed.iter()) {
            assert_eq!(expected.shape(), actual.shape());
            assert_eq!(expected.properties(), actual.properties());
        }
    }

    #[test]
    fn unsupported_geometries_are_skipped() {
        let geojson = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "MultiPoint",
                        "coordinates": [[0.0, 0.0], [1.0, 1.0]]
                    },
                    "properties": {}
                },
                {
                    "type": "Feature",
                    "geometry": null,
                    "properties": {}
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [1.0, 2.0] },
                    "properties": { "kind": "tree" }
                }
            ]
        });

        let parsed = FeatureCollection::from_geojson(&geojson.to_string()).unwrap();

        assert_eq!(parsed.len(), 1);
        let feature = parsed.iter().next().unwrap();
        assert_eq!(feature.shape(), &Shape::Point(point!(x: 1.0, y: 2.0)));
        assert_eq!(feature.properties().get("kind"), Some(&json!("tree")));
    }

    #[test]
    fn rejects_non_collections() {
        let err = FeatureCollection::from_geojson(r#"{"type": "Point", "coordinates": [0, 0]}"#)
            .unwrap_err();
        assert!(matches!(err, GeoJsonError::NotAFeatureCollection));

        let err = FeatureCollection::from_geojson("not json").unwrap_err();
        assert!(matches!(err, GeoJsonError::Json(_)));
    }

    #[test]
    fn removes_by_id() {
        let mut features = collection();
        let removed = features.remove(FeatureId::new(1)).unwrap();

        assert_eq!(removed.kind(), GeometryKind::LineString);
        assert_eq!(features.ids(), vec![FeatureId::new(0), FeatureId::new(2)]);
        assert!(features.remove(FeatureId::new(1)).is_none());
    }
}
