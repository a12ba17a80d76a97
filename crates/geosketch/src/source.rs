//! Named label sources the map renders from. Every update replaces the whole
//! content of a source.

use rustc_hash::FxHashMap;
use serde_json::{Value, json};
use thiserror::Error;

use crate::{stats::Label, visibility::layer_id};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("no source named '{0}'")]
    Missing(String),
}

#[derive(Clone, Debug, Default)]
pub struct LabelSource {
    labels: Vec<Label>,
    revision: u64,
}

impl LabelSource {
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Bumped on every [`LabelSource::set_data`].
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_data(&mut self, labels: Vec<Label>) {
        self.labels = labels;
        self.revision += 1;
    }

    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": self.labels.iter().map(Label::to_geojson).collect::<Vec<_>>(),
        })
    }
}

#[derive(Debug, Default)]
pub struct MapSources {
    sources: FxHashMap<String, LabelSource>,
}

impl MapSources {
    /// Sources for segment and area labels.
    pub fn with_label_sources() -> Self {
        let mut sources = Self::default();
        sources.add_source(layer_id::LINE_LABELS);
        sources.add_source(layer_id::POLYGON_LABELS);
        sources
    }

    pub fn add_source(&mut self, name: impl Into<String>) {
        self.sources.entry(name.into()).or_default();
    }

    pub fn get(&self, name: &str) -> Option<&LabelSource> {
        self.sources.get(name)
    }

    pub fn set_data(&mut self, name: &str, labels: Vec<Label>) -> Result<(), SourceError> {
        let source = self
            .sources
            .get_mut(name)
            .ok_or_else(|| SourceError::Missing(name.to_string()))?;
        source.set_data(labels);

        tracing::trace!(
            source = name,
            labels = source.labels.len(),
            revision = source.revision,
            "Replaced source data"
        );

        Ok(())
    }
}
