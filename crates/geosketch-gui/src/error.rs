use std::path::PathBuf;

use galileo::error::GalileoError;
use geosketch::{config::ConfigError, feature::GeoJsonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("eframe was started without the wgpu renderer")]
    MissingRenderState,
    #[error("map renderer has no target texture")]
    MapTexture,
    #[error("failed to set up the basemap")]
    Basemap(#[from] GalileoError),
    #[error("failed to start the async runtime")]
    Runtime(#[source] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failures of the Save/Load actions.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to access {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path:?} is not a usable GeoJSON file")]
    GeoJson {
        path: PathBuf,
        #[source]
        source: GeoJsonError,
    },
}
