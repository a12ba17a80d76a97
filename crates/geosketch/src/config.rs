use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAPTILER_SATELLITE: &str =
    "https://api.maptiler.com/maps/satellite/256/{z}/{x}/{y}.jpg?key={key}";
pub const OPENSTREETMAP: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Label the in-progress sketch while the pointer moves.
    pub hover_labels: bool,
    /// Minimum time between two hover recomputations.
    pub hover_interval_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hover_labels: true,
            hover_interval_ms: 50,
        }
    }
}

impl EditorConfig {
    pub fn hover_interval(&self) -> Duration {
        Duration::from_millis(self.hover_interval_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasemapConfig {
    /// Raster tile template with `{z}`, `{x}`, `{y}` and `{key}` placeholders.
    pub tile_url: Option<String>,
    pub api_key: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub zoom: u32,
    pub tile_cache: Option<PathBuf>,
}

impl Default for BasemapConfig {
    fn default() -> Self {
        Self {
            tile_url: None,
            api_key: None,
            lat: 0.0,
            lon: 0.0,
            zoom: 2,
            tile_cache: Some(PathBuf::from(".tile_cache")),
        }
    }
}

impl BasemapConfig {
    /// Configured template, or satellite imagery when an api key is set and
    /// OpenStreetMap otherwise.
    pub fn template(&self) -> &str {
        match (&self.tile_url, &self.api_key) {
            (Some(url), _) => url,
            (None, Some(_)) => MAPTILER_SATELLITE,
            (None, None) => OPENSTREETMAP,
        }
    }

    pub fn tile_url(&self, z: impl Display, x: impl Display, y: impl Display) -> String {
        self.template()
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
            .replace("{key}", self.api_key.as_deref().unwrap_or_default())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub basemap: BasemapConfig,
    pub editor: EditorConfig,
}

impl AppConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Loaded config from {path:?}");
        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use serde_test::{Token, assert_de_tokens};

    use super::*;

    #[test]
    fn falls_back_to_openstreetmap() {
        let basemap = BasemapConfig::default();

        assert_eq!(basemap.template(), OPENSTREETMAP);
        assert_eq!(
            basemap.tile_url(3, 4, 5),
            "https://tile.openstreetmap.org/3/4/5.png"
        );
    }

    #[test]
    fn substitutes_api_key() {
        let basemap = BasemapConfig {
            api_key: Some("secret".to_string()),
            ..Default::default()
        };

        assert_eq!(
            basemap.tile_url(2, 1, 0),
            "https://api.maptiler.com/maps/satellite/256/2/1/0.jpg?key=secret"
        );
    }

    #[test]
    fn explicit_template_wins() {
        let basemap = BasemapConfig {
            tile_url: Some("http://localhost/{z}-{x}-{y}".to_string()),
            api_key: Some("unused".to_string()),
            ..Default::default()
        };

        assert_eq!(basemap.tile_url(1, 2, 3), "http://localhost/1-2-3");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "editor": { "hover_interval_ms": 200 } }"#).unwrap();

        assert_eq!(config.editor.hover_interval(), Duration::from_millis(200));
        assert!(config.editor.hover_labels);
        assert_eq!(config.basemap, BasemapConfig::default());
    }

    #[test]
    fn editor_config_tokens() {
        assert_de_tokens(
            &EditorConfig {
                hover_labels: false,
                hover_interval_ms: 50,
            },
            &[
                Token::Struct {
                    name: "EditorConfig",
                    len: 1,
                },
                Token::Str("hover_labels"),
                Token::Bool(false),
                Token::StructEnd,
            ],
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AppConfig::from_path("/nonexistent/geosketch.json").unwrap_err();

        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
