use std::path::PathBuf;

use clap::Parser;
use geosketch::config::{AppConfig, ConfigError};

#[derive(Debug, Parser)]
#[command(name = "geosketch", about = "Draw and measure features on a map", version)]
pub struct Cli {
    /// JSON config file. Flags override its values.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Raster tile template with {z}, {x}, {y} and {key} placeholders
    #[arg(long)]
    pub tile_url: Option<String>,

    #[arg(long, env = "GEOSKETCH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    #[arg(short, long)]
    pub zoom: Option<u32>,

    /// Directory for downloaded tiles
    #[arg(long)]
    pub tile_cache: Option<PathBuf>,

    /// Minimum time between two sketch label updates
    #[arg(long)]
    pub hover_interval_ms: Option<u64>,

    /// Only label committed features
    #[arg(long)]
    pub no_hover_labels: bool,
}

impl Cli {
    /// Loads the config file, if any, and applies the flags on top.
    pub fn into_config(self) -> Result<AppConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_path(path)?,
            None => AppConfig::default(),
        };

        let basemap = &mut config.basemap;
        if let Some(tile_url) = self.tile_url {
            basemap.tile_url = Some(tile_url);
        }
        if let Some(api_key) = self.api_key {
            basemap.api_key = Some(api_key);
        }
        if let Some(lat) = self.lat {
            basemap.lat = lat;
        }
        if let Some(lon) = self.lon {
            basemap.lon = lon;
        }
        if let Some(zoom) = self.zoom {
            basemap.zoom = zoom;
        }
        if let Some(tile_cache) = self.tile_cache {
            basemap.tile_cache = Some(tile_cache);
        }

        let editor = &mut config.editor;
        if let Some(interval) = self.hover_interval_ms {
            editor.hover_interval_ms = interval;
        }
        if self.no_hover_labels {
            editor.hover_labels = false;
        }

        Ok(config)
    }
}
