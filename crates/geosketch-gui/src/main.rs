use std::error::Error;

use clap::Parser;
use geosketch_gui::{GeoSketchApp, cli::Cli};
use tracing_subscriber::layer::SubscriberExt;

fn main() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::TRACE)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .finish()
        .with(tracing_tracy::TracyLayer::default());

    tracing::subscriber::set_global_default(subscriber).unwrap();
    tracing_log::LogTracer::init().unwrap();

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = ?err, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "GeoSketch",
        native_options,
        Box::new(
            move |cc| -> Result<Box<dyn eframe::App>, Box<dyn Error + Send + Sync>> {
                match GeoSketchApp::new(cc, config) {
                    Ok(app) => Ok(Box::new(app)),
                    Err(err) => {
                        tracing::error!(error = ?err, "Failed to start");
                        Err(err.to_string().into())
                    }
                }
            },
        ),
    )
    .unwrap();
}
