mod app;
pub mod cli;
pub mod error;
pub mod map;
pub mod widgets;

pub use app::GeoSketchApp;
