pub mod config;
pub mod draw;
pub mod editor;
pub mod feature;
pub mod measure;
pub mod sketch;
pub mod source;
pub mod stats;
pub mod toolbar;
pub mod types;
pub mod visibility;
