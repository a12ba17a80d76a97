//! Capability interface of a draw plugin. The stats aggregator and the toolbar
//! only talk to the plugin through [`DrawPlugin`].

use std::fmt::Display;

use crate::feature::{FeatureCollection, FeatureId, Shape};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DrawMode {
    /// Nothing is drawn, clicks select features.
    #[default]
    Idle,
    DrawPoint,
    DrawLineString,
    DrawPolygon,
    /// A single feature is focused.
    DirectSelect,
}

impl DrawMode {
    pub fn is_drawing(self) -> bool {
        matches!(
            self,
            DrawMode::DrawPoint | DrawMode::DrawLineString | DrawMode::DrawPolygon
        )
    }
}

impl Display for DrawMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DrawMode::Idle => "simple_select",
                DrawMode::DrawPoint => "draw_point",
                DrawMode::DrawLineString => "draw_line_string",
                DrawMode::DrawPolygon => "draw_polygon",
                DrawMode::DirectSelect => "direct_select",
            }
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawEvent {
    Create(Vec<FeatureId>),
    Update(Vec<FeatureId>),
    Delete(Vec<FeatureId>),
    ModeChange(DrawMode),
    SelectionChange(Vec<FeatureId>),
    /// The in-progress sketch changed shape.
    SketchChanged,
}

impl DrawEvent {
    /// Whether the feature collection changed.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            DrawEvent::Create(_) | DrawEvent::Update(_) | DrawEvent::Delete(_)
        )
    }
}

impl Display for DrawEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawEvent::Create(ids) => write!(f, "draw.create({})", ids.len()),
            DrawEvent::Update(ids) => write!(f, "draw.update({})", ids.len()),
            DrawEvent::Delete(ids) => write!(f, "draw.delete({})", ids.len()),
            DrawEvent::ModeChange(mode) => write!(f, "draw.modechange({mode})"),
            DrawEvent::SelectionChange(ids) => write!(f, "draw.selectionchange({})", ids.len()),
            DrawEvent::SketchChanged => write!(f, "draw.render"),
        }
    }
}

pub type ChangeListener = Box<dyn FnMut(&DrawEvent) + Send>;

pub trait DrawPlugin {
    fn set_mode(&mut self, mode: DrawMode);

    fn mode(&self) -> DrawMode;

    /// Deletes the selected features, or abandons the in-progress sketch.
    fn delete_selection(&mut self);

    /// Snapshot of the committed features.
    fn features(&self) -> FeatureCollection;

    /// Preview of the in-progress sketch, including the pointer vertex.
    fn sketch(&self) -> Option<Shape> {
        None
    }

    fn on_change(&mut self, listener: ChangeListener);
}
