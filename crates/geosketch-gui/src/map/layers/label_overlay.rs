use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Vec2};
use galileo::MapView;
use galileo_types::cartesian::CartesianPoint2d;
use geosketch::{source::LabelSource, stats::Label};

use crate::map::projection::LabelProjection;

/// Text labels painted by egui on top of the map texture.
#[derive(Clone, Debug)]
pub struct LabelOverlay {
    labels: Vec<Label>,
    revision: Option<u64>,
    visible: bool,
    color: Color32,
    font: FontId,
}

impl LabelOverlay {
    pub fn new(color: Color32) -> Self {
        Self {
            labels: Vec::new(),
            revision: None,
            visible: true,
            color,
            font: FontId::proportional(13.0),
        }
    }

    /// Copies the labels of `source` if it changed since the last sync.
    pub fn sync(&mut self, source: &LabelSource) -> bool {
        if self.revision == Some(source.revision()) {
            return false;
        }

        self.labels = source.labels().to_vec();
        self.revision = Some(source.revision());
        true
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn paint(
        &self,
        painter: &Painter,
        rect: Rect,
        view: &MapView,
        projection: &LabelProjection,
    ) {
        if !self.visible {
            return;
        }

        for label in &self.labels {
            let Some(screen) = projection.to_screen(view, label.position.0) else {
                continue;
            };
            let position = rect.min + Vec2::new(screen.x() as f32, screen.y() as f32);
            if !rect.expand(50.0).contains(position) {
                continue;
            }

            paint_outlined(painter, position, &label.text, &self.font, self.color);
        }
    }
}

fn paint_outlined(painter: &Painter, position: Pos2, text: &str, font: &FontId, color: Color32) {
    for offset in [
        Vec2::new(-1.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, -1.0),
        Vec2::new(0.0, 1.0),
    ] {
        painter.text(
            position + offset,
            Align2::CENTER_CENTER,
            text,
            font.clone(),
            Color32::BLACK,
        );
    }
    painter.text(position, Align2::CENTER_CENTER, text, font.clone(), color);
}
