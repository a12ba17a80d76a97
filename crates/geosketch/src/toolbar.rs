use std::fmt::Display;

use crate::draw::{DrawMode, DrawPlugin};

/// Toolbar buttons. Each one is a single call into the draw plugin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolbarCommand {
    DrawPoint,
    DrawLine,
    DrawPolygon,
    Delete,
}

impl ToolbarCommand {
    pub const ALL: [ToolbarCommand; 4] = [
        ToolbarCommand::DrawPoint,
        ToolbarCommand::DrawLine,
        ToolbarCommand::DrawPolygon,
        ToolbarCommand::Delete,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToolbarCommand::DrawPoint => "Add point",
            ToolbarCommand::DrawLine => "Add line",
            ToolbarCommand::DrawPolygon => "Add polygon",
            ToolbarCommand::Delete => "Delete",
        }
    }

    /// Mode the command switches to, `None` for [`ToolbarCommand::Delete`].
    pub fn mode(self) -> Option<DrawMode> {
        match self {
            ToolbarCommand::DrawPoint => Some(DrawMode::DrawPoint),
            ToolbarCommand::DrawLine => Some(DrawMode::DrawLineString),
            ToolbarCommand::DrawPolygon => Some(DrawMode::DrawPolygon),
            ToolbarCommand::Delete => None,
        }
    }

    pub fn is_active(self, mode: DrawMode) -> bool {
        self.mode() == Some(mode)
    }

    pub fn execute(self, plugin: &mut impl DrawPlugin) {
        tracing::debug!(command = %self, "Executing toolbar command");
        match self.mode() {
            Some(mode) => plugin.set_mode(mode),
            None => plugin.delete_selection(),
        }
    }
}

impl Display for ToolbarCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
