use egui::{RichText, Widget};
use geosketch::{
    draw::DrawMode,
    stats::{FeatureStats, format_area, format_distance},
    toolbar::ToolbarCommand,
};

/// Command buttons followed by a read-only summary of the stats.
pub struct Toolbar<'a> {
    stats: &'a FeatureStats,
    mode: DrawMode,
    command: &'a mut Option<ToolbarCommand>,
}

impl<'a> Toolbar<'a> {
    pub fn new(
        stats: &'a FeatureStats,
        mode: DrawMode,
        command: &'a mut Option<ToolbarCommand>,
    ) -> Self {
        Self {
            stats,
            mode,
            command,
        }
    }
}

impl Widget for Toolbar<'_> {
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        ui.vertical(|ui| {
            ui.horizontal(|ui| {
                for command in ToolbarCommand::ALL {
                    if ui
                        .selectable_label(command.is_active(self.mode), command.label())
                        .clicked()
                    {
                        *self.command = Some(command);
                    }
                }
            });

            ui.separator();

            let counts = &self.stats.counts;
            ui.label(format!(
                "{} points, {} lines, {} polygons",
                counts.points, counts.lines, counts.polygons
            ));
            ui.label(format!(
                "Distance: {}",
                format_distance(self.stats.total_distance_km)
            ));
            ui.label(format!("Area: {}", format_area(self.stats.total_area_m2)));
            if self.stats.skipped_polygons > 0 {
                ui.label(
                    RichText::new(format!(
                        "{} invalid polygons left out",
                        self.stats.skipped_polygons
                    ))
                    .weak(),
                );
            }
            ui.label(RichText::new(format!("Mode: {}", self.mode)).monospace());
        })
        .response
    }
}
