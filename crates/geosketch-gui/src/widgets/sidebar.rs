use egui::{Align, Layout, RichText, Widget};
use geosketch::{feature::GeometryKind, stats::FeatureCounts, visibility::SelectionFlags};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SidebarAction {
    Save,
    Load,
}

/// Feature counts, per-kind visibility toggles and file actions.
///
/// The returned response is marked changed when a toggle flipped.
pub struct Sidebar<'a> {
    counts: &'a FeatureCounts,
    flags: &'a mut SelectionFlags,
    action: &'a mut Option<SidebarAction>,
}

impl<'a> Sidebar<'a> {
    pub fn new(
        counts: &'a FeatureCounts,
        flags: &'a mut SelectionFlags,
        action: &'a mut Option<SidebarAction>,
    ) -> Self {
        Self {
            counts,
            flags,
            action,
        }
    }
}

impl Widget for Sidebar<'_> {
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let Sidebar {
            counts,
            flags,
            action,
        } = self;
        let mut toggled = false;

        let mut response = ui
            .vertical(|ui| {
                ui.heading("Features");
                ui.separator();

                egui::Grid::new("feature_counts")
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| {
                        ui.label("Total");
                        ui.label(RichText::new(counts.total().to_string()).strong());
                        ui.end_row();

                        for kind in GeometryKind::ALL {
                            ui.label(kind.to_string());
                            ui.label(RichText::new(counts.get(kind).to_string()).strong());
                            ui.end_row();
                        }
                    });

                ui.add_space(12.0);
                ui.heading("Visible");
                ui.separator();

                for kind in GeometryKind::ALL {
                    toggled |= ui.checkbox(flags.get_mut(kind), kind.plural()).changed();
                }

                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        *action = Some(SidebarAction::Save);
                    }
                    if ui.button("Load").clicked() {
                        *action = Some(SidebarAction::Load);
                    }
                });

                ui.with_layout(Layout::bottom_up(Align::LEFT), |ui| {
                    ui.small(concat!("geosketch ", env!("CARGO_PKG_VERSION")));
                    ui.separator();
                });
            })
            .response;

        if toggled {
            response.mark_changed();
        }
        response
    }
}
