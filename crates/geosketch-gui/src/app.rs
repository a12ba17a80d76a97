use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use eframe::CreationContext;
use egui::{Align2, Color32, Frame, Key};
use geosketch::{
    config::AppConfig,
    draw::DrawPlugin,
    editor::Editor,
    feature::{Feature, FeatureCollection},
    sketch::SketchBoard,
    visibility::{SelectionFlags, VisibilityController, layer_id},
};
use parking_lot::RwLock;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::instrument;

use crate::{
    error::{AppError, FileError},
    map::{
        Map,
        egui_state::EguiMapState,
        input::{MapInput, SketchInputHandler},
        layers::{self, LabelOverlay, LineLayer, PointLayer, PolygonLayer, SketchLayer},
    },
    widgets::{self, MapWidget, SidebarAction, modals::ErrorModal},
};

/// Handles to the vector layers the app keeps in sync with the board.
struct FeatureLayers {
    points: Arc<RwLock<PointLayer>>,
    lines: Arc<RwLock<LineLayer>>,
    polygons: Arc<RwLock<PolygonLayer>>,
    sketch: Arc<RwLock<SketchLayer>>,
}

impl FeatureLayers {
    /// Inserts the layers bottom to top: polygons, lines, points, sketch.
    fn insert(map: &mut Map<String>) -> Self {
        let polygons = map.insert_layer(layer_id::POLYGONS.to_string(), PolygonLayer::default());
        let lines = map.insert_layer(layer_id::LINES.to_string(), LineLayer::default());
        let points = map.insert_layer(layer_id::POINTS.to_string(), PointLayer::default());
        let sketch = map.insert_layer(layer_id::SKETCH.to_string(), SketchLayer::default());

        map.add_overlay(
            layer_id::LINE_LABELS.to_string(),
            LabelOverlay::new(Color32::from_rgb(255, 209, 102)),
        );
        map.add_overlay(
            layer_id::POLYGON_LABELS.to_string(),
            LabelOverlay::new(Color32::WHITE),
        );

        Self {
            points,
            lines,
            polygons,
            sketch,
        }
    }
}

pub struct GeoSketchApp {
    map: EguiMapState<String>,
    board: SketchBoard,
    editor: Editor,
    flags: SelectionFlags,
    visibility: VisibilityController,
    input: UnboundedReceiver<MapInput>,
    drawing: Arc<AtomicBool>,
    layers: FeatureLayers,
    synced_revision: Option<u64>,
    runtime: tokio::runtime::Runtime,
    errors: ErrorModal,
}

impl GeoSketchApp {
    pub fn new(cc: &CreationContext<'_>, config: AppConfig) -> Result<Self, AppError> {
        let render_state = cc
            .wgpu_render_state
            .clone()
            .ok_or(AppError::MissingRenderState)?;
        let runtime = tokio::runtime::Runtime::new().map_err(AppError::Runtime)?;

        let (sender, input) = mpsc::unbounded_channel();
        let drawing = Arc::new(AtomicBool::new(false));

        let mut map = Map::with_basemap(
            &config.basemap,
            SketchInputHandler::new(sender, drawing.clone()),
        )?;
        let layers = FeatureLayers::insert(&mut map);
        let map = EguiMapState::new(cc.egui_ctx.clone(), render_state, map)?;

        let mut board = SketchBoard::new();
        let mut editor = Editor::new(config.editor);
        editor.attach(&mut board);
        editor.recompute(&board, Instant::now());

        Ok(Self {
            map,
            board,
            editor,
            flags: SelectionFlags::default(),
            visibility: VisibilityController::default(),
            input,
            drawing,
            layers,
            synced_revision: None,
            runtime,
            errors: ErrorModal::new("error_modal"),
        })
    }

    fn handle_input(&mut self, ctx: &egui::Context) {
        while let Ok(input) = self.input.try_recv() {
            match input {
                MapInput::Click { at, tolerance } => self.board.click(at, tolerance),
                MapInput::DoubleClick { at, tolerance } => self.board.double_click(at, tolerance),
                MapInput::PointerMoved { at } => self.board.pointer_moved(at),
            }
        }

        if ctx.wants_keyboard_input() || self.errors.is_open() {
            return;
        }

        let (finish, cancel, delete) = ctx.input(|input| {
            (
                input.key_pressed(Key::Enter),
                input.key_pressed(Key::Escape),
                input.key_pressed(Key::Delete) || input.key_pressed(Key::Backspace),
            )
        });

        if finish {
            self.board.finish();
        }
        if cancel {
            self.board.cancel();
        }
        if delete {
            self.board.delete_selection();
        }
    }

    /// Rebuilds the vector layers if the board changed since the last sync.
    #[instrument(skip(self))]
    fn sync_layers(&mut self) {
        let revision = self.board.revision();
        if self.synced_revision == Some(revision) {
            return;
        }

        let features = self.board.features();
        let shapes = || features.iter().map(Feature::shape);

        self.layers
            .points
            .write()
            .replace(layers::points(shapes()));
        self.layers.lines.write().replace(layers::lines(shapes()));
        self.layers
            .polygons
            .write()
            .replace(layers::polygons(shapes()));

        let selected = self
            .board
            .selection()
            .iter()
            .filter_map(|id| features.get(*id))
            .map(Feature::shape);
        self.layers
            .sketch
            .write()
            .update(self.board.sketch().as_ref(), selected);

        self.map.map().redraw();
        self.synced_revision = Some(revision);
    }

    fn sync_overlays(&mut self) {
        for name in [layer_id::LINE_LABELS, layer_id::POLYGON_LABELS] {
            let (Some(source), Some(overlay)) = (
                self.editor.sources().get(name),
                self.map.map_mut().overlay_mut(name),
            ) else {
                continue;
            };

            if overlay.sync(source) {
                log::trace!("Synced overlay {name}");
            }
        }
    }

    fn handle_action(&mut self, action: SidebarAction) {
        let board = &mut self.board;

        match action {
            SidebarAction::Save => {
                let Some(path) = geojson_dialog().set_file_name("features.geojson").save_file()
                else {
                    return;
                };
                self.errors.handle_error(|| save_features(board, &path));
            }
            SidebarAction::Load => {
                let Some(path) = geojson_dialog().pick_file() else {
                    return;
                };
                if let Some(collection) = self.errors.handle_error(|| read_features(&path)) {
                    board.load(collection);
                }
            }
        }
    }
}

fn geojson_dialog() -> rfd::FileDialog {
    rfd::FileDialog::new().add_filter("GeoJSON", &["geojson", "json"])
}

fn save_features(board: &SketchBoard, path: &Path) -> Result<(), FileError> {
    let features = board.features();
    let content = features.to_geojson().map_err(|source| FileError::GeoJson {
        path: PathBuf::from(path),
        source,
    })?;

    std::fs::write(path, content).map_err(|source| FileError::Io {
        path: PathBuf::from(path),
        source,
    })?;

    tracing::info!("Saved {} features to {path:?}", features.len());
    Ok(())
}

fn read_features(path: &Path) -> Result<FeatureCollection, FileError> {
    let content = std::fs::read_to_string(path).map_err(|source| FileError::Io {
        path: PathBuf::from(path),
        source,
    })?;

    FeatureCollection::from_geojson(&content).map_err(|source| FileError::GeoJson {
        path: PathBuf::from(path),
        source,
    })
}

impl eframe::App for GeoSketchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let _rt_ctx = self.runtime.enter();

        self.handle_input(ctx);

        let now = Instant::now();
        self.editor.process(&self.board, now);
        if let Some(stats) = self.editor.take_stats_update() {
            tracing::debug!(
                total = stats.counts.total(),
                skipped = stats.skipped_polygons,
                "Stats updated"
            );
        }
        if self.editor.has_pending_hover() {
            ctx.request_repaint_after(self.editor.hover_interval());
        }

        self.sync_layers();
        self.sync_overlays();
        self.drawing
            .store(self.board.mode().is_drawing(), Ordering::Relaxed);

        let mut action = None;
        let mut command = None;
        let mut toggled = false;

        egui::SidePanel::left("sidebar")
            .resizable(false)
            .default_width(200.0)
            .show(ctx, |ui| {
                toggled = ui
                    .add(widgets::Sidebar::new(
                        &self.editor.stats().counts,
                        &mut self.flags,
                        &mut action,
                    ))
                    .changed();
            });

        egui::Window::new("Tools")
            .anchor(Align2::RIGHT_TOP, [-12.0, 12.0])
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| {
                ui.add(widgets::Toolbar::new(
                    self.editor.stats(),
                    self.board.mode(),
                    &mut command,
                ));
            });

        egui::CentralPanel::default()
            .frame(Frame::new().inner_margin(0).outer_margin(0))
            .show(ctx, |ui| {
                ui.add(MapWidget::new(&mut self.map));
            });

        self.errors.show(ctx);

        if toggled {
            let touched = self.visibility.apply(&self.flags, self.map.map_mut());
            log::debug!("Updated visibility of {touched} layers");
            self.board.set_pickable(self.flags);
        }
        if let Some(command) = command {
            command.execute(&mut self.board);
        }
        if let Some(action) = action {
            self.handle_action(action);
        }

        // Input and board changes from this frame are applied on the next one.
        if !self.input.is_empty() || self.synced_revision != Some(self.board.revision()) {
            ctx.request_repaint();
        }
    }
}
