use geo::{Coord, EuclideanDistance, LineString, Point, Polygon};
use tracing::instrument;

use crate::{
    draw::{ChangeListener, DrawEvent, DrawMode, DrawPlugin},
    feature::{Feature, FeatureCollection, FeatureId, GeometryKind, Shape},
    visibility::SelectionFlags,
};

/// Minimal draw plugin: places points, sketches lines and polygons vertex by
/// vertex and selects features for deletion. Vertex editing, snapping and undo
/// are not supported.
///
/// Coordinates are lon/lat degrees; hit tolerances are in degrees as well.
pub struct SketchBoard {
    features: FeatureCollection,
    mode: DrawMode,
    vertices: Vec<Coord>,
    pointer: Option<Coord>,
    selection: Vec<FeatureId>,
    /// Kinds that can be picked by clicking.
    pickable: SelectionFlags,
    /// The last click finished the sketch. The double click of the same
    /// gesture must not act on the new feature.
    finished_on_click: bool,
    next_id: u64,
    listeners: Vec<ChangeListener>,
    revision: u64,
}

impl Default for SketchBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SketchBoard {
    pub fn new() -> Self {
        Self {
            features: FeatureCollection::default(),
            mode: DrawMode::Idle,
            vertices: Vec::new(),
            pointer: None,
            selection: Vec::new(),
            pickable: SelectionFlags::default(),
            finished_on_click: false,
            next_id: 0,
            listeners: Vec::new(),
            revision: 0,
        }
    }

    /// Changes whenever anything visible on the board changed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn selection(&self) -> &[FeatureId] {
        &self.selection
    }

    pub fn is_sketching(&self) -> bool {
        !self.vertices.is_empty()
    }

    #[instrument(skip(self))]
    pub fn click(&mut self, at: Coord, tolerance: f64) {
        self.finished_on_click = false;

        match self.mode {
            DrawMode::DrawPoint => {
                let id = self.commit(Shape::Point(Point::from(at)));
                self.leave_draw_mode(Some(id));
            }
            DrawMode::DrawLineString => {
                if self.hits_last_vertex(at, tolerance) {
                    self.finish_on_click();
                } else {
                    self.push_vertex(at);
                }
            }
            DrawMode::DrawPolygon => {
                let closes_ring = self.vertices.len() >= 3
                    && self
                        .vertices
                        .first()
                        .is_some_and(|first| within(*first, at, tolerance));
                if closes_ring || self.hits_last_vertex(at, tolerance) {
                    self.finish_on_click();
                } else {
                    self.push_vertex(at);
                }
            }
            DrawMode::Idle | DrawMode::DirectSelect => {
                let hit = self.feature_at(at, tolerance);
                self.set_selection(hit.into_iter().collect());
                if hit.is_none() {
                    self.change_mode(DrawMode::Idle);
                }
            }
        }
    }

    /// Finishes the sketch, or focuses the feature under the cursor.
    #[instrument(skip(self))]
    pub fn double_click(&mut self, at: Coord, tolerance: f64) {
        if std::mem::take(&mut self.finished_on_click) {
            tracing::trace!("Sketch already finished by the click of this double click");
            return;
        }

        if self.mode.is_drawing() {
            if self.is_sketching() {
                self.finish();
            }
            return;
        }

        if let Some(id) = self.feature_at(at, tolerance) {
            self.set_selection(vec![id]);
            self.change_mode(DrawMode::DirectSelect);
        }
    }

    pub fn pointer_moved(&mut self, at: Coord) {
        if !self.mode.is_drawing() || self.pointer == Some(at) {
            return;
        }

        self.pointer = Some(at);
        if self.is_sketching() {
            self.revision += 1;
            self.emit(DrawEvent::SketchChanged);
        }
    }

    /// Commits the sketch if it has enough vertices, abandons it otherwise.
    /// Either way the board returns to [`DrawMode::Idle`].
    pub fn finish(&mut self) -> Option<FeatureId> {
        let vertices = std::mem::take(&mut self.vertices);
        self.pointer = None;

        let shape = match self.mode {
            DrawMode::DrawLineString if vertices.len() >= 2 => {
                Some(Shape::LineString(LineString::new(vertices)))
            }
            DrawMode::DrawPolygon if vertices.len() >= 3 => Some(Shape::Polygon(Polygon::new(
                LineString::new(vertices),
                vec![],
            ))),
            _ => {
                if !vertices.is_empty() {
                    tracing::debug!("Abandoning sketch with {} vertices", vertices.len());
                    self.revision += 1;
                    self.emit(DrawEvent::SketchChanged);
                }
                None
            }
        };

        let id = shape.map(|shape| self.commit(shape));
        self.leave_draw_mode(id);
        id
    }

    /// Abandons the sketch and returns to [`DrawMode::Idle`].
    pub fn cancel(&mut self) {
        self.discard_sketch();
        self.change_mode(DrawMode::Idle);
    }

    /// Restricts picking to the kinds set in `flags`. Selected features of
    /// other kinds are deselected.
    pub fn set_pickable(&mut self, flags: SelectionFlags) {
        self.pickable = flags;

        let selection: Vec<_> = self
            .selection
            .iter()
            .copied()
            .filter(|id| {
                self.features
                    .get(*id)
                    .is_some_and(|feature| flags.get(feature.kind()))
            })
            .collect();
        self.set_selection(selection);

        if self.mode == DrawMode::DirectSelect && self.selection.is_empty() {
            self.change_mode(DrawMode::Idle);
        }
    }

    /// Top-most feature within `tolerance` of `at`. Points win over lines,
    /// lines over polygons, newer over older.
    pub fn feature_at(&self, at: Coord, tolerance: f64) -> Option<FeatureId> {
        let cursor = Point::from(at);

        GeometryKind::ALL
            .iter()
            .filter(|kind| self.pickable.get(**kind))
            .find_map(|kind| {
                self.features
                    .iter()
                    .rev()
                    .filter(|feature| feature.kind() == *kind)
                    .find(|feature| distance(cursor, feature.shape()) <= tolerance)
                    .map(Feature::id)
            })
    }

    /// Replaces every feature with the ones in `collection`. Features get
    /// fresh ids.
    pub fn load(&mut self, collection: FeatureCollection) -> Vec<FeatureId> {
        self.cancel();
        self.set_selection(vec![]);

        let removed = std::mem::take(&mut self.features).ids();
        if !removed.is_empty() {
            self.emit(DrawEvent::Delete(removed));
        }

        let mut created = Vec::with_capacity(collection.len());
        for mut feature in collection.into_features() {
            let id = self.allocate_id();
            feature.set_id(id);
            self.features.push(feature);
            created.push(id);
        }

        self.revision += 1;
        if !created.is_empty() {
            self.emit(DrawEvent::Create(created.clone()));
        }

        tracing::info!("Loaded {} features", created.len());
        created
    }

    fn finish_on_click(&mut self) {
        self.finish();
        self.finished_on_click = true;
    }

    fn hits_last_vertex(&self, at: Coord, tolerance: f64) -> bool {
        self.vertices
            .last()
            .is_some_and(|last| within(*last, at, tolerance))
    }

    fn push_vertex(&mut self, at: Coord) {
        self.vertices.push(at);
        self.pointer = Some(at);
        self.revision += 1;
        self.emit(DrawEvent::SketchChanged);
    }

    fn discard_sketch(&mut self) {
        self.pointer = None;
        if self.vertices.is_empty() {
            return;
        }

        self.vertices.clear();
        self.revision += 1;
        self.emit(DrawEvent::SketchChanged);
    }

    fn leave_draw_mode(&mut self, created: Option<FeatureId>) {
        self.change_mode(DrawMode::Idle);
        if let Some(id) = created {
            self.set_selection(vec![id]);
        }
    }

    fn commit(&mut self, shape: Shape) -> FeatureId {
        let id = self.allocate_id();
        tracing::debug!(feature = %id, kind = %shape.kind(), "Created feature");

        self.features.push(Feature::new(id, shape));
        self.revision += 1;
        self.emit(DrawEvent::Create(vec![id]));
        id
    }

    fn allocate_id(&mut self) -> FeatureId {
        let id = FeatureId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn change_mode(&mut self, mode: DrawMode) {
        if self.mode == mode {
            return;
        }

        tracing::debug!(from = %self.mode, to = %mode, "Changing draw mode");
        self.mode = mode;
        self.revision += 1;
        self.emit(DrawEvent::ModeChange(mode));
    }

    fn set_selection(&mut self, selection: Vec<FeatureId>) {
        if self.selection == selection {
            return;
        }

        self.selection = selection;
        self.revision += 1;
        self.emit(DrawEvent::SelectionChange(self.selection.clone()));
    }

    fn emit(&mut self, event: DrawEvent) {
        tracing::trace!(%event, "Emitting draw event");
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

impl DrawPlugin for SketchBoard {
    fn set_mode(&mut self, mode: DrawMode) {
        self.discard_sketch();

        let mode = if mode == DrawMode::DirectSelect && self.selection.len() != 1 {
            tracing::debug!("Direct select needs exactly one selected feature");
            DrawMode::Idle
        } else {
            mode
        };

        if mode.is_drawing() {
            self.set_selection(vec![]);
        }
        self.change_mode(mode);
    }

    fn mode(&self) -> DrawMode {
        self.mode
    }

    fn delete_selection(&mut self) {
        if self.is_sketching() {
            self.cancel();
            return;
        }

        let selection = std::mem::take(&mut self.selection);
        if selection.is_empty() {
            return;
        }
        self.emit(DrawEvent::SelectionChange(vec![]));

        let removed: Vec<_> = selection
            .into_iter()
            .filter(|id| self.features.remove(*id).is_some())
            .collect();
        self.revision += 1;

        if !removed.is_empty() {
            tracing::debug!("Deleted {} features", removed.len());
            self.emit(DrawEvent::Delete(removed));
        }

        if self.mode == DrawMode::DirectSelect {
            self.change_mode(DrawMode::Idle);
        }
    }

    fn features(&self) -> FeatureCollection {
        self.features.clone()
    }

    fn sketch(&self) -> Option<Shape> {
        if self.vertices.is_empty() {
            return None;
        }

        let mut coords = self.vertices.clone();
        if let Some(pointer) = self.pointer
            && coords.last() != Some(&pointer)
        {
            coords.push(pointer);
        }

        match self.mode {
            DrawMode::DrawLineString => Some(Shape::LineString(LineString::new(coords))),
            DrawMode::DrawPolygon => Some(Shape::Polygon(Polygon::new(
                LineString::new(coords),
                vec![],
            ))),
            _ => None,
        }
    }

    fn on_change(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }
}

fn within(a: Coord, b: Coord, tolerance: f64) -> bool {
    Point::from(a).euclidean_distance(&Point::from(b)) <= tolerance
}

fn distance(cursor: Point, shape: &Shape) -> f64 {
    match shape {
        Shape::Point(point) => cursor.euclidean_distance(point),
        Shape::LineString(line) => cursor.euclidean_distance(line),
        Shape::Polygon(polygon) => cursor.euclidean_distance(polygon),
    }
}
