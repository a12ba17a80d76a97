use std::{borrow::Borrow, hash::Hash, sync::Arc};

use ::galileo::{
    Map as GalileoMap, MapBuilder,
    control::{EventProcessor, MapController, RawUserEvent, UserEventHandler},
    error::GalileoError,
    layer::{Layer as GalileoLayer, raster_tile_layer::RasterTileLayerBuilder},
};
use geosketch::{
    config::BasemapConfig,
    visibility::{LayerVisibility, Visibility},
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use layers::LabelOverlay;
use projection::LabelProjection;

pub mod egui_state;
pub mod input;
pub mod layers;
pub mod projection;

/// Galileo map with keyed vector layers and egui-painted label overlays.
pub struct Map<K>
where
    K: Hash + Eq,
{
    map: GalileoMap,
    /// Index of each keyed layer in the galileo layer collection.
    layers: FxHashMap<K, usize>,
    overlays: FxHashMap<K, LabelOverlay>,
    event_processor: EventProcessor,
}

impl<K: Hash + Eq> Map<K> {
    /// `input` sees every user event before the map controller does.
    pub fn new(map: GalileoMap, input: impl UserEventHandler + 'static) -> Self {
        let mut event_processor = EventProcessor::default();
        event_processor.add_handler(input);
        event_processor.add_handler(MapController::default());

        Self {
            map,
            layers: FxHashMap::default(),
            overlays: FxHashMap::default(),
            event_processor,
        }
    }

    /// Map with a raster basemap as its bottom layer.
    pub fn with_basemap(
        basemap: &BasemapConfig,
        input: impl UserEventHandler + 'static,
    ) -> Result<Self, GalileoError> {
        let tiles = basemap.clone();
        let mut builder = RasterTileLayerBuilder::new_rest(move |index| {
            tiles.tile_url(index.z, index.x, index.y)
        });
        if let Some(cache) = &basemap.tile_cache {
            builder = builder.with_file_cache(cache);
        }
        let tile_layer = builder.build()?;

        tracing::info!(
            template = basemap.template(),
            "Using basemap at {:.4}, {:.4} zoom {}",
            basemap.lat,
            basemap.lon,
            basemap.zoom
        );

        let map = MapBuilder::default()
            .with_latlon(basemap.lat, basemap.lon)
            .with_z_level(basemap.zoom)
            .with_layer(tile_layer)
            .build();

        Ok(Self::new(map, input))
    }

    /// Adds `layer` on top of the existing ones and returns a handle to it.
    /// A key is bound once; inserting under a bound key leaves the map unchanged.
    pub fn insert_layer<L>(&mut self, key: K, layer: L) -> Arc<RwLock<L>>
    where
        L: GalileoLayer + 'static,
    {
        let layer = Arc::new(RwLock::new(layer));
        let layer_col = self.map.layers_mut();

        if self.layers.contains_key(&key) {
            tracing::warn!("Layer key already bound, keeping the first layer");
        } else {
            layer_col.push(layer.clone());
            self.layers.insert(key, layer_col.len() - 1);
            log::debug!("Inserted layer. Total layers: {}", layer_col.len());
        }

        layer
    }

    pub fn add_overlay(&mut self, key: K, overlay: LabelOverlay) {
        self.overlays.insert(key, overlay);
    }

    pub fn overlay_mut<Q>(&mut self, key: &Q) -> Option<&mut LabelOverlay>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.overlays.get_mut(key)
    }

    pub fn paint_overlays(&self, painter: &egui::Painter, rect: egui::Rect) {
        let projection = LabelProjection::default();
        for overlay in self.overlays.values() {
            overlay.paint(painter, rect, self.map.view(), &projection);
        }
    }

    pub fn handle_event(&mut self, event: RawUserEvent) {
        self.event_processor.handle(event, &mut self.map);
    }

    pub fn map(&self) -> &GalileoMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut GalileoMap {
        &mut self.map
    }

    pub fn redraw(&self) {
        self.map.redraw()
    }
}

impl<K> LayerVisibility for Map<K>
where
    K: Hash + Eq + Borrow<str>,
{
    fn has_layer(&self, id: &str) -> bool {
        self.layers.contains_key(id) || self.overlays.contains_key(id)
    }

    fn set_visibility(&mut self, id: &str, visibility: Visibility) {
        let visible = visibility == Visibility::Visible;

        if let Some(index) = self.layers.get(id).copied() {
            let layers = self.map.layers_mut();
            if visible {
                layers.show(index);
            } else {
                layers.hide(index);
            }
            self.map.redraw();
        }

        if let Some(overlay) = self.overlays.get_mut(id) {
            overlay.set_visible(visible);
        }
    }
}
