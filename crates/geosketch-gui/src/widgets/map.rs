use std::hash::Hash;

use egui::Widget;

use crate::map::egui_state::EguiMapState;

pub struct MapWidget<'map, K>
where
    K: Hash + Eq,
{
    map_state: &'map mut EguiMapState<K>,
}

impl<'map, K> MapWidget<'map, K>
where
    K: Hash + Eq,
{
    pub fn new(map_state: &'map mut EguiMapState<K>) -> Self {
        Self { map_state }
    }
}

impl<K> Widget for MapWidget<'_, K>
where
    K: Hash + Eq,
{
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        self.map_state.render(ui)
    }
}
