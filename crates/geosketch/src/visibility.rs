use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::feature::GeometryKind;

/// Ids of the layers the map renders.
pub mod layer_id {
    pub const POINTS: &str = "points";
    pub const LINES: &str = "lines";
    pub const POLYGONS: &str = "polygons";
    pub const SKETCH: &str = "sketch";
    pub const LINE_LABELS: &str = "line-labels";
    pub const POLYGON_LABELS: &str = "polygon-labels";
}

/// Which geometry kinds are shown on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionFlags {
    pub points: bool,
    pub lines: bool,
    pub polygons: bool,
}

impl Default for SelectionFlags {
    fn default() -> Self {
        Self {
            points: true,
            lines: true,
            polygons: true,
        }
    }
}

impl SelectionFlags {
    pub fn get(&self, kind: GeometryKind) -> bool {
        match kind {
            GeometryKind::Point => self.points,
            GeometryKind::LineString => self.lines,
            GeometryKind::Polygon => self.polygons,
        }
    }

    pub fn get_mut(&mut self, kind: GeometryKind) -> &mut bool {
        match kind {
            GeometryKind::Point => &mut self.points,
            GeometryKind::LineString => &mut self.lines,
            GeometryKind::Polygon => &mut self.polygons,
        }
    }

    pub fn toggle(&mut self, kind: GeometryKind) {
        let flag = self.get_mut(kind);
        *flag = !*flag;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl From<bool> for Visibility {
    fn from(value: bool) -> Self {
        if value {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }
}

/// Anything that can show and hide layers by id.
pub trait LayerVisibility {
    fn has_layer(&self, id: &str) -> bool;

    fn set_visibility(&mut self, id: &str, visibility: Visibility);
}

/// Maps selection flags onto layer visibility.
#[derive(Clone, Debug)]
pub struct VisibilityController {
    bindings: [(GeometryKind, &'static [&'static str]); 3],
}

impl Default for VisibilityController {
    fn default() -> Self {
        Self {
            bindings: [
                (GeometryKind::Point, &[layer_id::POINTS]),
                (
                    GeometryKind::LineString,
                    &[layer_id::LINES, layer_id::LINE_LABELS],
                ),
                (
                    GeometryKind::Polygon,
                    &[layer_id::POLYGONS, layer_id::POLYGON_LABELS],
                ),
            ],
        }
    }
}

impl VisibilityController {
    pub fn layers_for(&self, kind: GeometryKind) -> &'static [&'static str] {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == kind)
            .map(|(_, layers)| *layers)
            .unwrap_or_default()
    }

    /// Applies `flags` to every bound layer that exists on `target`. Returns
    /// the number of layers touched.
    #[instrument(skip(self, target))]
    pub fn apply(&self, flags: &SelectionFlags, target: &mut impl LayerVisibility) -> usize {
        let mut touched = 0;

        for (kind, layers) in &self.bindings {
            let visibility = Visibility::from(flags.get(*kind));
            for layer in layers.iter().copied() {
                if !target.has_layer(layer) {
                    tracing::debug!(layer, "Layer not present, skipping");
                    continue;
                }
                target.set_visibility(layer, visibility);
                touched += 1;
            }
        }

        touched
    }
}

#[cfg(test)]
mod test {
    use rustc_hash::FxHashMap;
    use serde_test::{Token, assert_tokens};

    use super::*;

    #[derive(Default)]
    struct FakeMap {
        layers: FxHashMap<&'static str, Visibility>,
    }

    impl FakeMap {
        fn with_layers(layers: &[&'static str]) -> Self {
            Self {
                layers: layers
                    .iter()
                    .map(|layer| (*layer, Visibility::Visible))
                    .collect(),
            }
        }
    }

    impl LayerVisibility for FakeMap {
        fn has_layer(&self, id: &str) -> bool {
            self.layers.contains_key(id)
        }

        fn set_visibility(&mut self, id: &str, visibility: Visibility) {
            if let Some(current) = self.layers.get_mut(id) {
                *current = visibility;
            }
        }
    }

    const ALL_LAYERS: [&str; 6] = [
        layer_id::POINTS,
        layer_id::LINES,
        layer_id::POLYGONS,
        layer_id::SKETCH,
        layer_id::LINE_LABELS,
        layer_id::POLYGON_LABELS,
    ];

    #[test]
    fn hides_only_the_toggled_kind() {
        let controller = VisibilityController::default();
        let mut map = FakeMap::with_layers(&ALL_LAYERS);
        let mut flags = SelectionFlags::default();

        flags.toggle(GeometryKind::LineString);
        assert_eq!(controller.apply(&flags, &mut map), 5);

        assert_eq!(map.layers[layer_id::LINES], Visibility::Hidden);
        assert_eq!(map.layers[layer_id::LINE_LABELS], Visibility::Hidden);
        for layer in [
            layer_id::POINTS,
            layer_id::POLYGONS,
            layer_id::POLYGON_LABELS,
            layer_id::SKETCH,
        ] {
            assert_eq!(map.layers[layer], Visibility::Visible, "{layer}");
        }
    }

    #[test]
    fn apply_is_idempotent() {
        let controller = VisibilityController::default();
        let mut map = FakeMap::with_layers(&ALL_LAYERS);
        let flags = SelectionFlags {
            points: false,
            lines: true,
            polygons: false,
        };

        controller.apply(&flags, &mut map);
        let first = map.layers.clone();
        controller.apply(&flags, &mut map);

        assert_eq!(map.layers, first);
    }

    #[test]
    fn skips_missing_layers() {
        let controller = VisibilityController::default();
        let mut map = FakeMap::with_layers(&[layer_id::POINTS]);

        let touched = controller.apply(
            &SelectionFlags {
                points: false,
                ..Default::default()
            },
            &mut map,
        );

        assert_eq!(touched, 1);
        assert_eq!(map.layers.len(), 1);
        assert_eq!(map.layers[layer_id::POINTS], Visibility::Hidden);
    }

    #[test]
    fn flags_serde() {
        assert_tokens(
            &SelectionFlags::default(),
            &[
                Token::Struct {
                    name: "SelectionFlags",
                    len: 3,
                },
                Token::Str("points"),
                Token::Bool(true),
                Token::Str("lines"),
                Token::Bool(true),
                Token::Str("polygons"),
                Token::Bool(true),
                Token::StructEnd,
            ],
        );
    }
}
