use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use galileo::{
    Map as GalileoMap,
    control::{EventPropagation, MouseButton, MouseEvent, UserEvent, UserEventHandler},
};
use galileo_types::geo::GeoPoint;
use geo::{Coord, coord};
use tokio::sync::mpsc::UnboundedSender;

use super::projection::tolerance_degrees;

/// Pixel radius used for vertex snapping and feature picking.
pub const HIT_RADIUS_PX: f64 = 7.0;

/// Map input in lon/lat degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MapInput {
    Click { at: Coord, tolerance: f64 },
    DoubleClick { at: Coord, tolerance: f64 },
    PointerMoved { at: Coord },
}

/// Forwards pointer input to the app. While `drawing` is set, clicks are not
/// passed on to the map controller.
pub struct SketchInputHandler {
    sender: UnboundedSender<MapInput>,
    drawing: Arc<AtomicBool>,
}

impl SketchInputHandler {
    pub fn new(sender: UnboundedSender<MapInput>, drawing: Arc<AtomicBool>) -> Self {
        Self { sender, drawing }
    }

    fn locate(map: &GalileoMap, event: &MouseEvent) -> Option<(Coord, f64)> {
        let at = event.screen_pointer_position;
        let position = map.view().screen_to_map_geo(at)?;
        let tolerance = tolerance_degrees(map.view(), at, HIT_RADIUS_PX)?;

        Some((coord! { x: position.lon(), y: position.lat() }, tolerance))
    }

    fn send(&self, input: MapInput) {
        if self.sender.send(input).is_err() {
            tracing::debug!(?input, "Input receiver dropped");
        }
    }
}

impl UserEventHandler for SketchInputHandler {
    fn handle(&self, event: &UserEvent, map: &mut GalileoMap) -> EventPropagation {
        let drawing = self.drawing.load(Ordering::Relaxed);

        match event {
            UserEvent::Click(MouseButton::Left, mouse) => {
                if let Some((at, tolerance)) = Self::locate(map, mouse) {
                    self.send(MapInput::Click { at, tolerance });
                }
            }
            UserEvent::DoubleClick(MouseButton::Left, mouse) => {
                if let Some((at, tolerance)) = Self::locate(map, mouse) {
                    self.send(MapInput::DoubleClick { at, tolerance });
                }
            }
            UserEvent::PointerMoved(mouse) => {
                if drawing && let Some((at, _)) = Self::locate(map, mouse) {
                    self.send(MapInput::PointerMoved { at });
                }
                return EventPropagation::Propagate;
            }
            _ => return EventPropagation::Propagate,
        }

        if drawing {
            EventPropagation::Stop
        } else {
            EventPropagation::Propagate
        }
    }
}
