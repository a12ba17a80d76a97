use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use galileo::Messenger;
use galileo::control::{MouseButton, RawUserEvent};
use galileo::render::WgpuRenderer;
use galileo_types::cartesian::{Point2, Size};

use crate::error::AppError;
use crate::map::Map;

/// Renders a [`Map`] into a wgpu texture shown by egui.
pub struct EguiMapState<K>
where
    K: Hash + Eq,
{
    map: Map<K>,
    renderer: WgpuRenderer,
    egui_render_state: egui_wgpu::RenderState,
    texture_id: egui::TextureId,
    texture_view: wgpu::TextureView,
    requires_redraw: Arc<AtomicBool>,
}

impl<K> EguiMapState<K>
where
    K: Hash + Eq,
{
    /// Layers must be inserted into `map` beforehand so they receive the
    /// redraw messenger.
    pub fn new(
        ctx: egui::Context,
        render_state: egui_wgpu::RenderState,
        mut map: Map<K>,
    ) -> Result<Self, AppError> {
        let requires_redraw = Arc::new(AtomicBool::new(true));
        let messenger = MapStateMessenger {
            context: ctx,
            requires_redraw: requires_redraw.clone(),
        };

        let size = Size::new(1, 1);

        {
            let map = map.map_mut();
            map.set_messenger(Some(messenger.clone()));
            map.set_size(size.cast());

            map.layers_mut().iter_mut().for_each(|layer| {
                layer.set_messenger(Box::new(messenger.clone()));
            });
        }

        let renderer = WgpuRenderer::new_with_device_and_texture(
            render_state.device.clone(),
            render_state.queue.clone(),
            size,
        );

        let texture_view = renderer
            .get_target_texture_view()
            .ok_or(AppError::MapTexture)?;
        let texture_id = render_state.renderer.write().register_native_texture(
            &render_state.device,
            &texture_view,
            wgpu::FilterMode::Nearest,
        );

        Ok(EguiMapState {
            map,
            renderer,
            egui_render_state: render_state,
            texture_id,
            texture_view,
            requires_redraw,
        })
    }

    pub fn map(&self) -> &Map<K> {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut Map<K> {
        &mut self.map
    }

    pub fn render(&mut self, ui: &mut egui::Ui) -> egui::Response {
        log::trace!("[map] Rendering map");
        let available_size = ui.max_rect().size();
        let map_size = self.renderer.size().cast::<f32>();

        let (rect, response) =
            ui.allocate_exact_size(available_size, egui::Sense::click_and_drag());

        if response.contains_pointer() {
            let events = ui.input(|input| input.events.clone());
            self.process_events(&events, [-rect.left(), -rect.top()]);
        }

        self.map.map_mut().animate();

        if available_size[0] != map_size.width() || available_size[1] != map_size.height() {
            self.resize_map(available_size);
        }

        if self.requires_redraw.swap(false, Ordering::Relaxed) {
            self.draw();
        }

        egui::Image::new(egui::ImageSource::Texture(egui::load::SizedTexture::new(
            self.texture_id,
            egui::Vec2::new(map_size.width(), map_size.height()),
        )))
        .paint_at(ui, rect);

        self.map.paint_overlays(&ui.painter_at(rect), rect);

        response
    }

    fn resize_map(&mut self, size: egui::Vec2) {
        log::trace!("Resizing map to size: {size:?}");

        let size = Size::new(size.x as f64, size.y as f64);
        self.map.map_mut().set_size(size);

        let size = Size::new(size.width() as u32, size.height() as u32);
        self.renderer.resize(size);

        // Resizing recreates the target texture.
        let Some(texture_view) = self.renderer.get_target_texture_view() else {
            tracing::error!("Map renderer has no target texture after resize");
            return;
        };
        self.texture_id = self
            .egui_render_state
            .renderer
            .write()
            .register_native_texture(
                &self.egui_render_state.device,
                &texture_view,
                wgpu::FilterMode::Nearest,
            );
        self.texture_view = texture_view;

        self.map.redraw();
    }

    fn draw(&mut self) {
        log::trace!("[map] Redrawing the map");
        self.map.map().load_layers();
        self.renderer
            .render_to_texture_view(self.map.map(), &self.texture_view);
    }

    fn process_events(&mut self, events: &[egui::Event], offset: [f32; 2]) {
        for event in events {
            if let Some(raw_event) = convert_event(event, offset) {
                self.map.handle_event(raw_event);
            }
        }
    }
}

fn convert_event(event: &egui::Event, offset: [f32; 2]) -> Option<RawUserEvent> {
    match event {
        egui::Event::PointerButton {
            button, pressed, ..
        } => {
            let button = match button {
                egui::PointerButton::Primary => MouseButton::Left,
                egui::PointerButton::Secondary => MouseButton::Right,
                egui::PointerButton::Middle => MouseButton::Middle,
                _ => MouseButton::Other,
            };

            Some(if *pressed {
                RawUserEvent::ButtonPressed(button)
            } else {
                RawUserEvent::ButtonReleased(button)
            })
        }
        egui::Event::PointerMoved(position) => Some(RawUserEvent::PointerMoved(Point2::new(
            (position.x + offset[0]) as f64,
            (position.y + offset[1]) as f64,
        ))),
        egui::Event::MouseWheel { delta, .. } => {
            let zoom = delta[1] as f64;

            if zoom.abs() < 0.0001 {
                return None;
            }

            Some(RawUserEvent::Scroll(zoom))
        }
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct MapStateMessenger {
    pub requires_redraw: Arc<AtomicBool>,
    pub context: egui::Context,
}

impl Messenger for MapStateMessenger {
    fn request_redraw(&self) {
        log::trace!("Redraw requested");
        if !self.requires_redraw.swap(true, Ordering::Relaxed) {
            self.context.request_repaint();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pointer_positions_are_relative_to_the_map() {
        let event = egui::Event::PointerMoved(egui::pos2(120.0, 80.0));

        let Some(RawUserEvent::PointerMoved(position)) = convert_event(&event, [-100.0, -50.0])
        else {
            panic!("expected a pointer move");
        };
        assert_eq!(position, Point2::new(20.0, 30.0));
    }

    #[test]
    fn tiny_scrolls_are_dropped() {
        let event = egui::Event::MouseWheel {
            unit: egui::MouseWheelUnit::Line,
            delta: egui::vec2(0.0, 0.00001),
            modifiers: egui::Modifiers::NONE,
        };

        assert!(convert_event(&event, [0.0, 0.0]).is_none());
    }
}
