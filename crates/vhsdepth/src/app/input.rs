use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowId,
};

use vhsdepth_core::{PointerButton, PointerEvent, ViewMode};

use super::App;

/// Pixels of zoom per wheel line.
const LINE_DELTA_PIXELS: f32 = 100.0;

/// Maps a winit button onto the orbit controls' buttons.
pub(crate) fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        _ => PointerButton::Other,
    }
}

/// Wheel delta in pixels, positive when scrolling towards the user.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn wheel_delta(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_DELTA_PIXELS,
        MouseScrollDelta::PixelDelta(position) => -position.y as f32,
    }
}

/// View mode bound to a number key.
pub(crate) fn mode_for_key(code: KeyCode) -> Option<ViewMode> {
    match code {
        KeyCode::Digit1 => Some(ViewMode::Effect),
        KeyCode::Digit2 => Some(ViewMode::DepthMap),
        KeyCode::Digit3 => Some(ViewMode::Splat),
        KeyCode::Digit4 => Some(ViewMode::Source),
        _ => None,
    }
}

impl App {
    fn pointer(&mut self, event: PointerEvent) {
        let changed = self
            .renderer
            .as_mut()
            .is_some_and(|renderer| renderer.handle_pointer(event));
        if changed {
            self.repaint_if_stopped();
        }
    }

    fn key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        if let Some(mode) = mode_for_key(code) {
            if let Some(renderer) = &mut self.renderer {
                // Unavailable modes are logged by the renderer and leave the current one active.
                if renderer.set_view_mode(mode).is_ok() {
                    self.repaint_if_stopped();
                }
            }
            return;
        }
        match code {
            KeyCode::KeyR => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.reset_camera();
                    self.repaint_if_stopped();
                }
            }
            KeyCode::Space => self.toggle_loop(),
            KeyCode::Escape => {
                self.shutdown();
                event_loop.exit();
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.initialize(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
                self.repaint_if_stopped();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        self.key(event_loop, code);
                    }
                }
            }
            #[allow(clippy::cast_possible_truncation)]
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x as f32, position.y as f32);
                self.cursor = (x, y);
                self.pointer(PointerEvent::Move { x, y });
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = pointer_button(button);
                let event = match state {
                    ElementState::Pressed => PointerEvent::Down {
                        button,
                        x: self.cursor.0,
                        y: self.cursor.1,
                    },
                    ElementState::Released => PointerEvent::Up { button },
                };
                self.pointer(event);
            }
            WindowEvent::CursorLeft { .. } => self.pointer(PointerEvent::Leave),
            WindowEvent::MouseWheel { delta, .. } => self.pointer(PointerEvent::Wheel {
                delta_y: wheel_delta(delta),
            }),
            _ => {}
        }
    }
}
