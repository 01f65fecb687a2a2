//! Pointer-driven orbit/pan/zoom controls.

use crate::camera::OrbitCamera;

/// Radians of rotation per pixel of drag.
pub const ROTATE_SPEED: f32 = 0.01;
/// World units of pan per pixel of drag.
pub const PAN_SPEED: f32 = 0.005;
/// Distance change per unit of wheel delta.
pub const ZOOM_SPEED: f32 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Rotates.
    Primary,
    /// Pans.
    Secondary,
    Other,
}

/// Pointer input from the host surface, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { button: PointerButton, x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up { button: PointerButton },
    /// The pointer left the surface.
    Leave,
    /// Wheel delta in pixels; positive moves the camera away.
    Wheel { delta_y: f32 },
}

/// Tracks drag state and applies gestures to an [`OrbitCamera`].
///
/// Gestures have no momentum: releasing a button or leaving the surface ends
/// the drag immediately.
#[derive(Debug, Clone, Default)]
pub struct OrbitControls {
    rotating: bool,
    panning: bool,
    last_position: Option<(f32, f32)>,
}

impl OrbitControls {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.rotating || self.panning
    }

    /// Applies one event. Returns true if the camera changed.
    pub fn handle_event(&mut self, camera: &mut OrbitCamera, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down { button, x, y } => {
                match button {
                    PointerButton::Primary => self.rotating = true,
                    PointerButton::Secondary => self.panning = true,
                    PointerButton::Other => {}
                }
                self.last_position = Some((x, y));
                false
            }
            PointerEvent::Up { button } => {
                match button {
                    PointerButton::Primary => self.rotating = false,
                    PointerButton::Secondary => self.panning = false,
                    PointerButton::Other => {}
                }
                false
            }
            PointerEvent::Leave => {
                self.rotating = false;
                self.panning = false;
                false
            }
            PointerEvent::Move { x, y } => {
                let (last_x, last_y) = self.last_position.unwrap_or((x, y));
                self.last_position = Some((x, y));
                let dx = x - last_x;
                let dy = y - last_y;
                if self.rotating {
                    camera.rotate(dx * ROTATE_SPEED, dy * ROTATE_SPEED);
                    true
                } else if self.panning {
                    camera.pan(-dx * PAN_SPEED, dy * PAN_SPEED);
                    true
                } else {
                    false
                }
            }
            PointerEvent::Wheel { delta_y } => {
                camera.zoom(delta_y * ZOOM_SPEED);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_drag_rotates_exactly() {
        let mut camera = OrbitCamera::default();
        let mut controls = OrbitControls::new();
        controls.handle_event(
            &mut camera,
            PointerEvent::Down {
                button: PointerButton::Primary,
                x: 10.0,
                y: 20.0,
            },
        );
        assert!(controls.handle_event(&mut camera, PointerEvent::Move { x: 110.0, y: 20.0 }));
        assert_eq!(camera.rotation_y, 1.0);
        assert_eq!(camera.rotation_x, 0.0);
    }

    #[test]
    fn test_secondary_drag_pans() {
        let mut camera = OrbitCamera::default();
        let mut controls = OrbitControls::new();
        controls.handle_event(
            &mut camera,
            PointerEvent::Down {
                button: PointerButton::Secondary,
                x: 0.0,
                y: 0.0,
            },
        );
        controls.handle_event(&mut camera, PointerEvent::Move { x: 100.0, y: 200.0 });
        assert!((camera.pan_x + 0.5).abs() < 1e-6);
        assert!((camera.pan_y - 1.0).abs() < 1e-6);
        assert_eq!(camera.rotation_y, 0.0);
    }

    #[test]
    fn test_leave_cancels_drag() {
        let mut camera = OrbitCamera::default();
        let mut controls = OrbitControls::new();
        controls.handle_event(
            &mut camera,
            PointerEvent::Down {
                button: PointerButton::Primary,
                x: 0.0,
                y: 0.0,
            },
        );
        controls.handle_event(&mut camera, PointerEvent::Leave);
        assert!(!controls.is_dragging());
        assert!(!controls.handle_event(&mut camera, PointerEvent::Move { x: 50.0, y: 50.0 }));
        assert_eq!(camera, OrbitCamera::default());
    }

    #[test]
    fn test_release_cancels_drag() {
        let mut camera = OrbitCamera::default();
        let mut controls = OrbitControls::new();
        controls.handle_event(
            &mut camera,
            PointerEvent::Down {
                button: PointerButton::Primary,
                x: 0.0,
                y: 0.0,
            },
        );
        controls.handle_event(
            &mut camera,
            PointerEvent::Up {
                button: PointerButton::Primary,
            },
        );
        controls.handle_event(&mut camera, PointerEvent::Move { x: 50.0, y: 0.0 });
        assert_eq!(camera.rotation_y, 0.0);
    }

    #[test]
    fn test_wheel_zooms() {
        let mut camera = OrbitCamera::default();
        let mut controls = OrbitControls::new();
        controls.handle_event(&mut camera, PointerEvent::Wheel { delta_y: 200.0 });
        assert!((camera.distance - 4.0).abs() < 1e-6);
    }

    fn event_strategy() -> impl Strategy<Value = PointerEvent> {
        let button = prop_oneof![
            Just(PointerButton::Primary),
            Just(PointerButton::Secondary),
            Just(PointerButton::Other),
        ];
        prop_oneof![
            (button.clone(), -2000.0f32..2000.0, -2000.0f32..2000.0)
                .prop_map(|(button, x, y)| PointerEvent::Down { button, x, y }),
            (-2000.0f32..2000.0, -2000.0f32..2000.0)
                .prop_map(|(x, y)| PointerEvent::Move { x, y }),
            button.prop_map(|button| PointerEvent::Up { button }),
            Just(PointerEvent::Leave),
            (-5000.0f32..5000.0).prop_map(|delta_y| PointerEvent::Wheel { delta_y }),
        ]
    }

    proptest! {
        #[test]
        fn prop_camera_stays_clamped(events in prop::collection::vec(event_strategy(), 0..64)) {
            let mut camera = OrbitCamera::default();
            let mut controls = OrbitControls::new();
            for event in events {
                controls.handle_event(&mut camera, event);
                prop_assert!((-FRAC_PI_2..=FRAC_PI_2).contains(&camera.rotation_x));
                prop_assert!((1.0..=10.0).contains(&camera.distance));
            }
        }
    }
}
