use log::debug;
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
};

use super::orbit_camera::OrbitCamera;

/// Orbit controls: left drag rotates, shift + drag pans, the wheel zooms.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    is_shift_held: bool,
    is_mouse_pressed: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.002,
            is_shift_held: false,
            is_mouse_pressed: false,
        }
    }

    /// Applies raw mouse input to the camera. Returns `true` when the camera
    /// moved.
    pub fn process_events(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) -> bool {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
                false
            }
            DeviceEvent::MouseWheel { delta, .. } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32 * 0.1
                    }
                };
                camera.add_distance(scroll_amount * self.zoom_speed);
                true
            }
            DeviceEvent::MouseMotion { delta } if self.is_mouse_pressed => {
                if self.is_shift_held {
                    camera.pan((
                        -delta.0 as f32 * self.pan_speed,
                        delta.1 as f32 * self.pan_speed,
                    ));
                } else {
                    camera.add_yaw(-delta.0 as f32 * self.rotate_speed);
                    camera.add_pitch(delta.1 as f32 * self.rotate_speed);
                }
                true
            }
            _ => false,
        }
    }

    /// Tracks shift for panning; shift + C resets the view. Returns `true`
    /// when the camera moved.
    pub fn process_keyed_events(&mut self, event: &KeyEvent, camera: &mut OrbitCamera) -> bool {
        match event {
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight),
                state,
                ..
            } => {
                self.is_shift_held = *state == ElementState::Pressed;
                false
            }
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::KeyC),
                state: ElementState::Pressed,
                ..
            } if self.is_shift_held => {
                debug!("Resetting camera to its initial view");
                camera.reset_to_default();
                true
            }
            _ => false,
        }
    }

    /// Mouse released without knowing it (e.g. focus lost mid-drag).
    pub fn release(&mut self) {
        self.is_mouse_pressed = false;
        self.is_shift_held = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    #[test]
    fn motion_without_button_does_not_move_camera() {
        let mut controller = CameraController::new(0.005, 10.0);
        let mut camera = OrbitCamera::from_config(&CameraConfig::default(), 1.0);
        let before = camera.eye;

        let moved = controller.process_events(
            &DeviceEvent::MouseMotion { delta: (30.0, 10.0) },
            &mut camera,
        );
        assert!(!moved);
        assert_eq!(camera.eye, before);

        controller.process_events(
            &DeviceEvent::Button {
                button: 0,
                state: ElementState::Pressed,
            },
            &mut camera,
        );
        let moved = controller.process_events(
            &DeviceEvent::MouseMotion { delta: (30.0, 10.0) },
            &mut camera,
        );
        assert!(moved);
        assert_ne!(camera.eye, before);
    }
}
