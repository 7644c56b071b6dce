// src/engine_lib/controller.rs

use std::collections::HashSet;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use winit::{
    event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window},
};

use crate::config::ControlsConfig;

/// Pitch stays this far inside +-pi/2.
pub const PITCH_MARGIN: f32 = 0.01;
/// Wheel units per line, as reported by Windows-style wheels.
pub const WHEEL_DELTA: f32 = 120.0;

/// Everything one simulation step wants done to the camera.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraDelta {
    pub walk: f32,
    pub strafe: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub dismount: bool,
    pub exit: bool,
}

/// Accumulated look direction fed to `Camera::turn`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    pub pitch: f32,
    pub yaw: f32,
}

impl LookAngles {
    pub fn new(pitch: f32, yaw: f32) -> Self {
        let mut angles = Self { pitch: 0.0, yaw: 0.0 };
        angles.apply(pitch, yaw);
        angles
    }

    pub fn pitch_limit() -> f32 {
        FRAC_PI_2 - PITCH_MARGIN
    }

    pub fn apply(&mut self, pitch_delta: f32, yaw_delta: f32) {
        let limit = Self::pitch_limit();
        self.pitch = (self.pitch + pitch_delta).clamp(-limit, limit);

        // Half-open range (-pi, pi]; -pi folds onto pi.
        let yaw = (self.yaw + yaw_delta + PI).rem_euclid(TAU) - PI;
        self.yaw = if yaw <= -PI { PI } else { yaw };
    }
}

pub trait InputSource {
    /// Delta for one simulation step. One-shot input is consumed by the first call.
    fn sample(&mut self) -> CameraDelta;
}

/// Polls gilrs for the pad's View button.
pub struct GamepadPoller {
    gilrs: gilrs::Gilrs,
}

impl GamepadPoller {
    pub fn new() -> Option<Self> {
        match gilrs::Gilrs::new() {
            Ok(gilrs) => Some(Self { gilrs }),
            Err(err) => {
                log::warn!("Gamepad support unavailable: {err}");
                None
            }
        }
    }

    pub fn exit_pressed(&mut self) -> bool {
        while let Some(event) = self.gilrs.next_event() {
            log::trace!("Gamepad event {:?}", event.event);
        }
        self.gilrs
            .gamepads()
            .any(|(_, pad)| pad.is_connected() && pad.is_pressed(gilrs::Button::Select))
    }
}

/// Keyboard, mouse and gamepad state gathered between frames.
pub struct InputState {
    controls: ControlsConfig,
    held: HashSet<KeyCode>,
    mouse_dx_accum: f32,
    mouse_dy_accum: f32,
    scroll_accum: f32,
    relative_mode: bool,
    dismount_pressed: bool,
    exit_requested: bool,
    gamepad: Option<GamepadPoller>,
}

impl InputState {
    pub fn new(controls: ControlsConfig) -> Self {
        Self {
            controls,
            held: HashSet::new(),
            mouse_dx_accum: 0.0,
            mouse_dy_accum: 0.0,
            scroll_accum: 0.0,
            relative_mode: false,
            dismount_pressed: false,
            exit_requested: false,
            gamepad: None,
        }
    }

    pub fn with_gamepad(mut self) -> Self {
        self.gamepad = GamepadPoller::new();
        self
    }

    pub fn relative_mode(&self) -> bool {
        self.relative_mode
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Once per frame, before stepping.
    pub fn poll_gamepad(&mut self) {
        if let Some(pad) = self.gamepad.as_mut() {
            if pad.exit_pressed() {
                self.exit_requested = true;
            }
        }
    }

    pub fn set_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        match key {
            KeyCode::Escape if pressed => self.exit_requested = true,
            KeyCode::KeyF if pressed => self.dismount_pressed = true,
            KeyCode::KeyW
            | KeyCode::KeyS
            | KeyCode::KeyA
            | KeyCode::KeyD
            | KeyCode::KeyQ
            | KeyCode::KeyE
            | KeyCode::KeyZ
            | KeyCode::KeyC => {
                if pressed {
                    self.held.insert(key);
                } else {
                    self.held.remove(&key);
                }
            }
            _ => return false,
        }
        true
    }

    pub fn add_mouse_motion(&mut self, dx: f32, dy: f32) {
        if self.relative_mode {
            self.mouse_dx_accum += dx;
            self.mouse_dy_accum += dy;
        }
    }

    /// `wheel_units` uses 120 per notch.
    pub fn add_scroll(&mut self, wheel_units: f32) {
        self.scroll_accum += wheel_units;
    }

    pub fn set_relative_mode(&mut self, relative: bool) {
        self.relative_mode = relative;
        if !relative {
            self.mouse_dx_accum = 0.0;
            self.mouse_dy_accum = 0.0;
        }
    }

    /// Events that release held state and must reach us even when the UI
    /// layer consumes them.
    pub fn must_observe(event: &WindowEvent) -> bool {
        matches!(
            event,
            WindowEvent::MouseInput {
                state: ElementState::Released,
                button: MouseButton::Left,
                ..
            } | WindowEvent::Focused(false)
        )
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent, window: &Window) -> bool {
        match event {
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                let pressed = key_event.state == ElementState::Pressed;
                match key_event.physical_key {
                    PhysicalKey::Code(code) => self.set_key(code, pressed),
                    _ => false,
                }
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                self.grab_cursor(window, *state == ElementState::Pressed);
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let units = match delta {
                    MouseScrollDelta::LineDelta(_, lines) => lines * WHEEL_DELTA,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                self.add_scroll(units);
                true
            }
            WindowEvent::Focused(false) => {
                self.held.clear();
                self.grab_cursor(window, false);
                false
            }
            _ => false,
        }
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.add_mouse_motion(*dx as f32, *dy as f32);
        }
    }

    fn grab_cursor(&mut self, window: &Window, grab: bool) {
        if grab == self.relative_mode {
            return;
        }
        if grab {
            if window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_e| window.set_cursor_grab(CursorGrabMode::Locked))
                .is_ok()
            {
                window.set_cursor_visible(false);
            } else {
                log::warn!("Could not grab cursor, mouse look uses raw motion only");
            }
            self.set_relative_mode(true);
        } else {
            if window.set_cursor_grab(CursorGrabMode::None).is_err() {
                log::warn!("Could not release cursor");
            }
            window.set_cursor_visible(true);
            self.set_relative_mode(false);
        }
    }

    fn held_axis(&self, positive: KeyCode, negative: KeyCode) -> f32 {
        let mut value = 0.0;
        if self.held.contains(&positive) {
            value += 1.0;
        }
        if self.held.contains(&negative) {
            value -= 1.0;
        }
        value
    }
}

impl InputSource for InputState {
    fn sample(&mut self) -> CameraDelta {
        let c = &self.controls;
        let mut delta = CameraDelta {
            walk: self.held_axis(KeyCode::KeyW, KeyCode::KeyS) * c.walk_step,
            strafe: self.held_axis(KeyCode::KeyD, KeyCode::KeyA) * c.strafe_step,
            pitch: self.held_axis(KeyCode::KeyZ, KeyCode::KeyC) * c.turn_step,
            yaw: self.held_axis(KeyCode::KeyE, KeyCode::KeyQ) * c.turn_step,
            dismount: std::mem::take(&mut self.dismount_pressed),
            exit: self.exit_requested,
        };

        delta.walk += self.scroll_accum * c.scroll_sensitivity;
        delta.pitch -= self.mouse_dy_accum * c.mouse_sensitivity;
        delta.yaw += self.mouse_dx_accum * c.mouse_sensitivity;
        self.scroll_accum = 0.0;
        self.mouse_dx_accum = 0.0;
        self.mouse_dy_accum = 0.0;

        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pitch_clamps_to_limit_exactly() {
        let mut angles = LookAngles::new(0.0, 0.0);
        angles.apply(2.0, 0.0);
        assert_eq!(angles.pitch, FRAC_PI_2 - PITCH_MARGIN);
        angles.apply(-10.0, 0.0);
        assert_eq!(angles.pitch, -(FRAC_PI_2 - PITCH_MARGIN));
    }

    #[test]
    fn yaw_wraps_into_range() {
        let mut angles = LookAngles::new(0.0, PI);
        angles.apply(0.0, 0.1);
        assert_relative_eq!(angles.yaw, -PI + 0.1, epsilon = 1e-5);
        angles.apply(0.0, -0.2);
        assert_relative_eq!(angles.yaw, PI - 0.1, epsilon = 1e-5);
    }

    #[test]
    fn yaw_stays_in_half_open_range() {
        let mut angles = LookAngles::new(0.0, 0.0);
        angles.apply(0.0, 10.0);
        assert_relative_eq!(angles.yaw, 10.0 - 2.0 * TAU, epsilon = 1e-5);

        let mut angles = LookAngles::new(0.0, 0.0);
        angles.apply(0.0, -10.0);
        assert_relative_eq!(angles.yaw, -10.0 + 2.0 * TAU, epsilon = 1e-5);

        let mut angles = LookAngles::new(0.0, 0.0);
        angles.apply(0.0, -PI);
        assert_eq!(angles.yaw, PI);
        assert_eq!(LookAngles::new(0.0, -PI).yaw, PI);
    }

    #[test]
    fn button_release_and_focus_loss_bypass_the_ui() {
        let device_id = unsafe { winit::event::DeviceId::dummy() };
        let click = |state| WindowEvent::MouseInput {
            device_id,
            state,
            button: MouseButton::Left,
        };
        assert!(InputState::must_observe(&click(ElementState::Released)));
        assert!(InputState::must_observe(&WindowEvent::Focused(false)));

        assert!(!InputState::must_observe(&click(ElementState::Pressed)));
        assert!(!InputState::must_observe(&WindowEvent::Focused(true)));
        assert!(!InputState::must_observe(&WindowEvent::MouseInput {
            device_id,
            state: ElementState::Released,
            button: MouseButton::Right,
        }));
    }

    #[test]
    fn held_keys_repeat_every_sample() {
        let mut input = InputState::new(ControlsConfig::default());
        input.set_key(KeyCode::KeyW, true);
        input.set_key(KeyCode::KeyA, true);
        input.set_key(KeyCode::KeyQ, true);
        for _ in 0..2 {
            let d = input.sample();
            assert_eq!(d.walk, 0.05);
            assert_eq!(d.strafe, -0.05);
            assert_eq!(d.yaw, -0.02);
        }
        input.set_key(KeyCode::KeyW, false);
        assert_eq!(input.sample().walk, 0.0);
    }

    #[test]
    fn one_shot_input_is_consumed() {
        let mut input = InputState::new(ControlsConfig::default());
        input.set_relative_mode(true);
        input.add_mouse_motion(10.0, -5.0);
        input.add_scroll(WHEEL_DELTA);
        input.set_key(KeyCode::KeyF, true);

        let first = input.sample();
        assert_relative_eq!(first.yaw, 0.1, epsilon = 1e-6);
        assert_relative_eq!(first.pitch, 0.05, epsilon = 1e-6);
        assert_relative_eq!(first.walk, 0.12, epsilon = 1e-6);
        assert!(first.dismount);

        let second = input.sample();
        assert_eq!(second, CameraDelta::default());
    }

    #[test]
    fn mouse_motion_ignored_outside_relative_mode() {
        let mut input = InputState::new(ControlsConfig::default());
        input.add_mouse_motion(50.0, 50.0);
        assert_eq!(input.sample(), CameraDelta::default());
    }

    #[test]
    fn escape_requests_exit() {
        let mut input = InputState::new(ControlsConfig::default());
        assert!(input.set_key(KeyCode::Escape, true));
        assert!(input.sample().exit);
        assert!(!input.set_key(KeyCode::KeyP, true));
    }
}
