//! Raw input events and their capture from the macroquad window

use macroquad::input::{is_key_down, is_mouse_button_down, mouse_position, KeyCode, MouseButton};

pub const KEY_W: u32 = 87;
pub const KEY_A: u32 = 65;
pub const KEY_S: u32 = 83;
pub const KEY_D: u32 = 68;

pub const MOUSE_LEFT: u8 = 0;

/// Host input events in the browser's vocabulary: key codes, button indices and
/// client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(u32),
    KeyUp(u32),
    MouseDown(u8),
    MouseUp(u8),
    MouseMove { x: f32, y: f32 },
}

const TRACKED_KEYS: [u32; 4] = [KEY_W, KEY_A, KEY_S, KEY_D];

/// Sampled device state for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    /// Pressed state of W, A, S, D in that order
    pub keys: [bool; 4],
    pub mouse_left: bool,
    pub mouse: (f32, f32),
}

impl InputSnapshot {
    pub fn sample() -> Self {
        Self {
            keys: [
                is_key_down(KeyCode::W),
                is_key_down(KeyCode::A),
                is_key_down(KeyCode::S),
                is_key_down(KeyCode::D),
            ],
            mouse_left: is_mouse_button_down(MouseButton::Left),
            mouse: mouse_position(),
        }
    }
}

/// Turns polled device state into edge-triggered input events
pub struct InputManager {
    previous: InputSnapshot,
    first_poll: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            previous: InputSnapshot::default(),
            first_poll: true,
        }
    }

    /// Samples the macroquad window and returns what changed since the last poll
    pub fn poll(&mut self) -> Vec<InputEvent> {
        self.events_for(InputSnapshot::sample())
    }

    pub fn events_for(&mut self, current: InputSnapshot) -> Vec<InputEvent> {
        let mut events = Vec::new();

        // Detect key press/release events (current != previous)
        for (i, code) in TRACKED_KEYS.iter().enumerate() {
            match (self.previous.keys[i], current.keys[i]) {
                (false, true) => events.push(InputEvent::KeyDown(*code)),
                (true, false) => events.push(InputEvent::KeyUp(*code)),
                _ => {}
            }
        }

        match (self.previous.mouse_left, current.mouse_left) {
            (false, true) => events.push(InputEvent::MouseDown(MOUSE_LEFT)),
            (true, false) => events.push(InputEvent::MouseUp(MOUSE_LEFT)),
            _ => {}
        }

        if self.first_poll || current.mouse != self.previous.mouse {
            events.push(InputEvent::MouseMove {
                x: current.mouse.0,
                y: current.mouse.1,
            });
        }

        self.previous = current;
        self.first_poll = false;
        events
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_edges() {
        let mut manager = InputManager::new();
        let mut snapshot = InputSnapshot::default();

        // First poll always reports the cursor
        assert_eq!(
            manager.events_for(snapshot),
            vec![InputEvent::MouseMove { x: 0.0, y: 0.0 }]
        );

        snapshot.keys = [true, false, false, true];
        assert_eq!(
            manager.events_for(snapshot),
            vec![InputEvent::KeyDown(KEY_W), InputEvent::KeyDown(KEY_D)]
        );

        // Held keys do not repeat
        assert!(manager.events_for(snapshot).is_empty());

        snapshot.keys = [false, false, false, true];
        assert_eq!(manager.events_for(snapshot), vec![InputEvent::KeyUp(KEY_W)]);
    }

    #[test]
    fn test_mouse_edges_and_motion() {
        let mut manager = InputManager::new();
        manager.events_for(InputSnapshot::default());

        let snapshot = InputSnapshot {
            keys: [false; 4],
            mouse_left: true,
            mouse: (10.0, 20.0),
        };
        assert_eq!(
            manager.events_for(snapshot),
            vec![
                InputEvent::MouseDown(MOUSE_LEFT),
                InputEvent::MouseMove { x: 10.0, y: 20.0 }
            ]
        );

        let released = InputSnapshot {
            mouse_left: false,
            ..snapshot
        };
        assert_eq!(
            manager.events_for(released),
            vec![InputEvent::MouseUp(MOUSE_LEFT)]
        );
    }
}
