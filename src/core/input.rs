use std::collections::BTreeMap;

use crate::core::prelude::*;
use num_traits::Zero;

/// Keys and mouse buttons the arena listens to. Whatever window layer feeds the
/// [`InputHandler`] maps its own codes onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyCode {
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    MouseLeft,
    MouseRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputState {
    Pressed,
    Held,
    Released,
}

/// Polled key/button state plus the mouse position in screen space (pixels, y pointing down).
///
/// Events are queued as they arrive and applied once per frame by
/// [`update_step`](InputHandler::update_step), so every reader in a frame sees the same state.
#[derive(Clone, Debug, Default)]
pub struct InputHandler {
    data: BTreeMap<KeyCode, InputState>,
    queued_events: Vec<(KeyCode, ElementState)>,
    mouse_pos: Vec2,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            queued_events: Vec::new(),
            mouse_pos: Vec2::zero(),
        }
    }

    pub fn pressed(&self, key: KeyCode) -> bool {
        self.data.get(&key) == Some(&InputState::Pressed)
    }
    pub fn released(&self, key: KeyCode) -> bool {
        self.data.get(&key) == Some(&InputState::Released)
    }
    pub fn held(&self, key: KeyCode) -> bool {
        self.data.get(&key) == Some(&InputState::Held)
    }
    pub fn stayed_up(&self, key: KeyCode) -> bool {
        !self.data.contains_key(&key)
    }
    pub fn down(&self, key: KeyCode) -> bool {
        self.pressed(key) || self.held(key)
    }
    pub fn up(&self, key: KeyCode) -> bool {
        self.released(key) || self.stayed_up(key)
    }

    pub fn set_mouse_pos(&mut self, pos: Vec2) {
        self.mouse_pos = pos;
    }
    pub fn screen_mouse_pos(&self) -> Vec2 {
        self.mouse_pos
    }

    pub fn queue_event(&mut self, key: KeyCode, state: ElementState) {
        self.queued_events.push((key, state));
    }

    pub fn update_step(&mut self) {
        self.data = self
            .data
            .iter()
            .filter_map(|(key, state)| match state {
                InputState::Pressed | InputState::Held => Some((*key, InputState::Held)),
                InputState::Released => None,
            })
            .collect();
        for (key, state) in self.queued_events.drain(..) {
            match self.data.get(&key) {
                None => {
                    self.data.insert(
                        key,
                        match state {
                            ElementState::Pressed => InputState::Pressed,
                            ElementState::Released => InputState::Released,
                        },
                    );
                }
                Some(InputState::Pressed | InputState::Held) => {
                    if state == ElementState::Released {
                        self.data.insert(key, InputState::Released);
                    }
                }
                Some(InputState::Released) => {
                    if state == ElementState::Pressed {
                        self.data.insert(key, InputState::Pressed);
                    }
                }
            }
        }
    }
}
