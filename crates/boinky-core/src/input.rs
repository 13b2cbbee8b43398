use std::collections::HashSet;

use crate::game::PlayerId;
use crate::player::MAX_PLAYERS;

/// Key codes (DOM `KeyboardEvent.code`) bound to one player slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlScheme {
    pub left: &'static str,
    pub right: &'static str,
    pub jump: &'static str,
}

impl ControlScheme {
    /// Fixed bindings per slot: WASD, arrows, IJKL, TFGH.
    pub const BINDINGS: [ControlScheme; MAX_PLAYERS] = [
        ControlScheme {
            left: "KeyA",
            right: "KeyD",
            jump: "KeyW",
        },
        ControlScheme {
            left: "ArrowLeft",
            right: "ArrowRight",
            jump: "ArrowUp",
        },
        ControlScheme {
            left: "KeyJ",
            right: "KeyL",
            jump: "KeyI",
        },
        ControlScheme {
            left: "KeyF",
            right: "KeyH",
            jump: "KeyT",
        },
    ];

    pub fn for_slot(id: PlayerId) -> Option<&'static ControlScheme> {
        Self::BINDINGS.get(id)
    }
}

/// On-screen button state for one player in two-player touch mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchButtons {
    pub left: bool,
    pub right: bool,
}

/// Touch button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Left,
    Right,
    Jump,
}

/// What one player asks for this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerCommand {
    pub left: bool,
    pub right: bool,
    /// Edge-triggered: true only on the frame the jump key went down.
    pub jump_pressed: bool,
}

impl PlayerCommand {
    /// Horizontal intent in `{-1, 0, 1}`. Right wins when both are held.
    pub fn move_dir(&self) -> f32 {
        if self.right {
            1.0
        } else if self.left {
            -1.0
        } else {
            0.0
        }
    }
}

/// Keyboard and touch state, fed by host events and drained once per frame.
pub struct InputState {
    /// Keys currently held down.
    pub keys_down: HashSet<String>,
    /// Keys pressed since the last frame (cleared each frame).
    pub keys_just_pressed: HashSet<String>,
    /// Touch buttons for players 1 and 2.
    pub touch: [TouchButtons; 2],
    /// Whether the on-screen buttons replace the keyboard for movement.
    pub touch_enabled: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_just_pressed: HashSet::new(),
            touch: [TouchButtons::default(); 2],
            touch_enabled: false,
        }
    }

    /// Register a key down event. Auto-repeat does not count as a new press.
    pub fn on_key_down(&mut self, code: &str) {
        if self.keys_down.insert(code.to_string()) {
            self.keys_just_pressed.insert(code.to_string());
        }
    }

    pub fn on_key_up(&mut self, code: &str) {
        self.keys_down.remove(code);
        self.keys_just_pressed.remove(code);
    }

    /// Touch button pressed. Jump is injected as a key press for the slot.
    pub fn on_touch_start(&mut self, id: PlayerId, action: TouchAction) {
        match action {
            TouchAction::Jump => {
                if let Some(scheme) = ControlScheme::for_slot(id) {
                    self.keys_just_pressed.insert(scheme.jump.to_string());
                }
            },
            TouchAction::Left => {
                if let Some(buttons) = self.touch.get_mut(id) {
                    buttons.left = true;
                }
            },
            TouchAction::Right => {
                if let Some(buttons) = self.touch.get_mut(id) {
                    buttons.right = true;
                }
            },
        }
    }

    pub fn on_touch_end(&mut self, id: PlayerId, action: TouchAction) {
        if let Some(buttons) = self.touch.get_mut(id) {
            match action {
                TouchAction::Left => buttons.left = false,
                TouchAction::Right => buttons.right = false,
                TouchAction::Jump => {},
            }
        }
    }

    /// Touch cancelled: release every on-screen button.
    pub fn on_touch_cancel(&mut self) {
        self.touch = [TouchButtons::default(); 2];
    }

    pub fn is_key_down(&self, code: &str) -> bool {
        self.keys_down.contains(code)
    }

    pub fn is_key_just_pressed(&self, code: &str) -> bool {
        self.keys_just_pressed.contains(code)
    }

    /// Resolve the command for one slot. `player_count` decides whether the
    /// touch buttons are in play (two-player touch mode only).
    pub fn command_for(&self, id: PlayerId, player_count: usize) -> PlayerCommand {
        let Some(scheme) = ControlScheme::for_slot(id) else {
            return PlayerCommand::default();
        };
        let (left, right) = match self.touch.get(id) {
            Some(buttons) if self.touch_enabled && player_count == 2 => {
                (buttons.left, buttons.right)
            },
            _ => (self.is_key_down(scheme.left), self.is_key_down(scheme.right)),
        };
        PlayerCommand {
            left,
            right,
            jump_pressed: self.is_key_just_pressed(scheme.jump),
        }
    }

    /// Clear per-frame edge state. Call once after the frame consumed it.
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
