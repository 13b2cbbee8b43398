pub mod game;
pub mod geometry;
pub mod input;
pub mod player;
pub mod time;
pub mod timer;

/// Nominal frame length of the host's per-frame callback (60 Hz).
pub const FRAME_MS: time::Millis = 16;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::game::PlayerId;
    use crate::input::{ControlScheme, InputState};
    use crate::player::PlayerSlot;
    use crate::time::{ManualClock, Millis};

    /// Create `n` player slots with sequential ids starting at 0.
    pub fn make_slots(n: usize) -> Vec<PlayerSlot> {
        (0..n).map(PlayerSlot::new).collect()
    }

    /// A clock parked at a fixed, recognisable epoch instant.
    pub fn test_clock() -> ManualClock {
        ManualClock::new(1_700_000_000_000)
    }

    /// Input state with the given keys freshly pressed (held and edge).
    pub fn input_pressing(codes: &[&str]) -> InputState {
        let mut input = InputState::new();
        for code in codes {
            input.on_key_down(code);
        }
        input
    }

    /// Press the jump key of `id` as a fresh edge.
    pub fn press_jump(input: &mut InputState, id: PlayerId) {
        if let Some(scheme) = ControlScheme::for_slot(id) {
            input.on_key_up(scheme.jump);
            input.on_key_down(scheme.jump);
        }
    }

    /// Hold the right (`dir > 0`) or left (`dir < 0`) key of `id`.
    pub fn hold_direction(input: &mut InputState, id: PlayerId, dir: i8) {
        if let Some(scheme) = ControlScheme::for_slot(id) {
            input.on_key_up(scheme.left);
            input.on_key_up(scheme.right);
            match dir.signum() {
                1 => input.on_key_down(scheme.right),
                -1 => input.on_key_down(scheme.left),
                _ => {},
            }
        }
    }

    /// Advance `clock` by `frames` nominal frames and return the new time.
    pub fn advance_frames(clock: &ManualClock, frames: u64) -> Millis {
        use crate::time::Clock;
        clock.advance(frames * crate::FRAME_MS);
        clock.now_ms()
    }
}
