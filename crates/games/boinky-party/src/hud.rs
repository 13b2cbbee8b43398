use serde::Serialize;

use boinky_core::game::{GameMode, PlayerScore};

use crate::camera::RenderPlan;
use crate::physics::PlayerState;
use crate::rules::CoopOutcome;

const FULL_HEART: char = '♥';
const EMPTY_HEART: char = '♡';

/// Everything the host overlays on top of the world for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub mode: GameMode,
    /// Tag scores, indexed by player id.
    pub scores: Vec<PlayerScore>,
    /// `MM:SS` round clock (tag only).
    pub timer: Option<String>,
    /// Hearts line (co-op only).
    pub lives: Option<String>,
    /// Terminal overlay text (co-op only).
    pub message: Option<&'static str>,
    pub render: RenderPlan,
}

impl Hud {
    pub fn tag(scores: Vec<PlayerScore>, remaining_secs: u64, render: RenderPlan) -> Self {
        Self {
            mode: GameMode::Tag,
            scores,
            timer: Some(format_clock(remaining_secs)),
            lives: None,
            message: None,
            render,
        }
    }

    pub fn coop(
        players: &[PlayerState],
        max_lives: u8,
        outcome: Option<CoopOutcome>,
        render: RenderPlan,
    ) -> Self {
        Self {
            mode: GameMode::Coop,
            scores: Vec::new(),
            timer: None,
            lives: Some(lives_line(players, max_lives)),
            message: outcome.map(outcome_message),
            render,
        }
    }
}

/// Whole seconds as zero-padded `MM:SS`.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `P1: ♥♥♡  P2: ♥♥♥`, one entry per player.
pub fn lives_line(players: &[PlayerState], max_lives: u8) -> String {
    players
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let full = p.lives.min(max_lives);
            let mut entry = format!("P{}: ", i + 1);
            entry.extend(std::iter::repeat_n(FULL_HEART, full as usize));
            entry.extend(std::iter::repeat_n(EMPTY_HEART, (max_lives - full) as usize));
            entry
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn outcome_message(outcome: CoopOutcome) -> &'static str {
    match outcome {
        CoopOutcome::LevelComplete => "Level complete!",
        CoopOutcome::GameOver => "Game over",
    }
}
