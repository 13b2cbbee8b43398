use serde::Serialize;

use boinky_core::game::{PlayerId, PlayerScore};
use boinky_core::time::Millis;

/// Tag-mode round countdown.
///
/// An expiry stays due until it is settled with `restart`; the guard re-arms
/// when the restarted countdown is next observed near its full duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundTimer {
    duration_secs: u64,
    started_at: Millis,
    processed: bool,
}

impl RoundTimer {
    pub fn new(duration_secs: u64, now: Millis) -> Self {
        Self {
            duration_secs,
            started_at: now,
            processed: false,
        }
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    /// Whole seconds left in the current round.
    pub fn remaining_secs(&self, now: Millis) -> u64 {
        let elapsed = now.saturating_sub(self.started_at) / 1000;
        self.duration_secs.saturating_sub(elapsed)
    }

    /// Observe the timer at `now`. True when the round has run out and the
    /// expiry has not been settled yet.
    pub fn is_due(&mut self, now: Millis) -> bool {
        let remaining = self.remaining_secs(now);
        if remaining >= self.duration_secs.saturating_sub(1) {
            self.processed = false;
        }
        remaining == 0 && !self.processed
    }

    /// Settle the current expiry and start the next round at `now`.
    pub fn restart(&mut self, now: Millis) {
        self.processed = true;
        self.started_at = now;
    }
}

/// Running per-player point totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBoard {
    scores: Vec<u32>,
}

impl ScoreBoard {
    pub fn new(player_count: usize) -> Self {
        Self {
            scores: vec![0; player_count],
        }
    }

    pub fn award(&mut self, player_id: PlayerId) {
        if let Some(score) = self.scores.get_mut(player_id) {
            *score += 1;
        }
    }

    pub fn get(&self, player_id: PlayerId) -> u32 {
        self.scores.get(player_id).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> Vec<PlayerScore> {
        self.scores
            .iter()
            .enumerate()
            .map(|(player_id, &score)| PlayerScore { player_id, score })
            .collect()
    }
}

/// Player credited when a tag round runs out: the first slot that is not
/// "it". `None` when "it" plays alone.
pub fn round_scorer(player_count: usize, it: PlayerId) -> Option<PlayerId> {
    (0..player_count).find(|&id| id != it)
}
