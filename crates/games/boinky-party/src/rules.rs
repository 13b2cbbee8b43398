use serde::Serialize;

use boinky_core::game::{GameEvent, GameMode, PlayerId};
use boinky_core::time::Millis;

use crate::config::GameConfig;
use crate::level::Level;
use crate::physics::PlayerState;

/// How a co-op run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoopOutcome {
    LevelComplete,
    GameOver,
}

/// Tag: exactly one player is "it" at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRules {
    it: PlayerId,
}

impl TagRules {
    pub fn new(it: PlayerId) -> Self {
        Self { it }
    }

    pub fn it(&self) -> PlayerId {
        self.it
    }

    /// Pass "it" to the first other player the holder touches, unless the
    /// holder is still immune from its own tag.
    pub fn resolve(
        &mut self,
        players: &mut [PlayerState],
        now: Millis,
        immunity_ms: Millis,
        events: &mut Vec<GameEvent>,
    ) {
        let Some(holder) = players.get(self.it) else {
            return;
        };
        if holder.tag_immunity.is_active(now) {
            return;
        }
        let holder_rect = holder.rect();
        let from = self.it;
        let Some(target) = players
            .iter_mut()
            .enumerate()
            .find(|(id, p)| *id != from && holder_rect.overlaps(&p.rect()))
        else {
            return;
        };
        let (to, tagged) = target;
        tagged.tag_immunity.start(now, immunity_ms);
        self.it = to;
        tracing::debug!(from, to, "Tag transferred");
        events.push(GameEvent::Tagged { from, to });
    }
}

/// Co-op: shared goal, per-player lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoopRules {
    outcome: Option<CoopOutcome>,
}

impl CoopRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(&self) -> Option<CoopOutcome> {
        self.outcome
    }

    /// Resolve enemies and mushrooms, then check the finish zone and lives.
    pub fn resolve(
        &mut self,
        players: &mut [PlayerState],
        level: &mut Level,
        now: Millis,
        config: &GameConfig,
        events: &mut Vec<GameEvent>,
    ) {
        let rules = &config.rules;
        let entities = &mut level.entities;

        for player in players.iter_mut() {
            for (index, enemy) in entities.enemies.iter_mut().enumerate() {
                if enemy.is_dead() || !player.rect().overlaps(enemy.rect()) {
                    continue;
                }
                if enemy.is_stomp(&player.rect(), player.vy, rules.stomp_tolerance) {
                    enemy.kill();
                    player.vy = -rules.stomp_bounce;
                    tracing::debug!(player_id = player.id, enemy = index, "Enemy stomped");
                    events.push(GameEvent::EnemyStomped {
                        player_id: player.id,
                        enemy: index,
                    });
                } else if !player.invincible.is_active(now) && player.lives > 0 {
                    player.lives -= 1;
                    player.invincible.start(now, config.timing.invincibility_ms);
                    tracing::debug!(player_id = player.id, lives = player.lives, "Player hit");
                    events.push(GameEvent::PlayerHit {
                        player_id: player.id,
                        lives_left: player.lives,
                    });
                }
            }

            for mushroom in entities.mushrooms.iter_mut() {
                if mushroom.is_collected() || !player.rect().overlaps(mushroom.rect()) {
                    continue;
                }
                if mushroom.collect() {
                    player.lives = player.lives.saturating_add(1).min(rules.max_lives);
                    events.push(GameEvent::LifeRestored {
                        player_id: player.id,
                        lives: player.lives,
                    });
                }
            }
        }

        if self.outcome.is_some() {
            return;
        }
        let finished =
            !players.is_empty() && players.iter().all(|p| p.rect().overlaps(&level.finish));
        let defeated = players.iter().any(|p| p.lives == 0);
        if finished {
            self.outcome = Some(CoopOutcome::LevelComplete);
            events.push(GameEvent::LevelComplete);
        } else if defeated {
            self.outcome = Some(CoopOutcome::GameOver);
            events.push(GameEvent::GameOver);
        }
    }
}

/// Mode-specific rule state of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Rules {
    Tag(TagRules),
    Coop(CoopRules),
}

impl Rules {
    pub fn mode(&self) -> GameMode {
        match self {
            Rules::Tag(_) => GameMode::Tag,
            Rules::Coop(_) => GameMode::Coop,
        }
    }

    /// The current "it" holder in tag mode.
    pub fn tag_holder(&self) -> Option<PlayerId> {
        match self {
            Rules::Tag(tag) => Some(tag.it()),
            Rules::Coop(_) => None,
        }
    }

    pub fn coop_outcome(&self) -> Option<CoopOutcome> {
        match self {
            Rules::Tag(_) => None,
            Rules::Coop(coop) => coop.outcome(),
        }
    }

    pub fn resolve(
        &mut self,
        players: &mut [PlayerState],
        level: &mut Level,
        now: Millis,
        config: &GameConfig,
        events: &mut Vec<GameEvent>,
    ) {
        match self {
            Rules::Tag(tag) => tag.resolve(players, now, config.timing.tag_immunity_ms, events),
            Rules::Coop(coop) => coop.resolve(players, level, now, config, events),
        }
    }
}
