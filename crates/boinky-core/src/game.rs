use serde::{Deserialize, Serialize};

/// Zero-based local player slot. Decides control binding and skin.
pub type PlayerId = usize;

/// Which rule set a run is played under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// One player is "it"; when the round timer runs out everyone else scores.
    #[default]
    Tag,
    /// Shared lives and a common finish zone.
    Coop,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Tag => "tag",
            GameMode::Coop => "coop",
        }
    }
}

impl std::str::FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tag" => Ok(GameMode::Tag),
            "coop" | "co-op" => Ok(GameMode::Coop),
            other => Err(format!("unknown game mode `{other}`")),
        }
    }
}

/// Notable things that happened during a frame, for HUD, audio, and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Bounced {
        player_id: PlayerId,
    },
    Teleported {
        player_id: PlayerId,
        teleport: usize,
    },
    BoostCollected {
        player_id: PlayerId,
    },
    Tagged {
        from: PlayerId,
        to: PlayerId,
    },
    EnemyStomped {
        player_id: PlayerId,
        enemy: usize,
    },
    PlayerHit {
        player_id: PlayerId,
        lives_left: u8,
    },
    LifeRestored {
        player_id: PlayerId,
        lives: u8,
    },
    SplitScreenChanged {
        split: bool,
    },
    RoundScored {
        player_id: PlayerId,
    },
    LevelComplete,
    GameOver,
}

/// Score entry for a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub player_id: PlayerId,
    pub score: u32,
}
