use serde::{Deserialize, Serialize};

use crate::game::PlayerId;

/// Maximum number of local player slots.
pub const MAX_PLAYERS: usize = 4;

/// A local player seat: identity plus the visual it is drawn with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSlot {
    pub id: PlayerId,
    pub display_name: String,
    pub skin: PlayerSkin,
}

impl PlayerSlot {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            display_name: format!("P{}", id + 1),
            skin: PlayerSkin::for_slot(id),
        }
    }
}

/// Visual descriptor for a player. Simulation identity never depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerSkin {
    /// Sprite-sheet character, with the color used while sprites are missing.
    Sprite {
        sheet: SpriteSheet,
        fallback: PlayerColor,
    },
    /// Plain colored block with the slot number drawn on it.
    Block(PlayerColor),
}

/// Character sprite sheets shipped with the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteSheet {
    Piggy,
    GoldenPiggy,
}

impl PlayerSkin {
    /// Skin lookup table indexed by slot.
    pub const TABLE: [PlayerSkin; MAX_PLAYERS] = [
        PlayerSkin::Sprite {
            sheet: SpriteSheet::Piggy,
            fallback: PlayerColor::PALETTE[0],
        },
        PlayerSkin::Sprite {
            sheet: SpriteSheet::GoldenPiggy,
            fallback: PlayerColor::PALETTE[1],
        },
        PlayerSkin::Block(PlayerColor::PALETTE[2]),
        PlayerSkin::Block(PlayerColor::PALETTE[3]),
    ];

    pub fn for_slot(id: PlayerId) -> Self {
        Self::TABLE[id % MAX_PLAYERS]
    }

    pub fn sprite_sheet(&self) -> Option<SpriteSheet> {
        match self {
            PlayerSkin::Sprite { sheet, .. } => Some(*sheet),
            PlayerSkin::Block(_) => None,
        }
    }

    /// Color used when no sprite frames are available.
    pub fn color(&self) -> PlayerColor {
        match self {
            PlayerSkin::Sprite { fallback, .. } => *fallback,
            PlayerSkin::Block(color) => *color,
        }
    }
}

/// Avatar color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for PlayerColor {
    fn default() -> Self {
        Self::PALETTE[0]
    }
}

impl PlayerColor {
    /// Per-slot palette.
    pub const PALETTE: [PlayerColor; MAX_PLAYERS] = [
        PlayerColor {
            r: 0xff,
            g: 0x44,
            b: 0x44,
        }, // Red
        PlayerColor {
            r: 0x44,
            g: 0x44,
            b: 0xff,
        }, // Blue
        PlayerColor {
            r: 0x44,
            g: 0xff,
            b: 0x44,
        }, // Green
        PlayerColor {
            r: 0xff,
            g: 0x44,
            b: 0xff,
        }, // Magenta
    ];

    /// CSS hex string, e.g. `#ff4444`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
