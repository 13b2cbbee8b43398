use serde::{Deserialize, Serialize};

use boinky_core::geometry::Rect;

use crate::config::{TILE_SIZE, WORLD_HEIGHT, WORLD_WIDTH};

/// Tile indices a generated platform may be drawn with.
pub const VALID_PLATFORM_TILES: [u16; 5] = [0, 2, 4, 6, 7];
/// Tileset index used to draw boost tiles.
pub const BOOST_TILE_INDEX: u16 = 87;
/// Tileset index used to draw bounce pads.
pub const BOUNCE_PAD_TILE_INDEX: u16 = 133;
/// Side length of a boost tile (three tiles).
pub const BOOST_TILE_SIZE: f32 = TILE_SIZE * 3.0;
pub const DEFAULT_TELEPORT_SIZE: f32 = 40.0;
pub const DEFAULT_ENEMY_SIZE: f32 = 40.0;
pub const DEFAULT_MUSHROOM_SIZE: f32 = 48.0;
/// Height of the ground slab at the bottom of built-in levels. Platforms
/// whose top is above `world.height - GROUND_HEIGHT` are "non-ground".
pub const GROUND_HEIGHT: f32 = 50.0;
/// Per-frame phase increment for pulsing entities.
const PULSE_STEP: f32 = 0.1;

/// Playable bounds, fixed for a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub height: f32,
}

impl World {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Move a `width`×`height` box at `(x, y)` inside the world.
    pub fn clamp_position(&self, x: f32, y: f32, width: f32, height: f32) -> (f32, f32) {
        (
            x.min(self.width - width).max(0.0),
            y.min(self.height - height).max(0.0),
        )
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WORLD_WIDTH, WORLD_HEIGHT)
    }
}

/// Floor `width` to a whole number of tiles, never less than one tile.
pub fn snap_to_tiles(width: f32) -> f32 {
    ((width / TILE_SIZE).floor() * TILE_SIZE).max(TILE_SIZE)
}

/// One-directional consumable state. `Ready` may become `Spent`, never the
/// other way round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Charge {
    #[default]
    Ready,
    Spent,
}

impl Charge {
    /// Spend the charge. Returns true only on the transition.
    pub fn consume(&mut self) -> bool {
        match self {
            Charge::Ready => {
                *self = Charge::Spent;
                true
            },
            Charge::Spent => false,
        }
    }

    pub fn is_spent(&self) -> bool {
        *self == Charge::Spent
    }
}

/// Static solid geometry. The collidable width is always a whole number of
/// tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Platform {
    rect: Rect,
    pub tile_index: u16,
}

impl Platform {
    pub fn new(x: f32, y: f32, width: f32, height: f32, tile_index: u16) -> Self {
        Self {
            rect: Rect::new(x, y, snap_to_tiles(width), height),
            tile_index,
        }
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }
}

/// Launches any overlapping player upward with a fixed velocity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BouncePad {
    rect: Rect,
    pub bounce_power: f32,
}

impl BouncePad {
    pub fn new(x: f32, y: f32, width: f32, height: f32, bounce_power: f32) -> Self {
        Self {
            rect: Rect::new(x, y, snap_to_tiles(width), height),
            bounce_power,
        }
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }
}

/// One-shot relocation to a fixed target point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Teleport {
    rect: Rect,
    pub target_x: f32,
    pub target_y: f32,
    charge: Charge,
    pub pulse: f32,
}

impl Teleport {
    pub fn new(x: f32, y: f32, target_x: f32, target_y: f32) -> Self {
        Self::with_size(
            x,
            y,
            DEFAULT_TELEPORT_SIZE,
            DEFAULT_TELEPORT_SIZE,
            target_x,
            target_y,
        )
    }

    pub fn with_size(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        target_x: f32,
        target_y: f32,
    ) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            target_x,
            target_y,
            charge: Charge::Ready,
            pulse: 0.0,
        }
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn is_used(&self) -> bool {
        self.charge.is_spent()
    }

    /// Spend the teleport. Yields the target the first time only.
    pub fn trigger(&mut self) -> Option<(f32, f32)> {
        self.charge
            .consume()
            .then_some((self.target_x, self.target_y))
    }

    pub fn animate(&mut self) {
        self.pulse += PULSE_STEP;
    }
}

/// Consumable speed/jump buff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoostTile {
    rect: Rect,
    pub pulse: f32,
}

impl BoostTile {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            rect: Rect::new(x, y, BOOST_TILE_SIZE, BOOST_TILE_SIZE),
            pulse: 0.0,
        }
    }

    /// A tile resting on the horizontal middle of `platform`'s top surface.
    pub fn above(platform: &Platform) -> Self {
        let p = platform.rect();
        Self::new(p.x + (p.width - TILE_SIZE) / 2.0, p.y - TILE_SIZE)
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn animate(&mut self) {
        self.pulse += PULSE_STEP;
    }
}

/// Co-op hazard. Dies when stomped, otherwise hurts on touch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enemy {
    rect: Rect,
    life: Charge,
}

impl Enemy {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            life: Charge::Ready,
        }
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn is_dead(&self) -> bool {
        self.life.is_spent()
    }

    pub fn kill(&mut self) -> bool {
        self.life.consume()
    }

    /// Whether a player falling at `vy` came down onto this enemy's top: its
    /// bottom edge before the move was no more than `tolerance` below the top.
    pub fn is_stomp(&self, player: &Rect, vy: f32, tolerance: f32) -> bool {
        vy > 0.0 && player.bottom() - vy <= self.rect.y + tolerance
    }
}

/// Co-op pickup that restores one life.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mushroom {
    rect: Rect,
    charge: Charge,
}

impl Mushroom {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            charge: Charge::Ready,
        }
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn is_collected(&self) -> bool {
        self.charge.is_spent()
    }

    pub fn collect(&mut self) -> bool {
        self.charge.consume()
    }
}

/// Where a player slot appears at level load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
}
