use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use boinky_core::geometry::Rect;
use boinky_core::player::MAX_PLAYERS;

use crate::config::{TILE_SIZE, WORLD_HEIGHT, WORLD_WIDTH};
use crate::entities::{
    BoostTile, BouncePad, DEFAULT_ENEMY_SIZE, DEFAULT_MUSHROOM_SIZE, DEFAULT_TELEPORT_SIZE, Enemy,
    GROUND_HEIGHT, Mushroom, Platform, SpawnPoint, Teleport, VALID_PLATFORM_TILES, World,
    snap_to_tiles,
};

/// Number of built-in procedural levels.
pub const BUILTIN_LEVEL_COUNT: usize = 3;
/// Finish zone used when a level description omits one.
pub const DEFAULT_FINISH: Rect = Rect::new(7880.0, 100.0, 80.0, 80.0);
/// Boost tiles placed on a freshly generated level.
const BUILTIN_BOOST_TILES: usize = 5;
/// Height of generated floating platforms.
const PLATFORM_THICKNESS: f32 = 20.0;
/// Height of generated bounce pads.
const PAD_THICKNESS: f32 = 20.0;

/// Platform entry of a level description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformDesc {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub tile_index: u16,
}

/// Plain rectangle entry (bounce pads, finish point).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectDesc {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Rectangle whose size may be omitted (enemies, mushrooms).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizedDesc {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeleportDesc {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    pub target_x: f32,
    pub target_y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointDesc {
    pub x: f32,
    pub y: f32,
}

/// Entity collections of a level. Every collection is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LevelElements {
    pub platforms: Vec<PlatformDesc>,
    pub bounce_pads: Vec<RectDesc>,
    pub teleports: Vec<TeleportDesc>,
    pub boost_tiles: Vec<PointDesc>,
    pub spawn_points: Vec<PointDesc>,
    pub enemies: Vec<SizedDesc>,
    pub mushrooms: Vec<SizedDesc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_point: Option<RectDesc>,
}

/// Serialized level as produced by the level editor.
///
/// Collections normally live under `elements`; older saves put them at the
/// top level, which is accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDescription {
    #[serde(default = "default_world_width")]
    pub world_width: f32,
    #[serde(default = "default_world_height")]
    pub world_height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<LevelElements>,
    #[serde(flatten)]
    pub inline_elements: LevelElements,
}

fn default_world_width() -> f32 {
    WORLD_WIDTH
}

fn default_world_height() -> f32 {
    WORLD_HEIGHT
}

impl LevelDescription {
    pub fn new(world: World, elements: LevelElements) -> Self {
        Self {
            world_width: world.width,
            world_height: world.height,
            elements: Some(elements),
            inline_elements: LevelElements::default(),
        }
    }

    pub fn elements(&self) -> &LevelElements {
        self.elements.as_ref().unwrap_or(&self.inline_elements)
    }

    /// World size, with non-positive dimensions replaced by the defaults.
    pub fn world(&self) -> World {
        World::new(
            positive_or(self.world_width, WORLD_WIDTH),
            positive_or(self.world_height, WORLD_HEIGHT),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_file(path: &Path) -> Result<Self, LevelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn to_json_string(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value > 0.0 { value } else { fallback }
}

/// Failure to read a level description.
#[derive(Debug)]
pub enum LevelError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read level: {e}"),
            Self::Parse(e) => write!(f, "invalid level description: {e}"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// What a session is started with.
#[derive(Debug, Clone, PartialEq)]
pub enum LevelSource {
    /// Built-in procedural level, by index (wraps around).
    BuiltIn(usize),
    Custom(LevelDescription),
}

/// Entities the simulation mutates during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunEntities {
    pub bounce_pads: Vec<BouncePad>,
    pub teleports: Vec<Teleport>,
    pub boost_tiles: Vec<BoostTile>,
    pub enemies: Vec<Enemy>,
    pub mushrooms: Vec<Mushroom>,
}

/// The active level: static geometry plus the per-run entity lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    pub world: World,
    pub platforms: Vec<Platform>,
    pub spawn_points: Vec<SpawnPoint>,
    pub finish: Rect,
    pub entities: RunEntities,
}

impl Level {
    /// Assemble a level from its description, filling in defaults.
    pub fn from_description(desc: &LevelDescription, bounce_power: f32) -> Self {
        let elements = desc.elements();
        let world = desc.world();

        let platforms = elements
            .platforms
            .iter()
            .map(|p| Platform::new(p.x, p.y, p.width, p.height, p.tile_index))
            .collect();
        let bounce_pads = elements
            .bounce_pads
            .iter()
            .map(|p| BouncePad::new(p.x, p.y, p.width, p.height, bounce_power))
            .collect();
        let teleports = elements
            .teleports
            .iter()
            .map(|t| {
                Teleport::with_size(
                    t.x,
                    t.y,
                    size_or(t.width, DEFAULT_TELEPORT_SIZE),
                    size_or(t.height, DEFAULT_TELEPORT_SIZE),
                    t.target_x,
                    t.target_y,
                )
            })
            .collect();
        let boost_tiles = elements
            .boost_tiles
            .iter()
            .map(|b| BoostTile::new(b.x, b.y))
            .collect();
        let enemies = elements
            .enemies
            .iter()
            .map(|e| {
                Enemy::new(
                    e.x,
                    e.y,
                    size_or(e.width, DEFAULT_ENEMY_SIZE),
                    size_or(e.height, DEFAULT_ENEMY_SIZE),
                )
            })
            .collect();
        let mushrooms = elements
            .mushrooms
            .iter()
            .map(|m| {
                Mushroom::new(
                    m.x,
                    m.y,
                    size_or(m.width, DEFAULT_MUSHROOM_SIZE),
                    size_or(m.height, DEFAULT_MUSHROOM_SIZE),
                )
            })
            .collect();
        let spawn_points = elements
            .spawn_points
            .iter()
            .take(MAX_PLAYERS)
            .map(|s| SpawnPoint { x: s.x, y: s.y })
            .collect();
        let finish = elements
            .finish_point
            .as_ref()
            .map(|f| Rect::new(f.x, f.y, f.width, f.height))
            .unwrap_or(DEFAULT_FINISH);

        Self {
            world,
            platforms,
            spawn_points,
            finish,
            entities: RunEntities {
                bounce_pads,
                teleports,
                boost_tiles,
                enemies,
                mushrooms,
            },
        }
    }

    /// Spawn point for a player slot, or the bottom centre of the world.
    pub fn spawn_for(&self, slot: usize) -> SpawnPoint {
        self.spawn_points
            .get(slot)
            .copied()
            .unwrap_or(SpawnPoint {
                x: self.world.width / 2.0,
                y: self.world.height - 100.0,
            })
    }
}

fn size_or(size: Option<f32>, fallback: f32) -> f32 {
    size.filter(|s| *s > 0.0).unwrap_or(fallback)
}

/// Whether a platform is above the ground slab.
pub fn is_floating(platform: &Platform, world: &World) -> bool {
    platform.rect().y < world.height - GROUND_HEIGHT
}

/// Pick a platform to hold a boost tile: uniformly among floating ones,
/// falling back to any platform when none float.
pub fn pick_boost_anchor<'a, R: Rng>(
    platforms: &'a [Platform],
    world: &World,
    rng: &mut R,
) -> Option<&'a Platform> {
    let floating: Vec<&Platform> = platforms
        .iter()
        .filter(|p| is_floating(p, world))
        .collect();
    match floating.choose(rng) {
        Some(p) => Some(*p),
        None => platforms.choose(rng),
    }
}

/// A row of evenly spaced bounce pads, `rise` units above the world floor.
struct PadRow {
    start: f32,
    step: f32,
    count: u32,
    rise: f32,
    width: f32,
}

/// Parameters of one built-in layout.
struct Layout {
    ground_tile: u16,
    layers: u32,
    layer_spacing: f32,
    /// Horizontal gap is `gap_base + (layer % gap_cycle) * gap_step`.
    gap_base: f32,
    gap_cycle: u32,
    gap_step: f32,
    /// Platform width is `width_base + (layer % 3) * width_step`.
    width_base: f32,
    width_step: f32,
    pad_rows: &'static [PadRow],
    teleports: fn(&World) -> Vec<TeleportDesc>,
}

const LAYOUTS: [Layout; BUILTIN_LEVEL_COUNT] = [
    Layout {
        ground_tile: 0,
        layers: 25,
        layer_spacing: 180.0,
        gap_base: 400.0,
        gap_cycle: 4,
        gap_step: 100.0,
        width_base: 150.0,
        width_step: 50.0,
        pad_rows: &[
            PadRow {
                start: 250.0,
                step: 500.0,
                count: 16,
                rise: 170.0,
                width: 48.0,
            },
            PadRow {
                start: 1150.0,
                step: 1000.0,
                count: 7,
                rise: 300.0,
                width: 50.0,
            },
            PadRow {
                start: 1550.0,
                step: 1000.0,
                count: 6,
                rise: 480.0,
                width: 50.0,
            },
        ],
        teleports: meadow_teleports,
    },
    Layout {
        ground_tile: 2,
        layers: 25,
        layer_spacing: 180.0,
        gap_base: 400.0,
        gap_cycle: 4,
        gap_step: 100.0,
        width_base: 150.0,
        width_step: 50.0,
        pad_rows: &[
            PadRow {
                start: 175.0,
                step: 500.0,
                count: 16,
                rise: 170.0,
                width: 50.0,
            },
            PadRow {
                start: 575.0,
                step: 1000.0,
                count: 7,
                rise: 330.0,
                width: 50.0,
            },
            PadRow {
                start: 550.0,
                step: 1000.0,
                count: 7,
                rise: 510.0,
                width: 50.0,
            },
        ],
        teleports: canyon_teleports,
    },
    Layout {
        ground_tile: 4,
        layers: 40,
        layer_spacing: 120.0,
        gap_base: 180.0,
        gap_cycle: 5,
        gap_step: 30.0,
        width_base: 100.0,
        width_step: 60.0,
        pad_rows: &[
            PadRow {
                start: 150.0,
                step: 400.0,
                count: 20,
                rise: 200.0,
                width: 50.0,
            },
            PadRow {
                start: 350.0,
                step: 400.0,
                count: 19,
                rise: 330.0,
                width: 50.0,
            },
            PadRow {
                start: 600.0,
                step: 600.0,
                count: 12,
                rise: 590.0,
                width: 50.0,
            },
        ],
        teleports: tower_teleports,
    },
];

fn link(x: f32, y: f32, target_x: f32, target_y: f32) -> TeleportDesc {
    TeleportDesc {
        x,
        y,
        width: None,
        height: None,
        target_x,
        target_y,
    }
}

// Targets sit beside the paired teleport so arrivals never chain.

fn meadow_teleports(w: &World) -> Vec<TeleportDesc> {
    let floor = w.height - 100.0;
    vec![
        link(100.0, floor, w.width - 220.0, floor),
        link(w.width - 150.0, floor, 180.0, floor),
        link(w.width / 4.0, floor, w.width * 3.0 / 4.0 + 60.0, floor),
        link(w.width * 3.0 / 4.0, floor, w.width / 4.0 + 60.0, floor),
    ]
}

fn canyon_teleports(w: &World) -> Vec<TeleportDesc> {
    let floor = w.height - 100.0;
    vec![
        link(50.0, floor, w.width - 160.0, w.height - 500.0),
        link(w.width - 100.0, w.height - 500.0, 110.0, floor),
        link(w.width / 2.0, floor, w.width / 2.0, w.height - 2000.0),
    ]
}

fn tower_teleports(w: &World) -> Vec<TeleportDesc> {
    let floor = w.height - 100.0;
    vec![
        link(50.0, floor, w.width - 160.0, w.height - 600.0),
        link(w.width - 100.0, w.height - 600.0, 110.0, floor),
        link(w.width / 2.0 - 50.0, floor, w.width / 2.0 - 50.0, w.height - 600.0),
        link(w.width / 4.0, floor, w.width * 3.0 / 4.0, floor),
    ]
}

/// Generate built-in level `index` (wrapping) for `world`. Deterministic
/// for a given seed.
pub fn generate_level(index: usize, world: World, seed: u64) -> LevelDescription {
    let layout = &LAYOUTS[index % BUILTIN_LEVEL_COUNT];
    let mut rng = StdRng::seed_from_u64(seed);
    let (w, h) = (world.width, world.height);

    let mut platforms = vec![PlatformDesc {
        x: 0.0,
        y: h - GROUND_HEIGHT,
        width: w,
        height: GROUND_HEIGHT,
        tile_index: layout.ground_tile,
    }];
    for layer in 0..layout.layers {
        let y = h - 150.0 - layer as f32 * layout.layer_spacing;
        if y < 0.0 {
            break;
        }
        let gap = layout.gap_base + (layer % layout.gap_cycle) as f32 * layout.gap_step;
        let width = layout.width_base + (layer % 3) as f32 * layout.width_step;
        let width = snap_to_tiles(width);
        let mut x = 0.0;
        while x + width <= w {
            let tile_index = VALID_PLATFORM_TILES[rng.random_range(0..VALID_PLATFORM_TILES.len())];
            platforms.push(PlatformDesc {
                x,
                y,
                width,
                height: PLATFORM_THICKNESS,
                tile_index,
            });
            x += gap;
        }
    }

    let floating: Vec<&PlatformDesc> = platforms
        .iter()
        .filter(|p| p.y < h - GROUND_HEIGHT)
        .collect();
    let mut boost_tiles = Vec::with_capacity(BUILTIN_BOOST_TILES);
    for _ in 0..BUILTIN_BOOST_TILES {
        let Some(p) = floating.choose(&mut rng) else {
            break;
        };
        boost_tiles.push(PointDesc {
            x: p.x + (p.width - TILE_SIZE) / 2.0,
            y: p.y - TILE_SIZE,
        });
    }

    let bounce_pads = layout
        .pad_rows
        .iter()
        .flat_map(|row| {
            (0..row.count).map(move |i| RectDesc {
                x: row.start + i as f32 * row.step,
                y: h - row.rise,
                width: row.width,
                height: PAD_THICKNESS,
            })
        })
        .filter(|pad| pad.x < w)
        .collect();

    let spawn_points = [-100.0, 100.0, 0.0, -50.0]
        .iter()
        .map(|dx| PointDesc {
            x: w / 2.0 + dx,
            y: h - 100.0,
        })
        .collect();

    LevelDescription::new(
        world,
        LevelElements {
            platforms,
            bounce_pads,
            teleports: (layout.teleports)(&world),
            boost_tiles,
            spawn_points,
            enemies: Vec::new(),
            mushrooms: Vec::new(),
            finish_point: Some(RectDesc {
                x: w - 120.0,
                y: 100.0,
                width: 80.0,
                height: 80.0,
            }),
        },
    )
}
