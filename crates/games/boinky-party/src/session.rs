use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use boinky_core::game::{GameEvent, GameMode, PlayerId, PlayerScore};
use boinky_core::input::InputState;
use boinky_core::player::{MAX_PLAYERS, PlayerSlot, SpriteSheet};
use boinky_core::time::Millis;

use crate::camera::{CameraRig, RenderPlan, Viewport};
use crate::config::GameConfig;
use crate::entities::World;
use crate::hud::Hud;
use crate::interactions::resolve_interactions;
use crate::level::{Level, LevelSource, generate_level};
use crate::physics::PlayerState;
use crate::rules::{CoopOutcome, CoopRules, Rules, TagRules};
use crate::scoring::{RoundTimer, ScoreBoard, round_scorer};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    /// Co-op won. Simulation is frozen until `stop`.
    LevelComplete,
    /// Co-op lost. Simulation is frozen until `stop`.
    GameOver,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::LevelComplete | SessionState::GameOver)
    }
}

/// Output of one frame step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub state: SessionState,
    pub events: Vec<GameEvent>,
    pub hud: Hud,
}

/// Everything that belongs to one started level.
#[derive(Debug, Clone)]
struct Run {
    player_count: usize,
    slots: Vec<PlayerSlot>,
    level: Level,
    players: Vec<PlayerState>,
    rules: Rules,
    round: RoundTimer,
    scores: ScoreBoard,
    cameras: CameraRig,
}

/// Owns the run state and steps it one frame at a time, in a fixed order.
pub struct GameSession {
    config: GameConfig,
    rng: StdRng,
    viewport: Viewport,
    /// Frame counts of loaded sprite sheets. Missing sheets draw as blocks.
    sprite_frames: HashMap<SpriteSheet, usize>,
    state: SessionState,
    run: Option<Run>,
}

impl GameSession {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            viewport: Viewport::default(),
            sprite_frames: HashMap::new(),
            state: SessionState::Idle,
            run: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Host surface resized.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Record how many frames a sprite sheet has once the asset layer has
    /// loaded it. Applies to the running session and later ones.
    pub fn set_sprite_frames(&mut self, sheet: SpriteSheet, frames: usize) {
        self.sprite_frames.insert(sheet, frames);
        if let Some(run) = self.run.as_mut() {
            for (player, slot) in run.players.iter_mut().zip(&run.slots) {
                if slot.skin.sprite_sheet() == Some(sheet) {
                    player.cosmetics.frame_count = frames;
                    player.cosmetics.animation_frame = 0;
                }
            }
        }
    }

    fn frames_for(&self, slot: &PlayerSlot) -> usize {
        slot.skin
            .sprite_sheet()
            .and_then(|sheet| self.sprite_frames.get(&sheet).copied())
            .unwrap_or(0)
    }

    /// Load a level and spawn players. Scores, round flags and terminal
    /// state are reset.
    pub fn start(
        &mut self,
        mode: GameMode,
        player_count: usize,
        source: LevelSource,
        now: Millis,
    ) {
        let count = player_count.clamp(1, MAX_PLAYERS);
        if count != player_count {
            warn!(requested = player_count, using = count, "Player count out of range");
        }

        let bounce_power = self.config.rules.bounce_power;
        let level = match source {
            LevelSource::BuiltIn(index) => {
                let world = World::new(self.config.world.width, self.config.world.height);
                let desc = generate_level(index, world, self.rng.random());
                Level::from_description(&desc, bounce_power)
            },
            LevelSource::Custom(desc) => Level::from_description(&desc, bounce_power),
        };

        let lives = self.config.rules.max_lives;
        let slots: Vec<PlayerSlot> = (0..count).map(PlayerSlot::new).collect();
        let players: Vec<PlayerState> = slots
            .iter()
            .map(|slot| {
                let mut player = PlayerState::new(
                    slot.id,
                    level.spawn_for(slot.id),
                    &self.config.physics,
                    lives,
                    now,
                );
                player.cosmetics.frame_count = self.frames_for(slot);
                player
            })
            .collect();

        let rules = match mode {
            GameMode::Tag => Rules::Tag(TagRules::new(self.rng.random_range(0..count))),
            GameMode::Coop => Rules::Coop(CoopRules::new()),
        };

        let mut cameras = CameraRig::new(&self.config.camera);
        let targets: Vec<_> = players.iter().map(PlayerState::rect).collect();
        cameras
            .shared
            .frame_initial(&targets, self.viewport, &self.config.camera);

        info!(
            mode = mode.as_str(),
            players = count,
            platforms = level.platforms.len(),
            it = rules.tag_holder(),
            "Session started"
        );

        self.run = Some(Run {
            player_count: count,
            slots,
            level,
            players,
            rules,
            round: RoundTimer::new(self.config.rules.round_duration_secs, now),
            scores: ScoreBoard::new(count),
            cameras,
        });
        self.state = SessionState::Running;
    }

    /// Exit to idle. Later frames are no-ops until the next `start`.
    pub fn stop(&mut self) {
        if self.run.take().is_some() {
            info!("Session stopped");
        }
        self.state = SessionState::Idle;
    }

    /// Step one frame. Returns `None` while idle. In a terminal co-op state
    /// the world is left untouched and only the overlay is reported.
    pub fn frame(&mut self, input: &mut InputState, now: Millis) -> Option<FrameReport> {
        let run = self.run.as_mut()?;
        let cfg = &self.config;

        if self.state.is_terminal() {
            input.end_frame();
            let render = run.cameras.render_plan(self.viewport);
            return Some(FrameReport {
                state: self.state,
                events: Vec::new(),
                hud: build_hud(run, cfg, now, render),
            });
        }

        // Input
        for player in run.players.iter_mut() {
            let command = input.command_for(player.id, run.player_count);
            player.apply_command(&command, cfg.physics.max_jumps);
        }
        input.end_frame();

        // Time-based entities
        for teleport in run.level.entities.teleports.iter_mut() {
            teleport.animate();
        }
        for tile in run.level.entities.boost_tiles.iter_mut() {
            tile.animate();
        }

        // Kinematics
        let it = run.rules.tag_holder();
        for player in run.players.iter_mut() {
            player.update(&run.level.platforms, &run.level.world, now, &cfg.physics);
            player.update_cosmetics(it == Some(player.id), now, &cfg.timing, &mut self.rng);
        }

        // Interactions
        let mut events = resolve_interactions(
            &mut run.players,
            &mut run.level,
            &mut run.rules,
            now,
            cfg,
            &mut self.rng,
        );

        // View layout and cameras
        let targets: Vec<_> = run.players.iter().map(PlayerState::rect).collect();
        let split_allowed = run.rules.mode() == GameMode::Coop && run.player_count == 2;
        if let Some(split) = run.cameras.update(
            &targets,
            split_allowed,
            self.viewport,
            &run.level.world,
            &cfg.camera,
        ) {
            debug!(split, "Split screen toggled");
            events.push(GameEvent::SplitScreenChanged { split });
        }

        // Round timer and end conditions
        if let Some(it) = run.rules.tag_holder() {
            if run.round.is_due(now) {
                if let Some(player_id) = round_scorer(run.player_count, it) {
                    run.scores.award(player_id);
                    run.round.restart(now);
                    info!(player_id, it, "Round scored");
                    events.push(GameEvent::RoundScored { player_id });
                }
            }
        }
        match run.rules.coop_outcome() {
            Some(CoopOutcome::LevelComplete) => {
                info!("Level complete");
                self.state = SessionState::LevelComplete;
            },
            Some(CoopOutcome::GameOver) => {
                info!("Game over");
                self.state = SessionState::GameOver;
            },
            None => {},
        }

        let render = run.cameras.render_plan(self.viewport);
        Some(FrameReport {
            state: self.state,
            events,
            hud: build_hud(run, cfg, now, render),
        })
    }

    pub fn players(&self) -> &[PlayerState] {
        match &self.run {
            Some(run) => &run.players,
            None => &[],
        }
    }

    /// Mutable player access for hosts and tests that place players directly.
    pub fn players_mut(&mut self) -> &mut [PlayerState] {
        match &mut self.run {
            Some(run) => &mut run.players,
            None => &mut [],
        }
    }

    /// Seats of the running session, with their skins.
    pub fn slots(&self) -> &[PlayerSlot] {
        match &self.run {
            Some(run) => &run.slots,
            None => &[],
        }
    }

    pub fn level(&self) -> Option<&Level> {
        self.run.as_ref().map(|run| &run.level)
    }

    pub fn mode(&self) -> Option<GameMode> {
        self.run.as_ref().map(|run| run.rules.mode())
    }

    pub fn tag_holder(&self) -> Option<PlayerId> {
        self.run.as_ref().and_then(|run| run.rules.tag_holder())
    }

    pub fn scores(&self) -> Vec<PlayerScore> {
        self.run
            .as_ref()
            .map(|run| run.scores.snapshot())
            .unwrap_or_default()
    }

    pub fn cameras(&self) -> Option<&CameraRig> {
        self.run.as_ref().map(|run| &run.cameras)
    }

    pub fn render_plan(&self) -> RenderPlan {
        self.run
            .as_ref()
            .map(|run| run.cameras.render_plan(self.viewport))
            .unwrap_or_default()
    }
}

fn build_hud(run: &Run, cfg: &GameConfig, now: Millis, render: RenderPlan) -> Hud {
    match run.rules.mode() {
        GameMode::Tag => Hud::tag(run.scores.snapshot(), run.round.remaining_secs(now), render),
        GameMode::Coop => Hud::coop(
            &run.players,
            cfg.rules.max_lives,
            run.rules.coop_outcome(),
            render,
        ),
    }
}
