use rand::Rng;
use serde::Serialize;

use boinky_core::game::PlayerId;
use boinky_core::geometry::Rect;
use boinky_core::input::PlayerCommand;
use boinky_core::time::Millis;
use boinky_core::timer::{Cadence, Deadline};

use crate::config::{PhysicsConfig, TimingConfig};
use crate::entities::{Platform, SpawnPoint, World};

/// Per-frame life lost by a boost particle.
const PARTICLE_DECAY: f32 = 0.016;
/// Per-frame downward acceleration of a boost particle.
const PARTICLE_GRAVITY: f32 = 0.3;
/// Per-frame life lost by a sparkle.
const SPARKLE_DECAY: f32 = 0.008;
/// Distance moved that forces a sparkle regardless of cadence.
const SPARKLE_DISTANCE: f32 = 10.0;

/// Decaying square emitted while boosted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub hue: f32,
    pub lightness: f32,
    pub life: f32,
    pub size: f32,
}

/// Trail flake left behind by the "it" holder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sparkle {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub drift: f32,
    pub life: f32,
    pub size: f32,
}

/// Presentation-only state advanced alongside the kinematics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cosmetics {
    pub boost_particles: Vec<Particle>,
    pub sparkle_trail: Vec<Sparkle>,
    pub animation_frame: usize,
    /// Frames in this player's sprite sheet. Zero means the colour-block
    /// fallback, which never animates.
    pub frame_count: usize,
    particle_cadence: Cadence,
    trail_cadence: Cadence,
    animation_cadence: Cadence,
    last_trail_position: (f32, f32),
}

impl Cosmetics {
    fn new(x: f32, y: f32, now: Millis) -> Self {
        Self {
            boost_particles: Vec::new(),
            sparkle_trail: Vec::new(),
            animation_frame: 0,
            frame_count: 0,
            particle_cadence: Cadence::new(now),
            trail_cadence: Cadence::new(now),
            animation_cadence: Cadence::new(now),
            last_trail_position: (x, y),
        }
    }
}

/// Kinematic and rule state of one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    /// Effective horizontal speed, recomputed from the boost each update.
    pub speed: f32,
    /// Effective jump impulse, recomputed from the boost each update.
    pub jump_power: f32,
    pub on_ground: bool,
    pub jumps_used: u8,
    pub is_moving: bool,
    pub boost: Deadline,
    pub tag_immunity: Deadline,
    pub lives: u8,
    pub invincible: Deadline,
    pub cosmetics: Cosmetics,
}

impl PlayerState {
    pub fn new(
        id: PlayerId,
        spawn: SpawnPoint,
        physics: &PhysicsConfig,
        lives: u8,
        now: Millis,
    ) -> Self {
        Self {
            id,
            x: spawn.x,
            y: spawn.y,
            vx: 0.0,
            vy: 0.0,
            width: physics.player_width,
            height: physics.player_height,
            speed: physics.base_speed,
            jump_power: physics.base_jump_power,
            on_ground: false,
            jumps_used: 0,
            is_moving: false,
            boost: Deadline::EXPIRED,
            tag_immunity: Deadline::EXPIRED,
            lives,
            invincible: Deadline::EXPIRED,
            cosmetics: Cosmetics::new(spawn.x, spawn.y, now),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center(&self) -> (f32, f32) {
        self.rect().center()
    }

    pub fn is_boosted(&self, now: Millis) -> bool {
        self.boost.is_active(now)
    }

    /// Apply one frame of held movement and an edge-triggered jump.
    pub fn apply_command(&mut self, command: &PlayerCommand, max_jumps: u8) {
        self.vx = command.move_dir() * self.speed;
        if command.jump_pressed {
            self.try_jump(max_jumps);
        }
    }

    /// Jump if a jump is left (ground jump plus air jumps). Returns whether
    /// the jump was granted.
    pub fn try_jump(&mut self, max_jumps: u8) -> bool {
        if self.jumps_used >= max_jumps {
            return false;
        }
        self.vy = -self.jump_power;
        self.jumps_used += 1;
        self.on_ground = false;
        true
    }

    /// Advance kinematics by one frame against `platforms` and the world
    /// bounds.
    pub fn update(
        &mut self,
        platforms: &[Platform],
        world: &World,
        now: Millis,
        physics: &PhysicsConfig,
    ) {
        let multiplier = if self.is_boosted(now) {
            physics.boost_multiplier
        } else {
            1.0
        };
        self.speed = physics.base_speed * multiplier;
        self.jump_power = physics.base_jump_power * multiplier;

        if !self.on_ground {
            self.vy += physics.gravity;
        }
        self.x += self.vx;
        self.y += self.vy;

        self.on_ground = false;
        for platform in platforms {
            self.resolve_platform(platform.rect(), physics.land_tolerance);
        }

        self.clamp_to_world(world);

        self.vx *= physics.friction;
        self.is_moving =
            self.vx.abs() > physics.moving_threshold || self.vy.abs() > physics.moving_threshold;
    }

    /// One-way platform collision: land from above, get stopped at the
    /// sides, pass through from below.
    fn resolve_platform(&mut self, platform: &Rect, tolerance: f32) {
        if !self.rect().overlaps(platform) {
            return;
        }

        // Landing: bottom edge was at or just below the top before this move.
        if self.vy > 0.0 && self.y + self.height - self.vy <= platform.y + tolerance {
            self.y = platform.y - self.height;
            self.vy = 0.0;
            self.on_ground = true;
            self.jumps_used = 0;
        }

        if !self.rect().overlaps_vertically(platform) {
            return;
        }
        if self.vx > 0.0 && self.x + self.width - self.vx <= platform.x + tolerance {
            self.x = platform.x - self.width;
            self.vx = 0.0;
        } else if self.vx < 0.0 && self.x - self.vx >= platform.right() - tolerance {
            self.x = platform.right();
            self.vx = 0.0;
        }
    }

    fn clamp_to_world(&mut self, world: &World) {
        if self.x < 0.0 {
            self.x = 0.0;
        }
        if self.x + self.width > world.width {
            self.x = world.width - self.width;
        }
        if self.y < 0.0 {
            self.y = 0.0;
            self.vy = 0.0;
        }
        // The world floor always holds.
        if self.y + self.height > world.height {
            self.y = world.height - self.height;
            self.vy = 0.0;
            self.on_ground = true;
            self.jumps_used = 0;
        }
    }

    /// Advance boost particles, the sparkle trail (only for the "it"
    /// holder) and the sprite animation frame.
    pub fn update_cosmetics<R: Rng>(
        &mut self,
        is_it: bool,
        now: Millis,
        timing: &TimingConfig,
        rng: &mut R,
    ) {
        let (cx, cy) = self.center();
        let (w, h) = (self.width, self.height);
        let boosted = self.is_boosted(now);
        let moving = self.is_moving;
        let (px, py) = (self.x, self.y);
        let fx = &mut self.cosmetics;

        if boosted && fx.particle_cadence.ready(now, timing.particle_cadence_ms) {
            let count = rng.random_range(2..=4);
            for _ in 0..count {
                fx.boost_particles.push(Particle {
                    x: cx + (rng.random::<f32>() - 0.5) * w,
                    y: cy + (rng.random::<f32>() - 0.5) * h,
                    vx: (rng.random::<f32>() - 0.5) * 2.0,
                    vy: -rng.random::<f32>() - 0.5,
                    hue: rng.random::<f32>() * 360.0,
                    lightness: 50.0 + rng.random::<f32>() * 50.0,
                    life: 1.0,
                    size: 3.0 + rng.random::<f32>() * 3.0,
                });
            }
        }
        fx.boost_particles.retain_mut(|p| {
            p.life -= PARTICLE_DECAY;
            p.vy += PARTICLE_GRAVITY;
            p.x += p.vx;
            p.y += p.vy;
            p.life > 0.0
        });

        if is_it && moving {
            let (lx, ly) = fx.last_trail_position;
            let moved = ((px - lx).powi(2) + (py - ly).powi(2)).sqrt();
            if fx.trail_cadence.ready(now, timing.particle_cadence_ms) || moved > SPARKLE_DISTANCE
            {
                fx.sparkle_trail.push(Sparkle {
                    x: cx,
                    y: cy,
                    angle: rng.random::<f32>() * std::f32::consts::TAU,
                    drift: 0.3 + rng.random::<f32>() * 0.4,
                    life: 1.0,
                    size: 4.0 + rng.random::<f32>() * 3.0,
                });
                fx.last_trail_position = (px, py);
                fx.trail_cadence.reset(now);
            }
        }
        fx.sparkle_trail.retain_mut(|s| {
            s.life -= SPARKLE_DECAY;
            s.y += s.drift;
            s.x += s.angle.sin() * 0.5;
            s.life > 0.0
        });

        if fx.frame_count == 0 {
            return;
        }
        if moving {
            if fx.animation_cadence.ready(now, timing.animation_cadence_ms) {
                fx.animation_frame = (fx.animation_frame + 1) % fx.frame_count;
            }
        } else {
            fx.animation_frame = 0;
            fx.animation_cadence.reset(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const NOW: Millis = 1_700_000_000_000;

    fn world() -> World {
        World::new(8000.0, 4800.0)
    }

    fn player_at(x: f32, y: f32) -> PlayerState {
        PlayerState::new(0, SpawnPoint { x, y }, &PhysicsConfig::default(), 3, NOW)
    }

    fn ground() -> Vec<Platform> {
        vec![Platform::new(0.0, 4750.0, 8000.0, 50.0, 0)]
    }

    #[test]
    fn first_update_applies_gravity_once() {
        let platforms = ground();
        let mut p = player_at(4000.0, 4700.0);
        p.update(&platforms, &world(), NOW, &PhysicsConfig::default());
        assert!((p.vy - 0.6).abs() < 1e-5);
        assert!((p.y - 4700.6).abs() < 1e-3);
        assert!(!p.on_ground);
    }

    #[test]
    fn falls_and_lands_exactly_on_ground() {
        let platforms = ground();
        let cfg = PhysicsConfig::default();
        let mut p = player_at(4000.0, 4700.0);
        let mut landed = false;
        for _ in 0..200 {
            p.update(&platforms, &world(), NOW, &cfg);
            if p.on_ground {
                landed = true;
                break;
            }
        }
        assert!(landed, "player should land on the ground platform");
        assert_eq!(p.y, 4710.0);
        assert_eq!(p.vy, 0.0);
        assert_eq!(p.jumps_used, 0);
    }

    #[test]
    fn rising_player_passes_through_platform() {
        let platforms = vec![Platform::new(3900.0, 1000.0, 256.0, 20.0, 0)];
        let cfg = PhysicsConfig::default();
        let mut p = player_at(4000.0, 1030.0);
        p.vy = -12.0;
        let y0 = p.y;
        p.update(&platforms, &world(), NOW, &cfg);
        assert!(p.vy < 0.0, "upward velocity must survive the overlap");
        assert!(p.y < y0);
        assert!(!p.on_ground);
        // Keeps rising past the top.
        for _ in 0..5 {
            p.update(&platforms, &world(), NOW, &cfg);
        }
        assert!(p.y + p.height < 1000.0 || p.vy < 0.0);
    }

    #[test]
    fn wall_stops_horizontal_motion() {
        // Tall block to the right, player walking into it at mid height.
        let platforms = vec![Platform::new(1000.0, 900.0, 64.0, 200.0, 0)];
        let cfg = PhysicsConfig::default();
        let mut p = player_at(956.0, 1000.0);
        p.on_ground = true;
        p.vx = 5.0;
        p.update(&platforms, &world(), NOW, &cfg);
        assert_eq!(p.x, 960.0);
        assert_eq!(p.vx, 0.0);
    }

    #[test]
    fn wall_stops_leftward_motion() {
        let platforms = vec![Platform::new(1000.0, 900.0, 64.0, 200.0, 0)];
        let cfg = PhysicsConfig::default();
        let mut p = player_at(1066.0, 1000.0);
        p.on_ground = true;
        p.vx = -5.0;
        p.update(&platforms, &world(), NOW, &cfg);
        assert_eq!(p.x, 1064.0);
        assert_eq!(p.vx, 0.0);
    }

    #[test]
    fn double_jump_then_exhausted() {
        let platforms = ground();
        let cfg = PhysicsConfig::default();
        let mut p = player_at(4000.0, 4710.0);
        p.on_ground = true;

        assert!(p.try_jump(cfg.max_jumps));
        assert_eq!(p.jumps_used, 1);
        p.update(&platforms, &world(), NOW, &cfg);
        assert!(p.try_jump(cfg.max_jumps));
        assert_eq!(p.jumps_used, 2);
        p.update(&platforms, &world(), NOW, &cfg);

        let vy = p.vy;
        assert!(!p.try_jump(cfg.max_jumps));
        assert_eq!(p.vy, vy);
        assert_eq!(p.jumps_used, 2);

        // Land again and the jumps come back.
        for _ in 0..400 {
            p.update(&platforms, &world(), NOW, &cfg);
            if p.on_ground {
                break;
            }
        }
        assert!(p.on_ground);
        assert_eq!(p.jumps_used, 0);
        assert!(p.try_jump(cfg.max_jumps));
    }

    #[test]
    fn boost_scales_speed_and_jump() {
        let cfg = PhysicsConfig::default();
        let mut p = player_at(100.0, 100.0);
        p.boost.start(NOW, 8000);
        p.update(&[], &world(), NOW, &cfg);
        assert_eq!(p.speed, 7.5);
        assert_eq!(p.jump_power, 18.0);
        p.update(&[], &world(), NOW + 8000, &cfg);
        assert_eq!(p.speed, 5.0);
        assert_eq!(p.jump_power, 12.0);
    }

    #[test]
    fn command_moves_and_jumps() {
        let cfg = PhysicsConfig::default();
        let mut p = player_at(100.0, 100.0);
        let cmd = PlayerCommand {
            left: true,
            right: true,
            jump_pressed: true,
        };
        p.apply_command(&cmd, cfg.max_jumps);
        assert_eq!(p.vx, 5.0, "right wins when both are held");
        assert_eq!(p.vy, -12.0);
        assert_eq!(p.jumps_used, 1);
    }

    #[test]
    fn world_floor_grounds_player() {
        let cfg = PhysicsConfig::default();
        let mut p = player_at(100.0, 4759.0);
        p.vy = 5.0;
        p.jumps_used = 2;
        p.update(&[], &world(), NOW, &cfg);
        assert_eq!(p.y, 4760.0);
        assert!(p.on_ground);
        assert_eq!(p.jumps_used, 0);
    }

    #[test]
    fn friction_decays_horizontal_velocity() {
        let cfg = PhysicsConfig::default();
        let mut p = player_at(100.0, 4760.0);
        p.vx = 10.0;
        p.update(&[], &world(), NOW, &cfg);
        assert!((p.vx - 8.5).abs() < 1e-5);
        assert!(p.is_moving);
    }

    #[test]
    fn boost_emits_particles_on_cadence() {
        let timing = TimingConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut p = player_at(100.0, 100.0);
        p.boost.start(NOW, 8000);

        p.update_cosmetics(false, NOW + 10, &timing, &mut rng);
        assert!(p.cosmetics.boost_particles.is_empty());

        p.update_cosmetics(false, NOW + 50, &timing, &mut rng);
        let n = p.cosmetics.boost_particles.len();
        assert!((2..=4).contains(&n), "got {n} particles");
        assert!(p.cosmetics.boost_particles.iter().all(|q| q.life < 1.0));
    }

    #[test]
    fn particles_expire() {
        let timing = TimingConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut p = player_at(100.0, 100.0);
        p.boost.start(NOW, 100);
        p.update_cosmetics(false, NOW + 50, &timing, &mut rng);
        assert!(!p.cosmetics.boost_particles.is_empty());
        for i in 0..100 {
            p.update_cosmetics(false, NOW + 200 + i, &timing, &mut rng);
        }
        assert!(p.cosmetics.boost_particles.is_empty());
    }

    #[test]
    fn sparkles_only_for_moving_it_holder() {
        let timing = TimingConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = player_at(100.0, 100.0);
        p.is_moving = true;
        p.x = 150.0;
        p.update_cosmetics(false, NOW + 60, &timing, &mut rng);
        assert!(p.cosmetics.sparkle_trail.is_empty());
        p.update_cosmetics(true, NOW + 60, &timing, &mut rng);
        assert_eq!(p.cosmetics.sparkle_trail.len(), 1);
    }

    #[test]
    fn animation_advances_while_moving_and_resets_idle() {
        let timing = TimingConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = player_at(100.0, 100.0);
        p.cosmetics.frame_count = 3;
        p.is_moving = true;
        p.update_cosmetics(false, NOW + 150, &timing, &mut rng);
        assert_eq!(p.cosmetics.animation_frame, 1);
        p.update_cosmetics(false, NOW + 200, &timing, &mut rng);
        assert_eq!(p.cosmetics.animation_frame, 1);
        p.update_cosmetics(false, NOW + 300, &timing, &mut rng);
        p.update_cosmetics(false, NOW + 450, &timing, &mut rng);
        assert_eq!(p.cosmetics.animation_frame, 0, "wraps at frame_count");
        p.update_cosmetics(false, NOW + 600, &timing, &mut rng);
        p.is_moving = false;
        p.update_cosmetics(false, NOW + 610, &timing, &mut rng);
        assert_eq!(p.cosmetics.animation_frame, 0);
    }

    #[test]
    fn block_skin_never_animates() {
        let timing = TimingConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = player_at(100.0, 100.0);
        p.is_moving = true;
        p.update_cosmetics(false, NOW + 1000, &timing, &mut rng);
        assert_eq!(p.cosmetics.animation_frame, 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn update_keeps_player_in_world(
                x in -2000.0f32..10000.0,
                y in -2000.0f32..7000.0,
                vx in -100.0f32..100.0,
                vy in -100.0f32..100.0,
            ) {
                let cfg = PhysicsConfig::default();
                let w = world();
                let mut p = player_at(x, y);
                p.vx = vx;
                p.vy = vy;
                p.update(&ground(), &w, NOW, &cfg);
                prop_assert!(p.x >= 0.0 && p.x <= w.width - p.width);
                prop_assert!(p.y >= 0.0 && p.y <= w.height - p.height);
            }

            #[test]
            fn upward_motion_never_snaps_to_platform(
                start_y in 1001.0f32..1040.0,
                vy in -20.0f32..-1.0,
            ) {
                let cfg = PhysicsConfig::default();
                let platforms = vec![Platform::new(3900.0, 1000.0, 256.0, 20.0, 0)];
                let mut p = player_at(4000.0, start_y);
                p.vy = vy;
                p.update(&platforms, &world(), NOW, &cfg);
                prop_assert!(!p.on_ground);
                prop_assert!((p.y - (start_y + vy + cfg.gravity)).abs() < 1e-3);
            }
        }
    }
}
