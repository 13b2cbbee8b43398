use serde::Serialize;

use boinky_core::geometry::{Rect, center_distance, clamp_low_biased};

use crate::config::CameraConfig;
use crate::entities::World;

/// Zoom used at level load when all players start on the same spot.
const STACKED_START_ZOOM: f32 = 0.5;
/// Player spread below which the initial framing treats players as stacked.
const STACKED_SPREAD: f32 = 10.0;

/// Host drawing surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// One side of a vertical split.
    pub fn half_width(&self) -> Self {
        Self::new(self.width / 2.0, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// A view into the world: centre point and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Camera {
    pub fn new(cfg: &CameraConfig) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: clamp_low_biased(1.0, cfg.min_zoom, cfg.max_zoom),
            min_zoom: cfg.min_zoom,
            max_zoom: cfg.max_zoom,
        }
    }

    /// World-space rectangle this camera shows through `viewport`.
    pub fn visible_rect(&self, viewport: Viewport) -> Rect {
        let w = viewport.width / self.zoom;
        let h = viewport.height / self.zoom;
        Rect::new(self.x - w / 2.0, self.y - h / 2.0, w, h)
    }

    /// Zoom that fits a `spread_x`×`spread_y` box plus `padding` into the
    /// viewport, within the zoom limits.
    fn fit_zoom(&self, spread_x: f32, spread_y: f32, padding: f32, viewport: Viewport) -> f32 {
        let zoom_x = (viewport.width - padding) / (spread_x + padding);
        let zoom_y = (viewport.height - padding) / (spread_y + padding);
        clamp_low_biased(zoom_x.min(zoom_y), self.min_zoom, self.max_zoom)
    }

    /// Snap onto the players at level load, fitting their spread with double
    /// padding.
    pub fn frame_initial(&mut self, targets: &[Rect], viewport: Viewport, cfg: &CameraConfig) {
        let Some(bounds) = CenterBounds::of(targets) else {
            return;
        };
        (self.x, self.y) = bounds.midpoint();
        let (dx, dy) = bounds.spread();
        self.zoom = if dx > STACKED_SPREAD || dy > STACKED_SPREAD {
            self.fit_zoom(dx, dy, cfg.padding * 2.0, viewport)
        } else {
            clamp_low_biased(STACKED_START_ZOOM, self.min_zoom, self.max_zoom)
        };
    }

    /// Shared-camera step: ease zoom and centre toward a framing of every
    /// target, then keep the view inside the world.
    pub fn track(&mut self, targets: &[Rect], viewport: Viewport, world: &World, cfg: &CameraConfig) {
        let Some(bounds) = CenterBounds::of(targets) else {
            return;
        };
        let (dx, dy) = bounds.spread();
        let desired = self.fit_zoom(
            dx.max(cfg.min_spread),
            dy.max(cfg.min_spread),
            cfg.padding,
            viewport,
        );
        self.zoom += (desired - self.zoom) * cfg.smoothing;
        let (cx, cy) = bounds.midpoint();
        self.x += (cx - self.x) * cfg.smoothing;
        self.y += (cy - self.y) * cfg.smoothing;
        self.clamp_to_world(viewport, world);
    }

    /// Split-screen step: centred on one player, zoom eased toward the same
    /// fit a lone player gets from the shared camera.
    pub fn follow(&mut self, target: &Rect, viewport: Viewport, world: &World, cfg: &CameraConfig) {
        let desired = self.fit_zoom(cfg.min_spread, cfg.min_spread, cfg.padding, viewport);
        self.zoom += (desired - self.zoom) * cfg.smoothing;
        (self.x, self.y) = target.center();
        self.clamp_to_world(viewport, world);
    }

    /// Keep the visible area inside the world. A world smaller than the view
    /// pins the camera to the top-left half-view.
    pub fn clamp_to_world(&mut self, viewport: Viewport, world: &World) {
        let half_w = viewport.width / self.zoom / 2.0;
        let half_h = viewport.height / self.zoom / 2.0;
        self.x = clamp_low_biased(self.x, half_w, world.width - half_w);
        self.y = clamp_low_biased(self.y, half_h, world.height - half_h);
    }
}

/// Bounding box of target centres.
struct CenterBounds {
    min_x: f32,
    max_x: f32,
    min_y: f32,
    max_y: f32,
}

impl CenterBounds {
    fn of(targets: &[Rect]) -> Option<Self> {
        let mut centers = targets.iter().map(Rect::center);
        let (x, y) = centers.next()?;
        let init = Self {
            min_x: x,
            max_x: x,
            min_y: y,
            max_y: y,
        };
        Some(centers.fold(init, |b, (x, y)| Self {
            min_x: b.min_x.min(x),
            max_x: b.max_x.max(x),
            min_y: b.min_y.min(y),
            max_y: b.max_y.max(y),
        }))
    }

    fn spread(&self) -> (f32, f32) {
        (self.max_x - self.min_x, self.max_y - self.min_y)
    }

    fn midpoint(&self) -> (f32, f32) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Split-screen on/off decision with a dead zone: turns on at
/// `split_enter_distance`, back off below `split_exit_distance`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SplitScreen {
    active: bool,
}

impl SplitScreen {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Feed this frame's player distance. Returns the new state when it
    /// changed.
    pub fn update(&mut self, distance: f32, cfg: &CameraConfig) -> Option<bool> {
        let next = if self.active {
            distance >= cfg.split_exit_distance
        } else {
            distance >= cfg.split_enter_distance
        };
        self.set(next)
    }

    pub fn set(&mut self, active: bool) -> Option<bool> {
        if self.active == active {
            return None;
        }
        self.active = active;
        Some(active)
    }
}

/// One on-screen view: where it is drawn and what it shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct View {
    /// Screen-space rectangle in pixels.
    pub screen: Rect,
    pub camera: Camera,
}

/// What the host draws this frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderPlan {
    pub views: Vec<View>,
    /// Screen x of the split divider, if split.
    pub divider_x: Option<f32>,
}

/// Shared camera plus the two split-screen cameras.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraRig {
    pub shared: Camera,
    pub split_views: [Camera; 2],
    split: SplitScreen,
}

impl CameraRig {
    pub fn new(cfg: &CameraConfig) -> Self {
        Self {
            shared: Camera::new(cfg),
            split_views: [Camera::new(cfg); 2],
            split: SplitScreen::default(),
        }
    }

    pub fn is_split(&self) -> bool {
        self.split.is_active()
    }

    /// Decide single or split view, then update the camera(s) in use.
    /// `split_allowed` is true only for two-player co-op. Returns the new
    /// split state when it changed.
    pub fn update(
        &mut self,
        targets: &[Rect],
        split_allowed: bool,
        viewport: Viewport,
        world: &World,
        cfg: &CameraConfig,
    ) -> Option<bool> {
        let changed = match targets {
            [a, b] if split_allowed => self.split.update(center_distance(a, b), cfg),
            _ => self.split.set(false),
        };
        if changed == Some(true) {
            self.split_views = [self.shared; 2];
        }

        if self.split.is_active() {
            let half = viewport.half_width();
            for (camera, target) in self.split_views.iter_mut().zip(targets) {
                camera.follow(target, half, world, cfg);
            }
        } else {
            self.shared.track(targets, viewport, world, cfg);
        }
        changed
    }

    pub fn render_plan(&self, viewport: Viewport) -> RenderPlan {
        if !self.split.is_active() {
            return RenderPlan {
                views: vec![View {
                    screen: Rect::new(0.0, 0.0, viewport.width, viewport.height),
                    camera: self.shared,
                }],
                divider_x: None,
            };
        }
        let half = viewport.width / 2.0;
        RenderPlan {
            views: vec![
                View {
                    screen: Rect::new(0.0, 0.0, half, viewport.height),
                    camera: self.split_views[0],
                },
                View {
                    screen: Rect::new(half, 0.0, half, viewport.height),
                    camera: self.split_views[1],
                },
            ],
            divider_x: Some(half),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> CameraConfig {
        CameraConfig::default()
    }

    fn player_at(x: f32, y: f32) -> Rect {
        Rect::new(x, y, 40.0, 40.0)
    }

    fn converge(cam: &mut Camera, targets: &[Rect], viewport: Viewport) {
        let world = World::default();
        for _ in 0..300 {
            cam.track(targets, viewport, &world, &cfg());
        }
    }

    #[test]
    fn close_players_zoom_to_max() {
        let mut cam = Camera::new(&cfg());
        let targets = [player_at(4000.0, 2000.0), player_at(4010.0, 2000.0)];
        converge(&mut cam, &targets, Viewport::new(1920.0, 1080.0));
        assert!((cam.zoom - 1.5).abs() < 1e-3);
        assert!((cam.x - 4025.0).abs() < 0.1);
    }

    #[test]
    fn distant_players_zoom_out() {
        let mut cam = Camera::new(&cfg());
        let targets = [player_at(100.0, 2000.0), player_at(7800.0, 2000.0)];
        let viewport = Viewport::new(1920.0, 1080.0);
        converge(&mut cam, &targets, viewport);
        let expected = (1920.0 - 200.0) / (7700.0 + 200.0);
        assert!((cam.zoom - expected).abs() < 1e-3, "zoom {}", cam.zoom);
    }

    #[test]
    fn smoothing_moves_ten_percent() {
        let mut cam = Camera::new(&cfg());
        cam.x = 4000.0;
        cam.y = 2400.0;
        let targets = [player_at(4180.0, 2380.0)];
        cam.track(&targets, Viewport::new(1280.0, 720.0), &World::default(), &cfg());
        assert!((cam.x - 4020.0).abs() < 1e-3);
        assert!((cam.y - 2400.0).abs() < 1e-3);
    }

    #[test]
    fn camera_stays_inside_world() {
        let mut cam = Camera::new(&cfg());
        let viewport = Viewport::new(1280.0, 720.0);
        converge(&mut cam, &[player_at(0.0, 0.0)], viewport);
        let view = cam.visible_rect(viewport);
        assert!(view.x >= -1e-3 && view.y >= -1e-3);
        converge(&mut cam, &[player_at(7960.0, 4760.0)], viewport);
        let view = cam.visible_rect(viewport);
        assert!(view.right() <= 8000.0 + 1e-2);
        assert!(view.bottom() <= 4800.0 + 1e-2);
    }

    #[test]
    fn world_smaller_than_view_pins_low() {
        let mut cam = Camera::new(&cfg());
        cam.zoom = 1.0;
        cam.x = 300.0;
        cam.clamp_to_world(Viewport::new(1280.0, 720.0), &World::new(400.0, 300.0));
        assert_eq!(cam.x, 640.0);
        assert_eq!(cam.y, 360.0);
    }

    #[test]
    fn initial_framing_for_stacked_players() {
        let mut cam = Camera::new(&cfg());
        let targets = [player_at(1000.0, 1000.0), player_at(1005.0, 1000.0)];
        cam.frame_initial(&targets, Viewport::new(1280.0, 720.0), &cfg());
        assert_eq!(cam.zoom, 0.5);
        assert_eq!((cam.x, cam.y), (1022.5, 1020.0));
    }

    #[test]
    fn initial_framing_fits_spread_with_double_padding() {
        let mut cam = Camera::new(&cfg());
        let targets = [player_at(1000.0, 1000.0), player_at(1200.0, 1000.0)];
        cam.frame_initial(&targets, Viewport::new(1280.0, 720.0), &cfg());
        let expected = ((1280.0f32 - 400.0) / (200.0 + 400.0)).min((720.0 - 400.0) / (0.0 + 400.0));
        assert!((cam.zoom - expected).abs() < 1e-5);
        assert_eq!(cam.x, 1120.0);
    }

    #[test]
    fn split_uses_dead_zone() {
        let cfg = cfg();
        let mut split = SplitScreen::default();
        assert_eq!(split.update(499.0, &cfg), None);
        assert_eq!(split.update(500.0, &cfg), Some(true));
        assert_eq!(split.update(450.0, &cfg), None);
        assert!(split.is_active());
        assert_eq!(split.update(399.0, &cfg), Some(false));
        assert_eq!(split.update(450.0, &cfg), None);
    }

    #[test]
    fn equal_thresholds_toggle_at_the_line() {
        let cfg = CameraConfig {
            split_exit_distance: 500.0,
            ..CameraConfig::default()
        };
        let mut split = SplitScreen::default();
        assert_eq!(split.update(500.0, &cfg), Some(true));
        assert_eq!(split.update(499.9, &cfg), Some(false));
    }

    #[test]
    fn rig_splits_only_when_allowed() {
        let cfg = cfg();
        let world = World::default();
        let viewport = Viewport::new(1280.0, 720.0);
        let far = [player_at(1000.0, 4000.0), player_at(2000.0, 4000.0)];

        let mut rig = CameraRig::new(&cfg);
        assert_eq!(rig.update(&far, false, viewport, &world, &cfg), None);
        assert!(!rig.is_split());
        assert_eq!(rig.render_plan(viewport).views.len(), 1);

        assert_eq!(rig.update(&far, true, viewport, &world, &cfg), Some(true));
        let plan = rig.render_plan(viewport);
        assert_eq!(plan.views.len(), 2);
        assert_eq!(plan.divider_x, Some(640.0));
        assert_eq!(plan.views[1].screen, Rect::new(640.0, 0.0, 640.0, 720.0));
        assert_eq!(plan.views[0].camera.x, 1020.0);
        assert_eq!(plan.views[1].camera.x, 2020.0);

        // A third player joining disables the split.
        let three = [far[0], far[1], player_at(1500.0, 4000.0)];
        assert_eq!(
            rig.update(&three, true, viewport, &world, &cfg),
            Some(false)
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn zoom_stays_within_limits(
                spread in 0.0f32..8000.0,
                vw in 320.0f32..3840.0,
                vh in 240.0f32..2160.0,
            ) {
                let mut cam = Camera::new(&cfg());
                let targets = [player_at(0.0, 2000.0), player_at(spread.min(7960.0), 2000.0)];
                let viewport = Viewport::new(vw, vh);
                let world = World::default();
                for _ in 0..200 {
                    cam.track(&targets, viewport, &world, &cfg());
                    prop_assert!(cam.zoom >= 0.1 - 1e-6 && cam.zoom <= 1.5 + 1e-6);
                }
            }
        }
    }
}
