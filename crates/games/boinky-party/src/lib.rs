//! Tag and co-op platformer simulation: player kinematics, level assembly,
//! the per-frame interaction pass, cameras with split-screen, and the
//! session that steps it all in a fixed order.

pub mod camera;
pub mod config;
pub mod entities;
pub mod hud;
pub mod interactions;
pub mod level;
pub mod physics;
pub mod rules;
pub mod scoring;
pub mod session;

pub use camera::{Camera, CameraRig, RenderPlan, Viewport};
pub use config::GameConfig;
pub use hud::Hud;
pub use level::{Level, LevelDescription, LevelError, LevelSource};
pub use physics::PlayerState;
pub use session::{FrameReport, GameSession, SessionState};
