use std::path::Path;

use tracing_subscriber::EnvFilter;

use boinky_core::FRAME_MS;
use boinky_core::game::GameMode;
use boinky_core::input::{ControlScheme, InputState};
use boinky_core::time::{Clock, ManualClock, timestamp_now};

use boinky_party::{GameConfig, GameSession, LevelDescription, LevelSource};

/// Frames between HUD log lines.
const HUD_LOG_INTERVAL: u64 = 60;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mode = arg_value("--mode=")
        .and_then(|m| {
            m.parse::<GameMode>()
                .map_err(|e| tracing::warn!("{e}, using tag"))
                .ok()
        })
        .unwrap_or_default();
    let players = arg_value("--players=")
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(2);
    let frames = arg_value("--frames=")
        .and_then(|f| f.parse::<u64>().ok())
        .unwrap_or(600);
    let seed = arg_value("--seed=")
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);

    let source = match arg_value("--level=") {
        Some(path) => load_level(Path::new(&path)),
        None => LevelSource::BuiltIn(
            arg_value("--builtin=")
                .and_then(|i| i.parse::<usize>().ok())
                .unwrap_or(0),
        ),
    };

    let config = GameConfig::load();
    let mut session = GameSession::new(config, seed);
    let clock = ManualClock::new(timestamp_now());
    session.start(mode, players, source, clock.now_ms());

    tracing::info!(mode = mode.as_str(), players, frames, seed, "Boinky headless run");
    for slot in session.slots() {
        tracing::info!(
            player = %slot.display_name,
            color = %slot.skin.color().to_hex(),
            sprite = ?slot.skin.sprite_sheet(),
            "Seat"
        );
    }

    let mut input = InputState::new();
    for frame in 0..frames {
        script_input(&mut input, frame, players);
        clock.advance(FRAME_MS);
        let Some(report) = session.frame(&mut input, clock.now_ms()) else {
            break;
        };
        for event in &report.events {
            tracing::debug!(frame, ?event, "Game event");
        }
        if frame % HUD_LOG_INTERVAL == 0 || report.state.is_terminal() {
            match serde_json::to_string(&report.hud) {
                Ok(hud) => tracing::info!(frame, state = ?report.state, %hud, "HUD"),
                Err(e) => tracing::warn!("Failed to encode HUD: {e}"),
            }
        }
        if report.state.is_terminal() {
            break;
        }
    }

    for score in session.scores() {
        tracing::info!(player = score.player_id + 1, score = score.score, "Final score");
    }
    session.stop();
}

/// Value of the first `--name=value` argument with the given prefix.
fn arg_value(prefix: &str) -> Option<String> {
    std::env::args()
        .skip(1)
        .find_map(|a| a.strip_prefix(prefix).map(String::from))
}

/// Load a level file, falling back to the first built-in level on failure.
fn load_level(path: &Path) -> LevelSource {
    match LevelDescription::load_file(path) {
        Ok(desc) => {
            tracing::info!(path = %path.display(), "Loaded level");
            LevelSource::Custom(desc)
        },
        Err(e) => {
            tracing::error!("Failed to load level {}: {e}, using built-in level", path.display());
            LevelSource::BuiltIn(0)
        },
    }
}

/// Deterministic stand-in for human players: each slot runs in one
/// direction for a while, turns around, and hops periodically.
fn script_input(input: &mut InputState, frame: u64, players: usize) {
    for (slot, scheme) in ControlScheme::BINDINGS.iter().enumerate().take(players) {
        let phase = frame + slot as u64 * 37;
        let rightward = (phase / 180) % 2 == 0;
        let (held, released) = if rightward {
            (scheme.right, scheme.left)
        } else {
            (scheme.left, scheme.right)
        };
        input.on_key_up(released);
        input.on_key_down(held);

        if phase % 45 == 0 {
            input.on_key_up(scheme.jump);
            input.on_key_down(scheme.jump);
        } else if phase % 45 == 5 {
            input.on_key_up(scheme.jump);
        }
    }
}
