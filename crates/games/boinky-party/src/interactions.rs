use rand::Rng;

use boinky_core::game::GameEvent;
use boinky_core::time::Millis;

use crate::config::GameConfig;
use crate::entities::{BoostTile, BouncePad, Teleport, World};
use crate::level::{Level, pick_boost_anchor};
use crate::physics::PlayerState;
use crate::rules::Rules;

/// Run the per-frame interaction pass in its fixed order: bounce pads,
/// teleports, boost tiles, then the mode rules. Each stage sees positions
/// already changed by the previous one.
pub fn resolve_interactions<R: Rng>(
    players: &mut [PlayerState],
    level: &mut Level,
    rules: &mut Rules,
    now: Millis,
    config: &GameConfig,
    rng: &mut R,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    apply_bounce_pads(players, &level.entities.bounce_pads, &mut events);
    apply_teleports(
        players,
        &mut level.entities.teleports,
        &level.world,
        &mut events,
    );
    collect_boost_tiles(players, level, now, config.timing.boost_ms, rng, &mut events);
    rules.resolve(players, level, now, config, &mut events);
    events
}

/// Overlapping a pad sets the vertical velocity, it does not add to it.
fn apply_bounce_pads(
    players: &mut [PlayerState],
    pads: &[BouncePad],
    events: &mut Vec<GameEvent>,
) {
    for player in players.iter_mut() {
        let mut bounced = false;
        for pad in pads {
            if player.rect().overlaps(pad.rect()) {
                player.vy = -pad.bounce_power;
                player.on_ground = false;
                bounced = true;
            }
        }
        if bounced {
            events.push(GameEvent::Bounced {
                player_id: player.id,
            });
        }
    }
}

/// At most one teleport per player per frame. Arrival points are clamped
/// into the world.
fn apply_teleports(
    players: &mut [PlayerState],
    teleports: &mut [Teleport],
    world: &World,
    events: &mut Vec<GameEvent>,
) {
    for player in players.iter_mut() {
        for (index, teleport) in teleports.iter_mut().enumerate() {
            if teleport.is_used() || !player.rect().overlaps(teleport.rect()) {
                continue;
            }
            let Some((tx, ty)) = teleport.trigger() else {
                continue;
            };
            let (x, y) = world.clamp_position(tx, ty, player.width, player.height);
            player.x = x;
            player.y = y;
            tracing::debug!(player_id = player.id, teleport = index, x, y, "Teleported");
            events.push(GameEvent::Teleported {
                player_id: player.id,
                teleport: index,
            });
            break;
        }
    }
}

/// Each player claims at most one tile per frame. Claimed tiles are removed
/// and replaced after the scan, so the tile count never changes.
fn collect_boost_tiles<R: Rng>(
    players: &mut [PlayerState],
    level: &mut Level,
    now: Millis,
    boost_ms: Millis,
    rng: &mut R,
    events: &mut Vec<GameEvent>,
) {
    let tiles = &level.entities.boost_tiles;
    let mut claimed: Vec<usize> = Vec::new();
    for player in players.iter_mut() {
        let hit = tiles
            .iter()
            .enumerate()
            .find(|(i, tile)| !claimed.contains(i) && player.rect().overlaps(tile.rect()))
            .map(|(i, _)| i);
        if let Some(index) = hit {
            player.boost.start(now, boost_ms);
            claimed.push(index);
            tracing::debug!(player_id = player.id, tile = index, "Boost collected");
            events.push(GameEvent::BoostCollected {
                player_id: player.id,
            });
        }
    }
    if claimed.is_empty() {
        return;
    }

    claimed.sort_unstable_by(|a, b| b.cmp(a));
    let mut replacements = Vec::with_capacity(claimed.len());
    for index in claimed {
        let taken = level.entities.boost_tiles.remove(index);
        let replacement = match pick_boost_anchor(&level.platforms, &level.world, rng) {
            Some(platform) => BoostTile::above(platform),
            None => BoostTile::new(taken.rect().x, taken.rect().y),
        };
        replacements.push(replacement);
    }
    level.entities.boost_tiles.extend(replacements);
}

#[cfg(test)]
mod tests {
    use super::*;
    use boinky_core::geometry::Rect;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::entities::{Platform, SpawnPoint};
    use crate::level::RunEntities;
    use crate::rules::{CoopRules, TagRules};

    const NOW: Millis = 1_700_000_000_000;

    fn player(id: usize, x: f32, y: f32) -> PlayerState {
        let cfg = GameConfig::default();
        PlayerState::new(id, SpawnPoint { x, y }, &cfg.physics, 3, NOW)
    }

    fn level() -> Level {
        Level {
            world: World::default(),
            platforms: vec![
                Platform::new(0.0, 4750.0, 8000.0, 50.0, 0),
                Platform::new(2000.0, 3000.0, 160.0, 20.0, 2),
                Platform::new(5000.0, 2000.0, 160.0, 20.0, 4),
            ],
            spawn_points: Vec::new(),
            finish: Rect::new(7880.0, 100.0, 80.0, 80.0),
            entities: RunEntities::default(),
        }
    }

    fn resolve(players: &mut [PlayerState], level: &mut Level, now: Millis) -> Vec<GameEvent> {
        let mut rules = Rules::Coop(CoopRules::new());
        let mut rng = StdRng::seed_from_u64(11);
        resolve_interactions(
            players,
            level,
            &mut rules,
            now,
            &GameConfig::default(),
            &mut rng,
        )
    }

    #[test]
    fn bounce_overrides_velocity() {
        let mut lvl = level();
        lvl.entities
            .bounce_pads
            .push(BouncePad::new(1000.0, 1000.0, 48.0, 20.0, 33.0));
        lvl.entities
            .bounce_pads
            .push(BouncePad::new(1010.0, 1000.0, 48.0, 20.0, 33.0));
        let mut players = vec![player(0, 1000.0, 975.0)];
        players[0].vy = 4.0;
        players[0].on_ground = true;
        let events = resolve(&mut players, &mut lvl, NOW);
        assert_eq!(players[0].vy, -33.0);
        assert!(!players[0].on_ground);
        assert_eq!(events, vec![GameEvent::Bounced { player_id: 0 }]);
    }

    #[test]
    fn teleport_relocates_once() {
        let mut lvl = level();
        lvl.entities
            .teleports
            .push(Teleport::new(100.0, 4700.0, 6000.0, 4700.0));
        let mut players = vec![player(0, 100.0, 4700.0)];
        resolve(&mut players, &mut lvl, NOW);
        assert_eq!((players[0].x, players[0].y), (6000.0, 4700.0));
        assert!(lvl.entities.teleports[0].is_used());

        // Back on the pad next frame: nothing happens.
        players[0].x = 100.0;
        let events = resolve(&mut players, &mut lvl, NOW + 16);
        assert_eq!(players[0].x, 100.0);
        assert!(events.is_empty());
        assert!(lvl.entities.teleports[0].is_used());
    }

    #[test]
    fn teleport_does_not_chain_within_a_frame() {
        let mut lvl = level();
        lvl.entities
            .teleports
            .push(Teleport::new(100.0, 4700.0, 3000.0, 4700.0));
        lvl.entities
            .teleports
            .push(Teleport::new(3000.0, 4700.0, 6000.0, 4700.0));
        let mut players = vec![player(0, 100.0, 4700.0)];
        resolve(&mut players, &mut lvl, NOW);
        assert_eq!(players[0].x, 3000.0);
        assert!(!lvl.entities.teleports[1].is_used());

        // Still standing on the second pad: it fires next frame.
        resolve(&mut players, &mut lvl, NOW + 16);
        assert_eq!(players[0].x, 6000.0);
    }

    #[test]
    fn teleport_target_is_clamped_into_world() {
        let mut lvl = level();
        lvl.entities
            .teleports
            .push(Teleport::new(100.0, 4700.0, 9000.0, -50.0));
        let mut players = vec![player(0, 100.0, 4700.0)];
        resolve(&mut players, &mut lvl, NOW);
        assert_eq!((players[0].x, players[0].y), (7960.0, 0.0));
    }

    #[test]
    fn one_teleport_serves_one_player() {
        let mut lvl = level();
        lvl.entities
            .teleports
            .push(Teleport::new(100.0, 4700.0, 6000.0, 4700.0));
        let mut players = vec![player(0, 100.0, 4700.0), player(1, 105.0, 4700.0)];
        resolve(&mut players, &mut lvl, NOW);
        assert_eq!(players[0].x, 6000.0);
        assert_eq!(players[1].x, 105.0);
    }

    #[test]
    fn boost_pickup_conserves_tile_count() {
        let mut lvl = level();
        lvl.entities.boost_tiles.push(BoostTile::new(500.0, 4700.0));
        lvl.entities.boost_tiles.push(BoostTile::new(3000.0, 1000.0));
        let mut players = vec![player(0, 500.0, 4700.0)];
        let events = resolve(&mut players, &mut lvl, NOW);

        assert_eq!(lvl.entities.boost_tiles.len(), 2);
        assert!(players[0].boost.is_active(NOW + 7999));
        assert!(!players[0].boost.is_active(NOW + 8000));
        assert_eq!(events, vec![GameEvent::BoostCollected { player_id: 0 }]);
        // The replacement sits on a floating platform, never the ground.
        let replacement = lvl.entities.boost_tiles.last().unwrap();
        assert!(replacement.rect().y < 4750.0 - 16.0);
        assert!(replacement.rect().y == 2984.0 || replacement.rect().y == 1984.0);
    }

    #[test]
    fn two_players_on_one_tile_claim_it_once() {
        let mut lvl = level();
        lvl.entities.boost_tiles.push(BoostTile::new(500.0, 4700.0));
        let mut players = vec![player(0, 500.0, 4700.0), player(1, 505.0, 4700.0)];
        resolve(&mut players, &mut lvl, NOW);
        assert_eq!(lvl.entities.boost_tiles.len(), 1);
        assert!(players[0].boost.is_active(NOW));
        assert!(!players[1].boost.is_active(NOW));
    }

    #[test]
    fn boost_falls_back_to_own_spot_without_platforms() {
        let mut lvl = level();
        lvl.platforms.clear();
        lvl.entities.boost_tiles.push(BoostTile::new(500.0, 4700.0));
        let mut players = vec![player(0, 500.0, 4700.0)];
        resolve(&mut players, &mut lvl, NOW);
        assert_eq!(lvl.entities.boost_tiles.len(), 1);
        assert_eq!(lvl.entities.boost_tiles[0].rect().x, 500.0);
    }

    #[test]
    fn empty_level_is_a_no_op() {
        let mut lvl = level();
        let mut players = vec![player(0, 500.0, 500.0)];
        let before = players.clone();
        let events = resolve(&mut players, &mut lvl, NOW);
        assert!(events.is_empty());
        assert_eq!(players, before);
    }

    #[test]
    fn tag_runs_after_teleport() {
        // The teleport drops player 0 onto player 1, who is "it".
        let mut lvl = level();
        lvl.entities
            .teleports
            .push(Teleport::new(100.0, 4700.0, 4000.0, 4700.0));
        let mut players = vec![player(0, 100.0, 4700.0), player(1, 4010.0, 4700.0)];
        let mut rules = Rules::Tag(TagRules::new(1));
        let mut rng = StdRng::seed_from_u64(1);
        let events = resolve_interactions(
            &mut players,
            &mut lvl,
            &mut rules,
            NOW,
            &GameConfig::default(),
            &mut rng,
        );
        assert_eq!(rules.tag_holder(), Some(0));
        assert!(events.contains(&GameEvent::Tagged { from: 1, to: 0 }));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn boost_count_is_invariant(
                positions in prop::collection::vec((0.0f32..7960.0, 0.0f32..4760.0), 1..5),
                tiles in prop::collection::vec((0.0f32..7950.0, 0.0f32..4750.0), 0..8),
                seed in any::<u64>(),
            ) {
                let mut lvl = level();
                for (x, y) in &tiles {
                    lvl.entities.boost_tiles.push(BoostTile::new(*x, *y));
                }
                let mut players: Vec<PlayerState> = positions
                    .iter()
                    .enumerate()
                    .map(|(i, (x, y))| player(i, *x, *y))
                    .collect();
                let mut rules = Rules::Coop(CoopRules::new());
                let mut rng = StdRng::seed_from_u64(seed);
                for frame in 0..3 {
                    resolve_interactions(
                        &mut players,
                        &mut lvl,
                        &mut rules,
                        NOW + frame * 16,
                        &GameConfig::default(),
                        &mut rng,
                    );
                    prop_assert_eq!(lvl.entities.boost_tiles.len(), tiles.len());
                }
            }

            #[test]
            fn exactly_one_it_after_any_frame(
                positions in prop::collection::vec((0.0f32..400.0, 0.0f32..400.0), 2..5),
                start in 0usize..4,
                frames in 1u64..20,
            ) {
                let mut lvl = level();
                let mut players: Vec<PlayerState> = positions
                    .iter()
                    .enumerate()
                    .map(|(i, (x, y))| player(i, *x, *y))
                    .collect();
                let count = players.len();
                let mut rules = Rules::Tag(TagRules::new(start % count));
                let mut rng = StdRng::seed_from_u64(0);
                for frame in 0..frames {
                    resolve_interactions(
                        &mut players,
                        &mut lvl,
                        &mut rules,
                        NOW + frame * 500,
                        &GameConfig::default(),
                        &mut rng,
                    );
                    let holder = rules.tag_holder();
                    prop_assert!(matches!(holder, Some(id) if id < count));
                }
            }
        }
    }
}
