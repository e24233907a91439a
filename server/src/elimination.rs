use crate::arena::{Arena, PlayerId};
use crate::physics::PhysicsEngine;
use hookball_shared::vec2::{self, Vec2};
use std::collections::HashSet;

/// Outcome of a lethal collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elimination {
    pub winner: PlayerId,
    pub loser: PlayerId,
}

/// Kinematic state of one player, sampled once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySample {
    pub id: PlayerId,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Sample every player whose body is registered, in arena order.
pub fn sample_players(arena: &Arena, engine: &impl PhysicsEngine) -> Vec<BodySample> {
    arena
        .players()
        .filter_map(|p| {
            Some(BodySample {
                id: p.id,
                position: engine.position(p.body)?,
                velocity: engine.velocity(p.body)?,
            })
        })
        .collect()
}

/// Decide eliminations for every unordered pair of touching players.
///
/// Two players touch when their centers are closer than `contact_distance`.
/// A player eliminates the other only when its speed is strictly greater
/// than `ratio` times the other's speed. A player eliminated earlier in the
/// pass takes part in no later pair.
pub fn find_eliminations(
    samples: &[BodySample],
    contact_distance: f64,
    ratio: f64,
) -> Vec<Elimination> {
    let mut eliminated: HashSet<PlayerId> = HashSet::new();
    let mut outcomes = Vec::new();

    for (i, a) in samples.iter().enumerate() {
        for b in &samples[i + 1..] {
            if eliminated.contains(&a.id) {
                break;
            }
            if eliminated.contains(&b.id) {
                continue;
            }
            if vec2::distance(a.position, b.position) >= contact_distance {
                continue;
            }

            let va = vec2::length(a.velocity);
            let vb = vec2::length(b.velocity);
            let outcome = if va > vb * ratio {
                Elimination {
                    winner: a.id,
                    loser: b.id,
                }
            } else if vb > va * ratio {
                Elimination {
                    winner: b.id,
                    loser: a.id,
                }
            } else {
                continue;
            };

            eliminated.insert(outcome.loser);
            outcomes.push(outcome);
        }
    }

    outcomes
}

/// Run one elimination pass: decide against a snapshot, then remove losers
/// and credit winners.
///
/// A winner that is itself eliminated later in the same pass is not credited.
pub fn resolve_eliminations(
    arena: &mut Arena,
    engine: &mut impl PhysicsEngine,
) -> Vec<Elimination> {
    let samples = sample_players(arena, engine);
    let outcomes = find_eliminations(
        &samples,
        arena.config.player_radius * 2.0,
        arena.config.elimination_ratio,
    );

    for outcome in &outcomes {
        arena.despawn_player(engine, outcome.loser);
    }
    for outcome in &outcomes {
        if let Some(winner) = arena.player_mut(outcome.winner) {
            winner.score += 1;
        }
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::stub::StubEngine;
    use hookball_shared::config::ArenaConfig;
    use hookball_shared::vec2::vec2;

    fn sample(id: PlayerId, x: f64, speed: f64) -> BodySample {
        BodySample {
            id,
            position: vec2(x, 0.0),
            velocity: vec2(speed, 0.0),
        }
    }

    fn arena_with(engine: &mut StubEngine, players: &[(PlayerId, f64, f64)]) -> Arena {
        let mut arena = Arena::new(ArenaConfig::default(), vec![]);
        for &(id, x, speed) in players {
            arena.spawn_player(engine, id, vec2(x, 0.0));
            let body = arena.player(id).unwrap().body;
            engine.set_velocity(body, vec2(speed, 0.0));
        }
        arena
    }

    #[test]
    fn speeds_within_ratio_bounce_without_elimination() {
        let samples = [sample(1, 0.0, 10.0), sample(2, 30.0, 14.0)];
        assert!(find_eliminations(&samples, 40.0, 1.5).is_empty());
    }

    #[test]
    fn equal_speeds_never_eliminate() {
        let samples = [sample(1, 0.0, 12.0), sample(2, 30.0, 12.0)];
        assert!(find_eliminations(&samples, 40.0, 1.5).is_empty());
    }

    #[test]
    fn exact_ratio_is_not_enough() {
        let samples = [sample(1, 0.0, 10.0), sample(2, 30.0, 15.0)];
        assert!(find_eliminations(&samples, 40.0, 1.5).is_empty());
    }

    #[test]
    fn faster_player_eliminates_slower() {
        let samples = [sample(1, 0.0, 10.0), sample(2, 30.0, 16.0)];
        assert_eq!(
            find_eliminations(&samples, 40.0, 1.5),
            vec![Elimination {
                winner: 2,
                loser: 1
            }]
        );
    }

    #[test]
    fn moving_player_eliminates_stationary_one() {
        let samples = [sample(1, 0.0, 2.0), sample(2, 30.0, 0.0)];
        assert_eq!(
            find_eliminations(&samples, 40.0, 1.5),
            vec![Elimination {
                winner: 1,
                loser: 2
            }]
        );
    }

    #[test]
    fn players_not_touching_are_ignored() {
        let samples = [sample(1, 0.0, 15.0), sample(2, 40.0, 0.0)];
        assert!(find_eliminations(&samples, 40.0, 1.5).is_empty());
    }

    #[test]
    fn eliminated_player_skipped_for_later_pairs() {
        // 1 is slowest and touches both 2 and 3; 2 eliminates it first, so the
        // pair (1, 3) is never evaluated
        let samples = [
            sample(1, 0.0, 1.0),
            sample(2, 30.0, 10.0),
            sample(3, -30.0, 10.0),
        ];
        let outcomes = find_eliminations(&samples, 40.0, 1.5);
        assert_eq!(
            outcomes,
            vec![Elimination {
                winner: 2,
                loser: 1
            }]
        );
    }

    #[test]
    fn one_player_can_eliminate_several() {
        let samples = [
            sample(1, 0.0, 12.0),
            sample(2, 30.0, 1.0),
            sample(3, -30.0, 1.0),
        ];
        let outcomes = find_eliminations(&samples, 40.0, 1.5);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.winner == 1));
    }

    #[test]
    fn resolve_removes_loser_and_credits_winner() {
        let mut engine = StubEngine::new();
        let mut arena = arena_with(&mut engine, &[(1, 0.0, 10.0), (2, 30.0, 16.0)]);
        let loser_body = arena.player(1).unwrap().body;

        let outcomes = resolve_eliminations(&mut arena, &mut engine);

        assert_eq!(outcomes.len(), 1);
        assert!(!arena.contains(1));
        assert!(!engine.contains(loser_body));
        assert_eq!(arena.player(2).unwrap().score, 1);
        assert_eq!(engine.body_count(), 1);
    }

    #[test]
    fn resolve_without_contact_changes_nothing() {
        let mut engine = StubEngine::new();
        let mut arena = arena_with(&mut engine, &[(1, 0.0, 10.0), (2, 30.0, 14.0)]);

        assert!(resolve_eliminations(&mut arena, &mut engine).is_empty());
        assert_eq!(arena.player_count(), 2);
        assert!(arena.players().all(|p| p.score == 0));
    }

    #[test]
    fn winner_eliminated_later_is_not_credited() {
        // 2 beats 1, then 3 (much faster) beats 2
        let mut engine = StubEngine::new();
        let mut arena = arena_with(
            &mut engine,
            &[(1, 0.0, 1.0), (2, 30.0, 4.0), (3, 60.0, 14.0)],
        );

        let outcomes = resolve_eliminations(&mut arena, &mut engine);

        assert_eq!(
            outcomes,
            vec![
                Elimination {
                    winner: 2,
                    loser: 1
                },
                Elimination {
                    winner: 3,
                    loser: 2
                },
            ]
        );
        assert_eq!(arena.player_count(), 1);
        assert_eq!(arena.player(3).unwrap().score, 1);
        assert_eq!(engine.body_count(), 1);
    }
}
