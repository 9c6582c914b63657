//! Per-frame simulation tick
//!
//! Order matters: the player moves first, then spawning, then each devil is
//! advanced and resolved. A collision that ends the run, or an exit that
//! clears the level, stops processing the remaining devils for that tick.

use super::collision::devil_hits_player;
use super::state::{GameEvent, GamePhase, Simulation};
use crate::platform::MoveIntent;

/// Advance the simulation by `elapsed` reference frames
///
/// Does nothing unless the simulation is running.
pub fn tick(sim: &mut Simulation, intent: MoveIntent, elapsed: f32) {
    if sim.phase != GamePhase::Running {
        return;
    }

    // Player
    let surface_width = sim.tuning.surface_width;
    sim.player.update(intent, elapsed, surface_width);

    // Spawning
    sim.spawn_accumulator += elapsed * sim.tuning.reference_frame_ms;
    if sim.spawn_accumulator > sim.tuning.spawn_interval(sim.level) {
        sim.spawn_accumulator = 0.0;
        sim.spawn_devil();
    }

    // Devils, back to front so swap_remove only moves already-visited entries
    let cull_line = sim.tuning.surface_height + sim.tuning.cull_margin;
    let mut i = sim.devils.len();
    while i > 0 {
        i -= 1;
        sim.devils[i].update(elapsed);

        if devil_hits_player(&sim.devils[i], &sim.player) {
            sim.devils.swap_remove(i);
            sim.lives -= 1;
            sim.events.push(GameEvent::LivesChanged(sim.lives));
            if sim.lives <= 0 {
                game_over(sim);
                return;
            }
        } else if sim.devils[i].pos.y > cull_line {
            sim.devils.swap_remove(i);
            sim.score += sim.tuning.points_per_devil;
            sim.events.push(GameEvent::ScoreChanged(sim.score));
            if sim.score >= sim.tuning.level_goal(sim.level) {
                level_cleared(sim);
                return;
            }
        }
    }
}

fn level_cleared(sim: &mut Simulation) {
    sim.level += 1;
    sim.phase = GamePhase::LevelCleared;
    sim.events.push(GameEvent::LevelChanged(sim.level));
    sim.events.push(GameEvent::LevelCleared {
        new_level: sim.level,
    });
    log::info!(
        "Level {} cleared with score {}",
        sim.level - 1,
        sim.score
    );
}

fn game_over(sim: &mut Simulation) {
    sim.phase = GamePhase::GameOver;
    sim.events.push(GameEvent::GameOver {
        final_score: sim.score,
    });
    log::info!("Game over at level {} with score {}", sim.level, sim.score);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Devil;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn running_sim() -> Simulation {
        let mut sim = Simulation::new(Tuning::default(), 12345);
        sim.start();
        sim.drain_events();
        sim
    }

    /// A devil that will cross the cull line on the next 1.0 tick
    fn exiting_devil(sim: &Simulation) -> Devil {
        Devil::new(30.0, sim.tuning.surface_height + 49.0, 5.0, 18.0)
    }

    /// A devil sitting on the player
    fn colliding_devil(sim: &Simulation) -> Devil {
        let c = sim.player.center();
        Devil::new(c.x, c.y, 0.0, 20.0)
    }

    #[test]
    fn test_tick_ignored_unless_running() {
        let mut sim = Simulation::new(Tuning::default(), 1);
        let before = sim.player.pos;
        tick(&mut sim, MoveIntent::LEFT, 1.0);
        assert_eq!(sim.player.pos, before);
        assert_eq!(sim.spawn_accumulator, 0.0);
    }

    #[test]
    fn test_player_clamped_at_left_edge() {
        let mut sim = running_sim();
        sim.player.pos.x = 0.0;
        assert_eq!(sim.player.speed, 6.0);
        tick(&mut sim, MoveIntent::LEFT, 1.0);
        assert_eq!(sim.player.pos.x, 0.0);
    }

    #[test]
    fn test_both_directions_cancel() {
        let mut sim = running_sim();
        let x = sim.player.pos.x;
        tick(&mut sim, MoveIntent::BOTH, 1.0);
        assert_eq!(sim.player.pos.x, x);
    }

    #[test]
    fn test_player_moves_by_speed_times_elapsed() {
        let mut sim = running_sim();
        let x = sim.player.pos.x;
        tick(&mut sim, MoveIntent::RIGHT, 2.0);
        assert_eq!(sim.player.pos.x, x + 12.0);
    }

    #[test]
    fn test_spawn_after_interval() {
        let mut sim = running_sim();
        // 72 frames * 16.666 ms = 1199.95 ms, not yet past 1200
        for _ in 0..72 {
            tick(&mut sim, MoveIntent::NONE, 1.0);
        }
        assert!(sim.devils.is_empty());

        tick(&mut sim, MoveIntent::NONE, 1.0);
        assert_eq!(sim.devils.len(), 1);
        assert_eq!(sim.spawn_accumulator, 0.0);
    }

    #[test]
    fn test_higher_levels_spawn_sooner() {
        let mut sim = running_sim();
        sim.level = 10;
        // 350 ms floor: 22 frames = 366.65 ms
        for _ in 0..21 {
            tick(&mut sim, MoveIntent::NONE, 1.0);
        }
        assert!(sim.devils.is_empty());
        tick(&mut sim, MoveIntent::NONE, 1.0);
        assert_eq!(sim.devils.len(), 1);
    }

    #[test]
    fn test_exit_scores_ten_and_keeps_lives() {
        let mut sim = running_sim();
        let devil = exiting_devil(&sim);
        sim.devils.push(devil);

        tick(&mut sim, MoveIntent::NONE, 1.0);
        assert_eq!(sim.score, 10);
        assert_eq!(sim.lives, 3);
        assert!(sim.devils.is_empty());
        assert_eq!(sim.drain_events(), vec![GameEvent::ScoreChanged(10)]);
    }

    #[test]
    fn test_devil_exactly_on_cull_line_stays() {
        let mut sim = running_sim();
        let y = sim.tuning.surface_height + 50.0;
        sim.devils.push(Devil::new(30.0, y, 0.0, 18.0));
        tick(&mut sim, MoveIntent::NONE, 1.0);
        assert_eq!(sim.devils.len(), 1);
        assert_eq!(sim.score, 0);
    }

    #[test]
    fn test_collision_costs_life_not_score() {
        let mut sim = running_sim();
        sim.score = 40;
        let devil = colliding_devil(&sim);
        sim.devils.push(devil);

        tick(&mut sim, MoveIntent::NONE, 1.0);
        assert_eq!(sim.lives, 2);
        assert_eq!(sim.score, 40);
        assert!(sim.devils.is_empty());
        assert_eq!(sim.phase, GamePhase::Running);
        assert_eq!(sim.drain_events(), vec![GameEvent::LivesChanged(2)]);
    }

    #[test]
    fn test_level_cleared_at_threshold() {
        let mut sim = running_sim();
        sim.score = 190;
        let devil = exiting_devil(&sim);
        sim.devils.push(devil);

        tick(&mut sim, MoveIntent::NONE, 1.0);
        assert_eq!(sim.score, 200);
        assert_eq!(sim.level, 2);
        assert_eq!(sim.phase, GamePhase::LevelCleared);
        assert_eq!(
            sim.drain_events(),
            vec![
                GameEvent::ScoreChanged(200),
                GameEvent::LevelChanged(2),
                GameEvent::LevelCleared { new_level: 2 },
            ]
        );

        // Frozen until continue
        tick(&mut sim, MoveIntent::RIGHT, 1.0);
        assert!(sim.drain_events().is_empty());
    }

    #[test]
    fn test_level_goal_only_checked_after_exit() {
        let mut sim = running_sim();
        // Already past the goal, but nothing exits this tick
        sim.score = 250;
        tick(&mut sim, MoveIntent::NONE, 1.0);
        assert_eq!(sim.phase, GamePhase::Running);
        assert_eq!(sim.level, 1);
    }

    #[test]
    fn test_game_over_on_last_life() {
        let mut sim = running_sim();
        sim.lives = 1;
        sim.score = 120;
        let devil = colliding_devil(&sim);
        sim.devils.push(devil);

        tick(&mut sim, MoveIntent::NONE, 1.0);
        assert_eq!(sim.lives, 0);
        assert_eq!(sim.score, 120);
        assert_eq!(sim.phase, GamePhase::GameOver);
        assert_eq!(
            sim.drain_events(),
            vec![
                GameEvent::LivesChanged(0),
                GameEvent::GameOver { final_score: 120 },
            ]
        );
    }

    #[test]
    fn test_game_over_only_checked_after_collision() {
        let mut sim = running_sim();
        sim.lives = 0;
        tick(&mut sim, MoveIntent::NONE, 1.0);
        assert_eq!(sim.phase, GamePhase::Running);
    }

    #[test]
    fn test_game_over_stops_remaining_devils() {
        let mut sim = running_sim();
        sim.lives = 1;
        // Processed last (index 0): would score if reached
        let exiting = exiting_devil(&sim);
        sim.devils.push(exiting);
        // Processed first (last index): ends the run
        let colliding = colliding_devil(&sim);
        sim.devils.push(colliding);

        tick(&mut sim, MoveIntent::NONE, 1.0);
        assert_eq!(sim.phase, GamePhase::GameOver);
        assert_eq!(sim.score, 0);
        assert_eq!(sim.devils.len(), 1);
    }

    #[test]
    fn test_level_clear_stops_remaining_devils() {
        let mut sim = running_sim();
        sim.score = 190;
        let colliding = colliding_devil(&sim);
        sim.devils.push(colliding);
        let exiting = exiting_devil(&sim);
        sim.devils.push(exiting);

        tick(&mut sim, MoveIntent::NONE, 1.0);
        assert_eq!(sim.phase, GamePhase::LevelCleared);
        // The colliding devil was never reached
        assert_eq!(sim.lives, 3);
        assert_eq!(sim.devils.len(), 1);
    }

    #[test]
    fn test_multiple_exits_in_one_tick() {
        let mut sim = running_sim();
        for _ in 0..3 {
            let devil = exiting_devil(&sim);
            sim.devils.push(devil);
        }
        sim.devils.push(Devil::new(200.0, 0.0, 1.0, 18.0));

        tick(&mut sim, MoveIntent::NONE, 1.0);
        assert_eq!(sim.score, 30);
        assert_eq!(sim.devils.len(), 1);
        assert_eq!(sim.devils[0].pos.y, 1.0);
    }

    #[test]
    fn test_determinism() {
        let mut a = Simulation::new(Tuning::default(), 2024);
        let mut b = Simulation::new(Tuning::default(), 2024);
        a.start();
        b.start();

        let inputs = [MoveIntent::LEFT, MoveIntent::NONE, MoveIntent::RIGHT, MoveIntent::BOTH];
        for frame in 0..2000 {
            let intent = inputs[frame % inputs.len()];
            tick(&mut a, intent, 1.0);
            tick(&mut b, intent, 1.0);
        }

        assert_eq!(a.score, b.score);
        assert_eq!(a.lives, b.lives);
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.devils, b.devils);
    }

    proptest! {
        #[test]
        fn player_stays_on_surface(
            start_x in -100.0f32..600.0,
            steps in proptest::collection::vec((any::<bool>(), any::<bool>(), 0.0f32..8.0), 1..50),
        ) {
            let mut sim = running_sim();
            sim.player.pos.x = start_x;
            let max_x = sim.tuning.surface_width - sim.player.width;
            for (left, right, elapsed) in steps {
                tick(&mut sim, MoveIntent { left, right }, elapsed);
                if !sim.is_running() {
                    break;
                }
                prop_assert!(sim.player.pos.x >= 0.0);
                prop_assert!(sim.player.pos.x <= max_x);
            }
        }

        #[test]
        fn exits_and_collisions_are_exclusive(exits in 0usize..5, hits in 0usize..3) {
            let mut sim = running_sim();
            for _ in 0..exits {
                let devil = exiting_devil(&sim);
                sim.devils.push(devil);
            }
            for _ in 0..hits {
                let devil = colliding_devil(&sim);
                sim.devils.push(devil);
            }
            tick(&mut sim, MoveIntent::NONE, 1.0);
            prop_assert_eq!(sim.score, 10 * exits as u32);
            prop_assert_eq!(sim.lives, 3 - hits as i32);
        }
    }
}
