//! End-to-end: parallel self-play feeding the in-memory backend.

use std::sync::Arc;

use orbway::agent::PlayerAgents;
use orbway::backend::{Backend, MemoryBackend};
use orbway::random_agent::RandomAgent;
use orbway::simulator::{simulate_batch, GameSimulator};

fn seeded_agents(seed: u64) -> PlayerAgents {
    [
        Box::new(RandomAgent::with_seed(seed)),
        Box::new(RandomAgent::with_seed(seed + 1)),
        Box::new(RandomAgent::with_seed(seed + 2)),
        Box::new(RandomAgent::with_seed(seed + 3)),
    ]
}

#[test]
fn workers_and_backend_agree_on_the_turn_count() {
    let backend = Arc::new(MemoryBackend::new());
    let mut handles = Vec::new();
    for worker in 0..4u64 {
        let backend = Arc::clone(&backend);
        handles.push(std::thread::spawn(move || {
            let mut turns = 0u64;
            let mut agents = seeded_agents(1000 + worker * 17);
            for _ in 0..2 {
                let mut simulator = GameSimulator::new(&mut agents);
                simulator.run().expect("random self-play must not violate rules");
                let log = simulator.into_game_log();
                turns += log.len() as u64;
                backend.add_game(&log).unwrap();
            }
            turns
        }));
    }
    let total_turns: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    // Every logged turn contributed exactly one upsert.
    assert_eq!(backend.total_rating_count(), total_turns);
    assert!(backend.state_count() > 0);
}

#[test]
fn random_self_play_finishes_every_game() {
    let logs = simulate_batch(6, 2024).unwrap();
    assert_eq!(logs.len(), 6);
    for log in &logs {
        assert!(!log.is_empty());
        let last = &log.turns()[log.len() - 1];
        assert!(last.game_move.is_no_move());
        if log.winning_player().is_some() {
            assert!(last.state.has_winner());
        }
    }
}

/// The full-scale soak from the specification; run with
/// `cargo test --release -- --ignored`.
#[test]
#[ignore]
fn a_thousand_games_without_rule_violations() {
    let logs = simulate_batch(1000, 7).unwrap();
    assert_eq!(logs.len(), 1000);
}
