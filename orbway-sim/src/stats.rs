//! Aggregate statistics over the finished games, exportable as JSON.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use orbway::player::Player;
use orbway::rating::{GameRating, RatingAdjustment, RollingAverage};

/// The window of the games/hour and moves-per-game rolling means.
pub const ROLLING_AVERAGE_WINDOW: usize = 100;

/// The record the workers and the status thread share behind one mutex.
pub struct SimulationStats {
    pub rating: GameRating,
    pub games_per_hour: RollingAverage,
    pub move_average: RollingAverage,
    pub last_game_count: u64,
}

impl Default for SimulationStats {
    fn default() -> SimulationStats {
        SimulationStats {
            rating: GameRating::default(),
            games_per_hour: RollingAverage::new(ROLLING_AVERAGE_WINDOW),
            move_average: RollingAverage::new(ROLLING_AVERAGE_WINDOW),
            last_game_count: 0,
        }
    }
}

impl SimulationStats {
    /// Fold one finished game in.
    pub fn add_game(&mut self, winning_player: Option<Player>, log_size: usize) {
        self.rating
            .apply_adjustment(&RatingAdjustment::for_game(winning_player));
        self.move_average.add(log_size as f64);
    }

    pub fn game_count(&self) -> u64 {
        self.rating.rating_count()
    }
}

/// The JSON summary written at shutdown.
#[derive(Serialize)]
pub struct StatisticsSummary {
    pub games: u64,
    pub draws: f64,
    pub wins_per_player: [f64; Player::COUNT as usize],
    pub mean_turns: f64,
    pub games_per_hour: f64,
}

impl StatisticsSummary {
    pub fn from_stats(stats: &SimulationStats) -> StatisticsSummary {
        let rating = stats.rating.rating();
        let wins_per_player =
            std::array::from_fn(|i| rating.player(Player::new(i as u8)).win);
        StatisticsSummary {
            games: stats.rating.rating_count(),
            draws: rating.draws(),
            wins_per_player,
            mean_turns: stats.move_average.average(),
            games_per_hour: stats.games_per_hour.average(),
        }
    }

    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, self).map_err(std::io::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_accumulate() {
        let mut stats = SimulationStats::default();
        stats.add_game(Some(Player::new(1)), 42);
        stats.add_game(None, 10);
        assert_eq!(stats.game_count(), 2);
        let summary = StatisticsSummary::from_stats(&stats);
        assert_eq!(summary.games, 2);
        assert_eq!(summary.draws, 1.0);
        assert_eq!(summary.wins_per_player, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(summary.mean_turns, 26.0);
    }

    #[test]
    fn summary_writes_json() {
        let mut stats = SimulationStats::default();
        stats.add_game(Some(Player::new(0)), 5);
        let summary = StatisticsSummary::from_stats(&stats);
        let path = std::env::temp_dir().join("orbway_stats_test.json");
        summary.write_to(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"games\": 1"));
        let _ = std::fs::remove_file(&path);
    }
}
