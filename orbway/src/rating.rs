//! The statistical rating model.
//!
//! Every encountered game state accumulates a rating: a draw counter plus a
//! (combined, win, loss) triple per player. A finished game contributes one
//! [`RatingAdjustment`] per logged turn; adjustments sum component-wise and
//! are never rounded on the way.

use std::collections::VecDeque;
use std::ops::{Add, AddAssign};

use crate::game_log::GameTurn;
use crate::player::Player;

const RATING_BASE: f64 = 1.0;
const DELTA_FOR_WIN: f64 = RATING_BASE;
const DELTA_FOR_LOSS: f64 = RATING_BASE / (Player::COUNT as f64 - 1.0);
const COMBINED_DELTA_FOR_WIN: f64 = RATING_BASE;
const COMBINED_DELTA_FOR_DRAW: f64 = RATING_BASE / Player::COUNT as f64 * 0.1;
const COMBINED_DELTA_FOR_LOSS: f64 = -RATING_BASE / (Player::COUNT as f64 - 1.0);

/// The rating triple of a single player.
#[derive(Clone, Copy, Default, Debug)]
pub struct PlayerRating {
    pub combined: f64,
    pub win: f64,
    pub loss: f64,
}

impl PlayerRating {
    pub fn new(combined: f64, win: f64, loss: f64) -> PlayerRating {
        PlayerRating {
            combined,
            win,
            loss,
        }
    }
}

impl Add for PlayerRating {
    type Output = PlayerRating;

    fn add(self, other: PlayerRating) -> PlayerRating {
        PlayerRating {
            combined: self.combined + other.combined,
            win: self.win + other.win,
            loss: self.loss + other.loss,
        }
    }
}

impl AddAssign for PlayerRating {
    fn add_assign(&mut self, other: PlayerRating) {
        *self = *self + other;
    }
}

/// The rating of a game situation: draws plus per-player triples.
#[derive(Clone, Copy, Default, Debug)]
pub struct Rating {
    draws: f64,
    per_player: [PlayerRating; Player::COUNT as usize],
}

impl Rating {
    pub fn draws(&self) -> f64 {
        self.draws
    }

    pub fn per_player(&self) -> &[PlayerRating; Player::COUNT as usize] {
        &self.per_player
    }

    pub fn player(&self, player: Player) -> &PlayerRating {
        &self.per_player[player.index()]
    }

    pub fn adjust_draws(&mut self, delta: f64) {
        self.draws += delta;
    }

    pub fn adjust_player(&mut self, player: Player, delta: PlayerRating) {
        self.per_player[player.index()] += delta;
    }
}

impl Add for Rating {
    type Output = Rating;

    fn add(self, other: Rating) -> Rating {
        let mut per_player = self.per_player;
        for (mine, theirs) in per_player.iter_mut().zip(other.per_player) {
            *mine += theirs;
        }
        Rating {
            draws: self.draws + other.draws,
            per_player,
        }
    }
}

impl AddAssign for Rating {
    fn add_assign(&mut self, other: Rating) {
        *self = *self + other;
    }
}

/// The per-turn contribution of one finished game.
#[derive(Clone, Copy, Default, Debug)]
pub struct RatingAdjustment {
    rating: Rating,
}

impl RatingAdjustment {
    /// The adjustment for one logged turn.
    ///
    /// Index i of the adjustment addresses the player at offset i from the
    /// turn's active player; the state stored with the turn uses the same
    /// normalized indexing.
    pub fn for_turn(
        turn: &GameTurn,
        total_turn_count: usize,
        winning_player: Option<Player>,
    ) -> RatingAdjustment {
        let factor = adjustment_factor(turn.turn, total_turn_count);
        let mut rating = Rating::default();
        if winning_player.is_none() {
            rating.adjust_draws(RATING_BASE);
        }
        let mut actual_player = turn.active_player;
        for i in 0..Player::COUNT {
            match winning_player {
                None => {
                    rating.adjust_player(
                        Player::new(i),
                        PlayerRating::new(COMBINED_DELTA_FOR_DRAW * factor, 0.0, 0.0),
                    );
                }
                Some(winner) if actual_player == winner => {
                    rating.adjust_player(
                        Player::new(i),
                        PlayerRating::new(COMBINED_DELTA_FOR_WIN * factor, DELTA_FOR_WIN, 0.0),
                    );
                }
                Some(_) => {
                    rating.adjust_player(
                        Player::new(i),
                        PlayerRating::new(COMBINED_DELTA_FOR_LOSS * factor, 0.0, DELTA_FOR_LOSS),
                    );
                }
            }
            actual_player = actual_player.next();
        }
        RatingAdjustment { rating }
    }

    /// A whole-game adjustment with factor 1, used for aggregate statistics.
    pub fn for_game(winning_player: Option<Player>) -> RatingAdjustment {
        let mut rating = Rating::default();
        if winning_player.is_none() {
            rating.adjust_draws(RATING_BASE);
        }
        for player in Player::all() {
            match winning_player {
                None => {
                    rating.adjust_player(
                        player,
                        PlayerRating::new(COMBINED_DELTA_FOR_DRAW, 0.0, 0.0),
                    );
                }
                Some(winner) if player == winner => {
                    rating.adjust_player(
                        player,
                        PlayerRating::new(COMBINED_DELTA_FOR_WIN, DELTA_FOR_WIN, 0.0),
                    );
                }
                Some(_) => {
                    rating.adjust_player(
                        player,
                        PlayerRating::new(COMBINED_DELTA_FOR_LOSS, 0.0, DELTA_FOR_LOSS),
                    );
                }
            }
        }
        RatingAdjustment { rating }
    }

    pub fn rating(&self) -> &Rating {
        &self.rating
    }
}

/// The per-turn weighting factor.
///
/// The subtraction wraps on unsigned integers, so every interior turn lands
/// on the 1.0 ceiling and only a turn number equal to the total floors at
/// 0.0001. Flagged for review in DESIGN.md; change it only together with the
/// accumulated data.
fn adjustment_factor(turn: usize, total_turn_count: usize) -> f64 {
    let factor = (turn.wrapping_sub(total_turn_count)) as f64 / turn as f64;
    factor.max(0.0001).min(1.0)
}

/// A state rating plus the number of games that contributed to it.
#[derive(Clone, Copy, Default, Debug)]
pub struct GameRating {
    rating: Rating,
    rating_count: u64,
}

impl GameRating {
    pub fn rating(&self) -> &Rating {
        &self.rating
    }

    pub fn rating_count(&self) -> u64 {
        self.rating_count
    }

    pub fn apply_adjustment(&mut self, adjustment: &RatingAdjustment) {
        self.rating_count += 1;
        self.rating += *adjustment.rating();
    }

    pub fn draws_normal(&self) -> f64 {
        self.rating.draws() / self.rating_count as f64
    }

    /// A compact status line: `C: 123 D: 4.0% P0:+12.3 W:40% L:20% …`.
    pub fn to_status_string(&self) -> String {
        let total = self.rating_count.max(1) as f64;
        let mut result = format!(
            "C:{:>6} D:{:5.2}%",
            self.rating_count,
            self.rating.draws() / total * 100.0
        );
        for (i, player) in self.rating.per_player().iter().enumerate() {
            result.push_str(&format!(
                " P{}:{:5.2}% W:{:5.2}% L:{:5.2}%",
                i,
                player.combined / total * 100.0,
                player.win / total * 100.0,
                player.loss / total * 100.0
            ));
        }
        result
    }
}

/// Rolling mean over the most recent `max_len` samples.
#[derive(Clone, Debug)]
pub struct RollingAverage {
    values: VecDeque<f64>,
    max_len: usize,
    average: f64,
}

impl RollingAverage {
    pub fn new(max_len: usize) -> RollingAverage {
        assert!(max_len > 0);
        RollingAverage {
            values: VecDeque::with_capacity(max_len),
            max_len,
            average: 0.0,
        }
    }

    pub fn add(&mut self, value: f64) {
        if self.values.len() == self.max_len {
            self.values.pop_front();
        }
        self.values.push_back(value);
        self.average = self.values.iter().sum::<f64>() / self.values.len() as f64;
    }

    pub fn average(&self) -> f64 {
        self.average
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_move::GameMove;
    use crate::state::GameState;

    fn turn(number: usize, active: u8) -> GameTurn {
        GameTurn {
            turn: number,
            active_player: Player::new(active),
            state: GameState::starting_state(),
            game_move: GameMove::default(),
        }
    }

    #[test]
    fn factor_floors_and_ceils() {
        // Interior turns wrap to a huge positive value, clamped to 1.0.
        assert_eq!(adjustment_factor(1, 3), 1.0);
        assert_eq!(adjustment_factor(2, 3), 1.0);
        // Turn zero divides by zero into +inf, clamped to 1.0.
        assert_eq!(adjustment_factor(0, 3), 1.0);
        // A turn number equal to the total floors at the zero-guard.
        assert_eq!(adjustment_factor(3, 3), 0.0001);
    }

    #[test]
    fn win_adjustment_per_turn() {
        let winner = Some(Player::new(2));
        let adjustment = RatingAdjustment::for_turn(&turn(0, 0), 3, winner);
        let rating = adjustment.rating();
        assert_eq!(rating.draws(), 0.0);
        // Index 2 addresses the winner (active player 0 + offset 2).
        let winner_row = rating.player(Player::new(2));
        assert_eq!(winner_row.combined, 1.0);
        assert_eq!(winner_row.win, 1.0);
        assert_eq!(winner_row.loss, 0.0);
        for i in [0u8, 1, 3] {
            let row = rating.player(Player::new(i));
            assert!((row.combined + 1.0 / 3.0).abs() < 1e-12);
            assert_eq!(row.win, 0.0);
            assert!((row.loss - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn win_adjustment_follows_the_active_player() {
        // Active player 3, actual winner 1: offset 2 wins.
        let adjustment = RatingAdjustment::for_turn(&turn(1, 3), 3, Some(Player::new(1)));
        let rating = adjustment.rating();
        assert_eq!(rating.player(Player::new(2)).win, 1.0);
        assert_eq!(rating.player(Player::new(0)).win, 0.0);
    }

    #[test]
    fn draw_adjustment() {
        let adjustment = RatingAdjustment::for_turn(&turn(1, 0), 4, None);
        let rating = adjustment.rating();
        assert_eq!(rating.draws(), 1.0);
        for player in Player::all() {
            let row = rating.player(player);
            assert!((row.combined - 0.025).abs() < 1e-12);
            assert_eq!(row.win, 0.0);
            assert_eq!(row.loss, 0.0);
        }
    }

    #[test]
    fn adjustments_accumulate() {
        let mut game_rating = GameRating::default();
        let winner = Some(Player::new(0));
        for _ in 0..3 {
            game_rating.apply_adjustment(&RatingAdjustment::for_game(winner));
        }
        game_rating.apply_adjustment(&RatingAdjustment::for_game(None));
        assert_eq!(game_rating.rating_count(), 4);
        assert_eq!(game_rating.rating().player(Player::new(0)).win, 3.0);
        assert_eq!(game_rating.rating().draws(), 1.0);
        assert!((game_rating.draws_normal() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn rolling_average_window() {
        let mut average = RollingAverage::new(3);
        average.add(3.0);
        assert_eq!(average.average(), 3.0);
        average.add(6.0);
        average.add(9.0);
        assert_eq!(average.average(), 6.0);
        average.add(12.0);
        assert_eq!(average.average(), 9.0);
    }
}
