//! The single writer thread: owns the SQLite connection, applies tuning
//! pragmas, creates the schema and folds update batches into transactions.

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use rusqlite::{params, Connection};

use orbway::backend::UpdateBatch;
use orbway::error::{Error, Result};
use orbway::player::Player;

use crate::queue::UpdateQueue;

#[derive(Clone, Debug, Default)]
pub struct WriterConfig {
    pub cache_size: Option<i64>,
    pub journal_mode: Option<String>,
    pub page_size: Option<i64>,
    pub synchronous_mode: Option<String>,
    pub vacuum: bool,
}

const CREATE_SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS game_state (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        state_data TEXT NOT NULL,
        game_count INTEGER,
        draws REAL,
        player0_combined REAL,
        player0_win REAL,
        player0_loss REAL,
        player1_combined REAL,
        player1_win REAL,
        player1_loss REAL,
        player2_combined REAL,
        player2_win REAL,
        player2_loss REAL,
        player3_combined REAL,
        player3_win REAL,
        player3_loss REAL
    );
    CREATE UNIQUE INDEX IF NOT EXISTS idx_game_state_data ON game_state (state_data);
    CREATE TABLE IF NOT EXISTS game_move (
        state_id INTEGER NOT NULL,
        next_move_data TEXT NOT NULL,
        next_state_id INTEGER NOT NULL
    );
    CREATE UNIQUE INDEX IF NOT EXISTS idx_game_move_id_data
        ON game_move (state_id, next_move_data);
";

const UPSERT_SQL: &str = "
    INSERT INTO game_state (
        state_data, game_count, draws,
        player0_combined, player0_win, player0_loss,
        player1_combined, player1_win, player1_loss,
        player2_combined, player2_win, player2_loss,
        player3_combined, player3_win, player3_loss)
    VALUES (?1, 1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
    ON CONFLICT (state_data)
    DO UPDATE SET
        game_count = game_count + 1,
        draws = draws + excluded.draws,
        player0_combined = player0_combined + excluded.player0_combined,
        player0_win = player0_win + excluded.player0_win,
        player0_loss = player0_loss + excluded.player0_loss,
        player1_combined = player1_combined + excluded.player1_combined,
        player1_win = player1_win + excluded.player1_win,
        player1_loss = player1_loss + excluded.player1_loss,
        player2_combined = player2_combined + excluded.player2_combined,
        player2_win = player2_win + excluded.player2_win,
        player2_loss = player2_loss + excluded.player2_loss,
        player3_combined = player3_combined + excluded.player3_combined,
        player3_win = player3_win + excluded.player3_win,
        player3_loss = player3_loss + excluded.player3_loss;
";

/// The writer loop: open, tune, create, then drain batches until stopped.
pub fn run(path: PathBuf, config: WriterConfig, queue: Arc<UpdateQueue>) -> Result<()> {
    println!("SQLite: starting the update thread");
    let connection = Connection::open(&path)
        .map_err(|e| sqlite_error(format!("could not open database {}", path.display()), &e))?;
    println!("SQLite: driver version {}", rusqlite::version());
    adjust_pragmas(&connection, &config)?;
    if config.vacuum {
        println!("SQLite: vacuuming the database");
        connection
            .execute_batch("VACUUM")
            .map_err(|e| sqlite_error("failed to vacuum the database", &e))?;
    }
    connection
        .execute_batch(CREATE_SCHEMA_SQL)
        .map_err(|e| sqlite_error("failed to create the schema", &e))?;
    println!("SQLite: processing database updates");
    let result = drain(&connection, &queue);
    if let Err(error) = &result {
        eprintln!("SQLite: writer stopped on error: {error}");
    }
    result
}

fn drain(connection: &Connection, queue: &UpdateQueue) -> Result<()> {
    while !queue.stop.load(Ordering::SeqCst) {
        if let Some(batch) = queue.pop() {
            write_update_batch(connection, &batch)?;
        }
    }
    Ok(())
}

/// Apply one game's updates inside a single transaction. A failed statement
/// rolls the whole batch back and stops the writer.
fn write_update_batch(connection: &Connection, batch: &UpdateBatch) -> Result<()> {
    connection
        .execute_batch("BEGIN TRANSACTION")
        .map_err(|e| sqlite_error("failed to begin a transaction", &e))?;
    let apply = || -> Result<()> {
        let mut statement = connection
            .prepare_cached(UPSERT_SQL)
            .map_err(|e| sqlite_error("failed to prepare the update statement", &e))?;
        for update in batch {
            let rating = update.adjustment.rating();
            let per_player: Vec<f64> = Player::all()
                .iter()
                .flat_map(|player| {
                    let row = rating.player(*player);
                    [row.combined, row.win, row.loss]
                })
                .collect();
            statement
                .execute(params![
                    update.state_data,
                    rating.draws(),
                    per_player[0],
                    per_player[1],
                    per_player[2],
                    per_player[3],
                    per_player[4],
                    per_player[5],
                    per_player[6],
                    per_player[7],
                    per_player[8],
                    per_player[9],
                    per_player[10],
                    per_player[11],
                ])
                .map_err(|e| sqlite_error("failed to execute the update statement", &e))?;
        }
        Ok(())
    };
    match apply() {
        Ok(()) => connection
            .execute_batch("COMMIT TRANSACTION")
            .map_err(|e| sqlite_error("failed to commit the transaction", &e)),
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK TRANSACTION");
            Err(error)
        }
    }
}

fn adjust_pragmas(connection: &Connection, config: &WriterConfig) -> Result<()> {
    if let Some(size) = config.cache_size {
        set_pragma(connection, "cache_size", &size.to_string())?;
    }
    if let Some(mode) = &config.journal_mode {
        set_pragma(connection, "journal_mode", mode)?;
    }
    if let Some(size) = config.page_size {
        set_pragma(connection, "page_size", &size.to_string())?;
    }
    if let Some(mode) = &config.synchronous_mode {
        set_pragma(connection, "synchronous", mode)?;
    }
    Ok(())
}

fn set_pragma(connection: &Connection, pragma: &str, value: &str) -> Result<()> {
    println!("SQLite: setting pragma {pragma} = {value}");
    // PRAGMA statements may return a row (journal_mode does); use a query.
    connection
        .query_row(&format!("PRAGMA {pragma} = {value}"), [], |_| Ok(()))
        .or_else(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Ok(()),
            other => Err(other),
        })
        .map_err(|e| sqlite_error(format!("failed to set pragma {pragma}"), &e))
}

fn sqlite_error(context: impl AsRef<str>, error: &rusqlite::Error) -> Error {
    Error::Rule(format!("{}; SQLite error: {error}", context.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbway::backend::update_batch_for;
    use orbway::game_log::GameLog;
    use orbway::game_move::GameMove;
    use orbway::state::GameState;

    fn in_memory() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        connection.execute_batch(CREATE_SCHEMA_SQL).unwrap();
        connection
    }

    fn log_with_turns(turns: usize) -> GameLog {
        let mut log = GameLog::new();
        let state = GameState::starting_state();
        for turn in 0..turns {
            log.add_turn(
                turn,
                Player::new((turn % 4) as u8),
                state,
                GameMove::default(),
            );
        }
        log.add_last_state(turns, Player::new((turns % 4) as u8), state);
        log
    }

    #[test]
    fn upsert_increments_on_conflict() {
        let connection = in_memory();
        let batch = update_batch_for(&log_with_turns(2));
        write_update_batch(&connection, &batch).unwrap();
        write_update_batch(&connection, &batch).unwrap();
        // All three turns share the starting state: one row, six counts.
        let (rows, count): (i64, i64) = connection
            .query_row(
                "SELECT COUNT(*), SUM(game_count) FROM game_state",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(count, 6);
    }

    #[test]
    fn draws_accumulate() {
        let connection = in_memory();
        let batch = update_batch_for(&log_with_turns(1));
        write_update_batch(&connection, &batch).unwrap();
        let draws: f64 = connection
            .query_row("SELECT draws FROM game_state", [], |row| row.get(0))
            .unwrap();
        // Two turns in a drawn game's log: 1.0 each.
        assert!((draws - 2.0).abs() < 1e-9);
    }

    #[test]
    fn pragmas_apply() {
        let connection = Connection::open_in_memory().unwrap();
        let config = WriterConfig {
            cache_size: Some(1000),
            journal_mode: Some("MEMORY".to_string()),
            page_size: Some(4096),
            synchronous_mode: Some("OFF".to_string()),
            vacuum: false,
        };
        adjust_pragmas(&connection, &config).unwrap();
        let cache: i64 = connection
            .query_row("PRAGMA cache_size", [], |row| row.get(0))
            .unwrap();
        assert_eq!(cache, 1000);
    }
}
