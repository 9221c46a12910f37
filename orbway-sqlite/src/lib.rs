//! SQLite rating backend.
//!
//! Simulation workers enqueue one update batch per finished game into a
//! bounded queue; a single dedicated writer thread owns the database
//! connection and applies each batch inside one transaction. Pushing into a
//! full queue blocks (polling every 100 ms) until the writer drains an entry
//! or shutdown is requested, so a slow disk back-pressures the workers
//! instead of growing memory without bound.

mod queue;
mod writer;

pub use queue::UpdateQueue;

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use orbway::backend::{update_batch_for, Backend};
use orbway::error::{Error, Result};
use orbway::game_log::GameLog;

use crate::writer::WriterConfig;

const DEFAULT_MAX_UPDATE_QUEUE_SIZE: usize = 50;
const SHUTDOWN_QUEUE_GRACE: Duration = Duration::from_secs(10);

/// The SQLite-backed rating store.
pub struct SqliteBackend {
    data_dir: PathBuf,
    config: WriterConfig,
    queue: Arc<UpdateQueue>,
    writer: Mutex<Option<JoinHandle<Result<()>>>>,
}

impl Default for SqliteBackend {
    fn default() -> SqliteBackend {
        SqliteBackend::new()
    }
}

impl SqliteBackend {
    pub fn new() -> SqliteBackend {
        SqliteBackend {
            data_dir: PathBuf::new(),
            config: WriterConfig::default(),
            queue: Arc::new(UpdateQueue::new(DEFAULT_MAX_UPDATE_QUEUE_SIZE)),
            writer: Mutex::new(None),
        }
    }

    fn database_path(&self) -> PathBuf {
        self.data_dir.join("games.db")
    }

    fn parse_argument(&mut self, arg: &str) -> Result<()> {
        let mut queue_capacity = None;
        if let Some(value) = arg
            .strip_prefix("--data-dir=")
            .or_else(|| arg.strip_prefix("-d="))
        {
            self.data_dir = PathBuf::from(value);
        } else if let Some(value) = arg.strip_prefix("--cache-size=") {
            let size: i64 = parse_number(value, "cache size")?;
            if !(-1_000_000..=1_000_000).contains(&size) {
                return Err(Error::rule(format!("invalid cache size: {size}")));
            }
            self.config.cache_size = Some(size);
        } else if let Some(value) = arg.strip_prefix("--journal-mode=") {
            if !["WAL", "DELETE", "TRUNCATE", "OFF"].contains(&value) {
                return Err(Error::rule(format!("invalid journal mode: {value}")));
            }
            self.config.journal_mode = Some(value.to_string());
        } else if let Some(value) = arg.strip_prefix("--page-size=") {
            let size: i64 = parse_number(value, "page size")?;
            if !(1024..=1_048_576).contains(&size) {
                return Err(Error::rule(format!("invalid page size: {size}")));
            }
            self.config.page_size = Some(size);
        } else if let Some(value) = arg.strip_prefix("--synchronous-mode=") {
            if !["OFF", "NORMAL", "FULL", "EXTRA"].contains(&value) {
                return Err(Error::rule(format!("invalid synchronous mode: {value}")));
            }
            self.config.synchronous_mode = Some(value.to_string());
        } else if let Some(value) = arg.strip_prefix("--maximum-update-queue-size=") {
            let size: i64 = parse_number(value, "queue size")?;
            if !(1..=10_000).contains(&size) {
                return Err(Error::rule(format!(
                    "invalid maximum update queue size: {size}"
                )));
            }
            queue_capacity = Some(size as usize);
        } else if arg == "--fast-unsafe" {
            self.config.cache_size = Some(262_144);
            self.config.journal_mode = Some("WAL".to_string());
            self.config.synchronous_mode = Some("OFF".to_string());
        } else if arg == "--vacuum" {
            self.config.vacuum = true;
        } else {
            return Err(Error::rule(format!("unknown sqlite backend option: {arg}")));
        }
        if let Some(capacity) = queue_capacity {
            self.queue = Arc::new(UpdateQueue::new(capacity));
        }
        Ok(())
    }

    fn wait_for_queue(&self) {
        println!("SQLite: shutdown requested, waiting up to 10s for the queue");
        let deadline = Instant::now() + SHUTDOWN_QUEUE_GRACE;
        while !self.queue.is_empty() && Instant::now() < deadline {
            self.queue.wait_for_drain(Duration::from_millis(1000));
        }
    }
}

fn parse_number(value: &str, what: &str) -> Result<i64> {
    value
        .parse()
        .map_err(|_| Error::rule(format!("invalid {what}: {value}")))
}

impl Backend for SqliteBackend {
    fn initialize(&mut self, args: &[String]) -> Result<()> {
        for arg in args {
            self.parse_argument(arg)?;
        }
        if self.data_dir.as_os_str().is_empty() {
            self.data_dir =
                std::env::current_dir().map_err(|e| Error::rule(format!("no data dir: {e}")))?;
        }
        if !self.data_dir.exists() {
            return Err(Error::rule(format!(
                "data directory does not exist: {}",
                self.data_dir.display()
            )));
        }
        Ok(())
    }

    fn display_configuration(&self) {
        println!("  data-dir...................: {}", self.data_dir.display());
        if let Some(size) = self.config.cache_size {
            println!("  cache-size.................: {size}");
        }
        if let Some(mode) = &self.config.journal_mode {
            println!("  journal-mode...............: {mode}");
        }
        if let Some(size) = self.config.page_size {
            println!("  page-size..................: {size}");
        }
        if let Some(mode) = &self.config.synchronous_mode {
            println!("  synchronous-mode...........: {mode}");
        }
        println!(
            "  maximum-update-queue-size..: {}",
            self.queue.capacity()
        );
    }

    /// Spawn the writer thread owning the database connection.
    fn load(&self) -> Result<()> {
        let mut writer = self.writer.lock().expect("writer handle poisoned");
        if writer.is_some() {
            return Err(Error::invariant("sqlite backend loaded twice"));
        }
        let queue = Arc::clone(&self.queue);
        let path = self.database_path();
        let config = self.config.clone();
        *writer = Some(
            std::thread::Builder::new()
                .name("sqlite-writer".to_string())
                .spawn(move || writer::run(path, config, queue))
                .map_err(|e| Error::rule(format!("cannot spawn the writer thread: {e}")))?,
        );
        Ok(())
    }

    fn add_game(&self, game_log: &GameLog) -> Result<()> {
        if game_log.is_empty() {
            return Ok(());
        }
        self.queue.push(update_batch_for(game_log));
        Ok(())
    }

    fn status(&self) -> String {
        format!(
            "OK: {:>3}/{:>3} updates in queue",
            self.queue.len(),
            self.queue.capacity()
        )
    }

    /// Drain the queue (bounded), stop and join the writer.
    fn shutdown(&self) -> Result<()> {
        self.wait_for_queue();
        self.queue.stop.store(true, Ordering::SeqCst);
        self.queue.notify_all();
        let handle = self.writer.lock().expect("writer handle poisoned").take();
        if let Some(handle) = handle {
            println!("SQLite: waiting for the writer thread");
            match handle.join() {
                Ok(result) => result?,
                Err(_) => return Err(Error::invariant("the writer thread panicked")),
            }
        }
        println!("SQLite: stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_parsing() {
        let mut backend = SqliteBackend::new();
        let args: Vec<String> = [
            "--cache-size=1000",
            "--journal-mode=WAL",
            "--page-size=4096",
            "--synchronous-mode=NORMAL",
            "--maximum-update-queue-size=10",
            "--vacuum",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        backend.initialize(&args).unwrap();
        assert_eq!(backend.config.cache_size, Some(1000));
        assert_eq!(backend.config.journal_mode.as_deref(), Some("WAL"));
        assert_eq!(backend.queue.capacity(), 10);
        assert!(backend.config.vacuum);
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        for bad in [
            "--journal-mode=SOMETIMES",
            "--page-size=1",
            "--cache-size=2000000",
            "--synchronous-mode=MAYBE",
            "--maximum-update-queue-size=0",
            "--what-is-this",
        ] {
            let mut backend = SqliteBackend::new();
            assert!(
                backend.initialize(&[bad.to_string()]).is_err(),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn fast_unsafe_preset() {
        let mut backend = SqliteBackend::new();
        backend
            .initialize(&["--fast-unsafe".to_string()])
            .unwrap();
        assert_eq!(backend.config.cache_size, Some(262_144));
        assert_eq!(backend.config.journal_mode.as_deref(), Some("WAL"));
        assert_eq!(backend.config.synchronous_mode.as_deref(), Some("OFF"));
    }
}
