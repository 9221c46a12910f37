//! Command-line surface and its translation into agents and a backend.

use anyhow::{anyhow, Context};
use clap::Parser;

use orbway::agent::{Agent, AgentRegistry, PlayerAgents};
use orbway::backend::{Backend, BackendRegistry, MemoryBackend};
use orbway::player::Player;
use orbway::random_agent::RandomAgent;
use orbway_sqlite::SqliteBackend;

#[derive(Parser, Debug)]
#[command(
    name = "orbway-sim",
    version,
    about = "Parallel self-play simulator accumulating per-state ratings"
)]
pub struct Cli {
    /// Number of simulation threads (1-100)
    #[arg(short, long, default_value_t = 16, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub threads: u32,

    /// Maximum number of games to simulate (0 = unlimited)
    #[arg(short, long, default_value_t = 0)]
    pub games: u64,

    /// Interval for the status update in milliseconds (100-100000)
    #[arg(long, default_value_t = 250, value_parser = clap::value_parser!(u64).range(100..=100_000))]
    pub status_update_interval: u64,

    /// Display a simple text-based status
    #[arg(long)]
    pub plain_status: bool,

    /// Do not use color or ANSI codes for the output
    #[arg(long)]
    pub no_color: bool,

    /// Agent per player as <n>:<name>, e.g. 0:random (default: random)
    #[arg(short, long)]
    pub agent: Vec<String>,

    /// RNG seed for the random agents (0 = entropy)
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// The rating backend to use
    #[arg(short, long, default_value = "memory")]
    pub backend: String,

    /// Path to the data directory (sqlite backend)
    #[arg(short, long)]
    pub data_dir: Option<String>,

    /// SQLite cache size in pages
    #[arg(long)]
    pub cache_size: Option<i64>,

    /// SQLite journal mode (WAL, DELETE, TRUNCATE, OFF)
    #[arg(long)]
    pub journal_mode: Option<String>,

    /// SQLite page size in bytes (1024-1048576)
    #[arg(long)]
    pub page_size: Option<i64>,

    /// SQLite synchronous mode (OFF, NORMAL, FULL, EXTRA)
    #[arg(long)]
    pub synchronous_mode: Option<String>,

    /// Maximum number of update batches in the backend queue (1-10000)
    #[arg(long)]
    pub maximum_update_queue_size: Option<u32>,

    /// Preset: journal WAL, synchronous OFF, 256k-page cache
    #[arg(long)]
    pub fast_unsafe: bool,

    /// Execute VACUUM before starting
    #[arg(long)]
    pub vacuum: bool,

    /// Write an aggregate statistics JSON file at shutdown
    #[arg(long)]
    pub stats_out: Option<String>,
}

impl Cli {
    /// The effective status interval: plain output updates at most once a
    /// second.
    pub fn effective_status_interval(&self) -> std::time::Duration {
        let minimum = if self.no_color || self.plain_status {
            1000
        } else {
            100
        };
        std::time::Duration::from_millis(self.status_update_interval.max(minimum))
    }

    pub fn plain_output(&self) -> bool {
        self.plain_status || self.no_color
    }

    /// Backend arguments in the `--key=value` form the backends parse.
    fn backend_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(dir) = &self.data_dir {
            args.push(format!("--data-dir={dir}"));
        }
        if let Some(size) = self.cache_size {
            args.push(format!("--cache-size={size}"));
        }
        if let Some(mode) = &self.journal_mode {
            args.push(format!("--journal-mode={mode}"));
        }
        if let Some(size) = self.page_size {
            args.push(format!("--page-size={size}"));
        }
        if let Some(mode) = &self.synchronous_mode {
            args.push(format!("--synchronous-mode={mode}"));
        }
        if let Some(size) = self.maximum_update_queue_size {
            args.push(format!("--maximum-update-queue-size={size}"));
        }
        if self.fast_unsafe {
            args.push("--fast-unsafe".to_string());
        }
        if self.vacuum {
            args.push("--vacuum".to_string());
        }
        args
    }

    /// Create and initialize the configured backend.
    pub fn create_backend(&self) -> anyhow::Result<Box<dyn Backend>> {
        let mut registry = BackendRegistry::new();
        registry.add("memory", || Box::new(MemoryBackend::new()));
        registry.add("sqlite", || Box::new(SqliteBackend::new()));
        let mut backend = registry.create(&self.backend).ok_or_else(|| {
            anyhow!(
                "unknown backend: {} (available: {})",
                self.backend,
                registry.names().join(", ")
            )
        })?;
        let args = if self.backend == "sqlite" {
            self.backend_args()
        } else {
            Vec::new()
        };
        backend
            .initialize(&args)
            .with_context(|| format!("backend {} rejected its options", self.backend))?;
        Ok(backend)
    }

    /// Create and initialize the configured agents, one per seat.
    pub fn create_agents(&self) -> anyhow::Result<(PlayerAgents, [String; 4])> {
        let mut registry = AgentRegistry::new();
        let seed = self.seed;
        registry.add("random", move || {
            Box::new(RandomAgent::with_seed(seed))
        });
        let mut agents: [Option<Box<dyn Agent>>; 4] = [None, None, None, None];
        let mut names: [String; 4] = std::array::from_fn(|_| "random".to_string());
        for spec in &self.agent {
            let (index, name) = spec
                .split_once(':')
                .ok_or_else(|| anyhow!("agent spec must be <n>:<name>, got: {spec}"))?;
            let index: usize = index
                .parse()
                .ok()
                .filter(|i| *i < Player::COUNT as usize)
                .ok_or_else(|| anyhow!("agent player index must be 0-3, got: {index}"))?;
            if agents[index].is_some() {
                return Err(anyhow!("only one agent can be specified for player {index}"));
            }
            let mut agent = registry
                .create(name)
                .ok_or_else(|| anyhow!("unknown agent: {name}"))?;
            agent.initialize(&[])?;
            agents[index] = Some(agent);
            names[index] = name.to_string();
        }
        let agents = agents.map(|slot| {
            slot.unwrap_or_else(|| {
                let mut agent: Box<dyn Agent> = Box::new(RandomAgent::with_seed(seed));
                agent.initialize(&[]).expect("default agent accepts no args");
                agent
            })
        });
        Ok((agents, names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let cli = Cli::parse_from(["orbway-sim"]);
        assert_eq!(cli.threads, 16);
        assert_eq!(cli.games, 0);
        assert_eq!(cli.backend, "memory");
        assert!(!cli.plain_output());
    }

    #[test]
    fn plain_output_raises_the_interval() {
        let cli = Cli::parse_from(["orbway-sim", "--no-color", "--status-update-interval=100"]);
        assert_eq!(
            cli.effective_status_interval(),
            std::time::Duration::from_millis(1000)
        );
        let cli = Cli::parse_from(["orbway-sim", "--status-update-interval=100"]);
        assert_eq!(
            cli.effective_status_interval(),
            std::time::Duration::from_millis(100)
        );
    }

    #[test]
    fn thread_range_is_enforced() {
        assert!(Cli::try_parse_from(["orbway-sim", "--threads=0"]).is_err());
        assert!(Cli::try_parse_from(["orbway-sim", "--threads=101"]).is_err());
        assert!(Cli::try_parse_from(["orbway-sim", "--threads=100"]).is_ok());
    }

    #[test]
    fn agents_default_to_random() {
        let cli = Cli::parse_from(["orbway-sim"]);
        let (agents, names) = cli.create_agents().unwrap();
        assert_eq!(agents.len(), 4);
        assert_eq!(names, ["random", "random", "random", "random"]);
    }

    #[test]
    fn bad_agent_specs_are_rejected() {
        let cli = Cli::parse_from(["orbway-sim", "--agent", "9:random"]);
        assert!(cli.create_agents().is_err());
        let cli = Cli::parse_from(["orbway-sim", "--agent", "0:perfect"]);
        assert!(cli.create_agents().is_err());
        let cli = Cli::parse_from(["orbway-sim", "--agent", "0:random", "--agent", "0:random"]);
        assert!(cli.create_agents().is_err());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let cli = Cli::parse_from(["orbway-sim", "--backend=cloud"]);
        assert!(cli.create_backend().is_err());
    }
}
