//! The supervisor: worker threads, the status thread and cooperative
//! shutdown.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use signal_hook::consts::{SIGINT, SIGUSR1};

use orbway::agent::{Agent, PlayerAgents};
use orbway::backend::Backend;
use orbway::simulator::GameSimulator;

use crate::config::Cli;
use crate::stats::{SimulationStats, StatisticsSummary};

pub struct Application {
    cli: Cli,
    backend: Arc<dyn Backend>,
    agents: PlayerAgents,
    agent_names: [String; 4],
    stop: Arc<AtomicBool>,
    stats: Arc<Mutex<SimulationStats>>,
}

impl Application {
    pub fn new(cli: Cli) -> anyhow::Result<Application> {
        let backend = cli.create_backend()?;
        let (agents, agent_names) = cli.create_agents()?;
        Ok(Application {
            cli,
            backend: Arc::from(backend),
            agents,
            agent_names,
            stop: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(Mutex::new(SimulationStats::default())),
        })
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        self.display_intro();
        self.register_signals()?;
        println!("Backend {}: loading data...", self.cli.backend);
        self.backend.load().context("backend failed to load")?;
        let workers = self.start_workers();
        let status = self.start_status_thread();
        self.wait_for_simulation_end(workers);
        status.join().ok();
        self.write_statistics()?;
        println!("All simulation threads stopped, shutting down the backend...");
        self.backend
            .shutdown()
            .context("backend failed to shut down")?;
        println!("Simulation stopped.");
        Ok(())
    }

    fn display_intro(&self) {
        println!("Orbway Simulation");
        println!("> Simulation with {} threads.", self.cli.threads);
        if self.cli.games > 0 {
            println!("> Maximum number of games: {}", self.cli.games);
        } else {
            println!("> Unlimited number of games. Press Ctrl+C to stop the simulation.");
        }
        println!("> Using backend: {}", self.cli.backend);
        self.backend.display_configuration();
        for (i, name) in self.agent_names.iter().enumerate() {
            let configuration = self.agents[i].configuration_string();
            println!("> Player agent {i}: {name} {configuration}");
        }
        println!();
    }

    fn register_signals(&self) -> anyhow::Result<()> {
        for signal in [SIGINT, SIGUSR1] {
            signal_hook::flag::register(signal, Arc::clone(&self.stop))
                .context("cannot register the termination signals")?;
        }
        Ok(())
    }

    fn start_workers(&self) -> Vec<JoinHandle<()>> {
        println!("Starting simulation...");
        (0..self.cli.threads)
            .map(|thread_id| {
                let agents: PlayerAgents =
                    std::array::from_fn(|i| self.agents[i].copy_for_thread());
                let worker = Worker {
                    thread_id,
                    agents,
                    backend: Arc::clone(&self.backend),
                    stop: Arc::clone(&self.stop),
                    stats: Arc::clone(&self.stats),
                    max_games: self.cli.games,
                };
                std::thread::Builder::new()
                    .name(format!("sim-worker-{thread_id}"))
                    .spawn(move || worker.run())
                    .expect("cannot spawn a simulation worker")
            })
            .collect()
    }

    fn start_status_thread(&self) -> JoinHandle<()> {
        let stop = Arc::clone(&self.stop);
        let stats = Arc::clone(&self.stats);
        let backend = Arc::clone(&self.backend);
        let interval = self.cli.effective_status_interval();
        let plain = self.cli.plain_output();
        std::thread::Builder::new()
            .name("sim-status".to_string())
            .spawn(move || status_loop(stop, stats, backend, interval, plain))
            .expect("cannot spawn the status thread")
    }

    fn wait_for_simulation_end(&self, workers: Vec<JoinHandle<()>>) {
        while !self.stop.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(100));
        }
        println!();
        let interval = self.cli.effective_status_interval();
        while workers.iter().any(|worker| !worker.is_finished()) {
            let running = workers.iter().filter(|w| !w.is_finished()).count();
            println!("Waiting for {running} simulation thread(s) to finish...");
            std::thread::sleep(interval);
        }
        for worker in workers {
            worker.join().ok();
        }
    }

    fn write_statistics(&self) -> anyhow::Result<()> {
        let Some(path) = &self.cli.stats_out else {
            return Ok(());
        };
        let path = PathBuf::from(path);
        let stats = self.stats.lock().expect("stats poisoned");
        StatisticsSummary::from_stats(&stats)
            .write_to(&path)
            .with_context(|| format!("cannot write statistics to {}", path.display()))?;
        println!("Statistics written to {}", path.display());
        Ok(())
    }
}

struct Worker {
    thread_id: u32,
    agents: PlayerAgents,
    backend: Arc<dyn Backend>,
    stop: Arc<AtomicBool>,
    stats: Arc<Mutex<SimulationStats>>,
    max_games: u64,
}

impl Worker {
    fn run(mut self) {
        while !self.stop.load(Ordering::SeqCst) {
            if let Err(error) = self.simulate_game() {
                eprintln!(
                    "Worker {}: game aborted: {error}",
                    self.thread_id
                );
            }
        }
        for agent in &mut self.agents {
            agent.shutdown();
        }
    }

    /// One game: lifecycle callbacks, simulation, persistence, statistics.
    fn simulate_game(&mut self) -> anyhow::Result<()> {
        for agent in &mut self.agents {
            agent.game_start();
        }
        let mut simulator = GameSimulator::new(&mut self.agents);
        let run_result = simulator.run();
        let game_log = simulator.into_game_log();
        run_result?;
        for agent in &mut self.agents {
            agent.game_end(&game_log);
        }
        self.backend.add_game(&game_log)?;
        let mut stats = self.stats.lock().expect("stats poisoned");
        stats.add_game(game_log.winning_player(), game_log.len());
        if self.max_games > 0 && stats.game_count() >= self.max_games {
            self.stop.store(true, Ordering::SeqCst);
        }
        Ok(())
    }
}

fn status_loop(
    stop: Arc<AtomicBool>,
    stats: Arc<Mutex<SimulationStats>>,
    backend: Arc<dyn Backend>,
    interval: Duration,
    plain: bool,
) {
    let bar = if plain {
        None
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .expect("valid template")
                .tick_chars("⠁⠃⠇⠧⠷⠿⠻⠟⠯⠷⠧⠇⠃"),
        );
        Some(bar)
    };
    let mut last_tick = Instant::now();
    while !stop.load(Ordering::SeqCst) {
        std::thread::sleep(interval);
        let now = Instant::now();
        let elapsed = now.duration_since(std::mem::replace(&mut last_tick, now));
        let line = {
            let mut stats = stats.lock().expect("stats poisoned");
            let games = stats.game_count() - stats.last_game_count;
            stats.last_game_count = stats.game_count();
            let games_per_hour =
                games as f64 / elapsed.as_millis().max(1) as f64 * 3_600_000.0;
            stats.games_per_hour.add(games_per_hour);
            format!(
                "{} | {:.0} games/h | {:.1} moves/game | {}",
                stats.rating.to_status_string(),
                stats.games_per_hour.average(),
                stats.move_average.average(),
                backend.status()
            )
        };
        match &bar {
            Some(bar) => bar.set_message(line),
            None => println!("Simulation running: {line}"),
        }
    }
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
}
