use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use loopsim_app::{Command, EngineConfig, Event, Scheduler, SessionHandle, parse_command};
use simcore::{SimResult, SimulationParameters};

#[derive(Debug, Parser)]
#[command(author, version, about = "Closed-loop P/PI/PID simulation engine")]
struct Cli {
    /// Engine config (JSON); defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for hidden-constant randomization
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log level written to stderr
    #[arg(long, global = true, default_value = "info")]
    log_level: LevelFilter,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Read JSON commands from stdin, stream JSON events to stdout
    Serve,
    /// Run a fixed number of steps without a wall clock and print the final snapshot
    Run {
        /// Simulation parameters (JSON)
        #[arg(long)]
        params: PathBuf,

        /// Number of integration steps
        #[arg(long, default_value_t = 2000)]
        steps: usize,

        /// Resample hidden constants before starting
        #[arg(long)]
        randomize: bool,
    },
}

fn main() -> SimResult<()> {
    let cli = Cli::parse();

    if let Err(e) = TermLogger::init(
        cli.log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("logger init failed: {e}");
    }

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    config.validate()?;

    match cli.mode {
        Mode::Serve => serve(config),
        Mode::Run { params, steps, randomize } => run_headless(config, &params, steps, randomize),
    }
}

fn serve(config: EngineConfig) -> SimResult<()> {
    let handle = SessionHandle::spawn(config)?;
    let commander = handle.commander();

    let reader = thread::Builder::new()
        .name("loopsim-stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(command) => {
                        if commander.send(command).is_err() {
                            break;
                        }
                    }
                    Err(e) => log::warn!("ignoring command: {e}"),
                }
            }
            log::info!("stdin closed");
        })?;

    let mut out = io::stdout().lock();
    while !reader.is_finished() {
        if let Some(event) = handle.recv_event_timeout(Duration::from_millis(50)) {
            writeln!(out, "{}", event.to_json_line()?)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn run_headless(
    config: EngineConfig,
    params_path: &Path,
    steps: usize,
    randomize: bool,
) -> SimResult<()> {
    let params: SimulationParameters =
        serde_json::from_str(&std::fs::read_to_string(params_path)?)?;
    params.validate()?;

    let mut scheduler = Scheduler::new(&config);
    if randomize {
        scheduler.handle(Command::Randomize);
    }
    scheduler.handle(Command::Start { params, running: true });
    let executed = scheduler.run_steps(steps);

    let snapshot = scheduler.flush();
    if let Some((t, y, u, sp)) = snapshot.last() {
        log::info!("{executed} steps: t={t:.3} y={y:.5} u={u:.4} setpoint={sp}");
    }
    println!("{}", Event::Data(snapshot).to_json_line()?);
    Ok(())
}
