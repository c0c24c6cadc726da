//! thresh-racer CLI: replay a directory of frames through the motion race.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use thresh_racer::replay::{
    collect_frame_paths, replay_frames, ReplayConfig, ReplayOptions, ReplaySummary,
};
use thresh_racer::{DisplayState, TickOutcome};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "thresh-racer")]
#[command(about = "Race two lanes of a frame sequence by how much motion each one sees")]
#[command(version)]
struct Cli {
    /// Diagnostics written to stderr.
    #[arg(long, value_enum, global = true, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed every PNG/JPEG in a directory (sorted by name) to the racer.
    Replay(ReplayArgs),

    /// Print the default replay config as JSON.
    Defaults,
}

#[derive(Debug, Clone, Args)]
struct ReplayArgs {
    /// Directory holding the frames.
    dir: PathBuf,

    /// JSON replay config (parameters, lane corners, race start).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frame index at which the race starts; overrides the config.
    #[arg(long)]
    start_at: Option<usize>,

    /// Write the diff mask of every scored frame into this directory.
    #[arg(long)]
    mask_dir: Option<PathBuf>,

    /// Print one JSON display state per frame instead of a status line.
    #[arg(long)]
    json: bool,

    /// Keep replaying after the race has finished.
    #[arg(long)]
    keep_going: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(level: LogLevel) -> CliResult<()> {
    thresh_racer::core::init_with_level(level.into())?;
    Ok(())
}

// RUST_LOG drives the subscriber; --log-level still caps `log` records.
#[cfg(feature = "tracing")]
fn init_logging(level: LogLevel) -> CliResult<()> {
    thresh_racer::core::init_tracing(false);
    log::set_max_level(level.into());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match init_logging(cli.log_level).and_then(|()| run(&cli.command)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: &Commands) -> CliResult<()> {
    match command {
        Commands::Replay(args) => run_replay(args),
        Commands::Defaults => run_defaults(),
    }
}

// ── replay ─────────────────────────────────────────────────────────────

fn run_replay(args: &ReplayArgs) -> CliResult<()> {
    let mut config = match &args.config {
        Some(path) => ReplayConfig::load(path)?,
        None => ReplayConfig::default(),
    };
    if let Some(start_at) = args.start_at {
        config.start_at = Some(start_at);
    }

    let paths = collect_frame_paths(&args.dir)?;
    log::info!("replaying {} frames from {}", paths.len(), args.dir.display());

    let options = ReplayOptions {
        keep_going: args.keep_going,
        mask_dir: args.mask_dir.clone(),
    };

    let mut write_error = None;
    let summary = replay_frames(&paths, &config, &options, |path, outcome, state| {
        if write_error.is_some() {
            return;
        }
        let line = if args.json {
            serde_json::to_string(state).map_err(CliError::from)
        } else {
            Ok(status_line(path, outcome, state))
        };
        match line {
            Ok(line) => println!("{line}"),
            Err(err) => write_error = Some(err),
        }
    })?;
    if let Some(err) = write_error {
        return Err(err);
    }

    if !args.json {
        print_summary(&summary);
    }
    Ok(())
}

fn status_line(path: &Path, outcome: TickOutcome, state: &DisplayState) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match outcome {
        TickOutcome::WarmingUp => format!("[{:>5}] {name}: warming up", state.tick),
        TickOutcome::Scored { .. } => format!(
            "[{:>5}] {name}: {} | {} | instant L {:.3} R {:.3}",
            state.tick,
            state.status_label,
            state.live_label,
            state.instant.left,
            state.instant.right,
        ),
    }
}

fn print_summary(summary: &ReplaySummary) {
    println!(
        "frames: {} read, {} scored",
        summary.frames_read, summary.scored_ticks
    );
    if let Some(state) = &summary.final_state {
        println!("result: {}", state.status_label);
    }
}

// ── defaults ──────────────────────────────────────────────────────────

fn run_defaults() -> CliResult<()> {
    let json = serde_json::to_string_pretty(&ReplayConfig::default())?;
    println!("{json}");
    Ok(())
}
