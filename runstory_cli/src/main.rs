mod console;
mod ticker;

use clap::{Parser, Subcommand};
use console::{ConsoleAudio, Reporter};
use runstory_core::*;
use std::path::{Path, PathBuf};
use ticker::IntervalDriver;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "runstory")]
#[command(about = "Narrated interval workouts in the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workout session (default)
    Run {
        /// Built-in preset id (see `presets`); defaults to the configured workout
        #[arg(long)]
        preset: Option<String>,

        /// Narration manifest (JSON) with story text and audio tracks
        #[arg(long)]
        narration: Option<PathBuf>,

        /// Tick through the whole session immediately instead of in real time
        #[arg(long)]
        simulate: bool,

        /// Start with narration muted
        #[arg(long)]
        muted: bool,
    },

    /// Show the phase-by-phase plan of a workout
    Plan {
        /// Built-in preset id; defaults to the configured workout
        #[arg(long)]
        preset: Option<String>,
    },

    /// List built-in presets
    Presets,

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    runstory_core::logging::init();

    let cli = Cli::parse();

    // Loaded per command so `init` still works when the existing file is invalid
    let load_config = || match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    match cli.command {
        Some(Commands::Run {
            preset,
            narration,
            simulate,
            muted,
        }) => cmd_run(
            &load_config()?,
            preset.as_deref(),
            narration.as_deref(),
            simulate,
            muted,
        ),
        Some(Commands::Plan { preset }) => cmd_plan(&load_config()?, preset.as_deref()),
        Some(Commands::Presets) => cmd_presets(),
        Some(Commands::Init { force }) => cmd_init(cli.config.as_deref(), force),
        None => {
            // Default to a live run of the configured workout
            cmd_run(&load_config()?, None, None, false, false)
        }
    }
}

fn select_schedule(config: &Config, preset: Option<&str>) -> Result<(String, Schedule)> {
    match preset {
        Some(id) => {
            let preset = get_default_catalog().get(id)?;
            Ok((preset.name.clone(), preset.schedule()?))
        }
        None => Ok(("Custom workout".to_string(), config.workout.to_schedule()?)),
    }
}

fn cmd_run(
    config: &Config,
    preset: Option<&str>,
    narration_path: Option<&Path>,
    simulate: bool,
    muted: bool,
) -> Result<()> {
    let (name, schedule) = select_schedule(config, preset)?;
    let narration = match narration_path {
        Some(path) => Narration::load_from(path)?,
        None => Narration::default(),
    };

    let mut audio_config = config.audio.clone();
    audio_config.start_muted |= muted;

    println!(
        "{} · {} sets · {}",
        name,
        schedule.set_count(),
        format_clock(duration_secs(&schedule))
    );

    if simulate {
        run_simulated(schedule, narration, &audio_config);
        Ok(())
    } else {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let result = runtime.block_on(run_live(schedule, narration, &audio_config));
        // The stdin reader may still be parked in a blocking read
        runtime.shutdown_background();
        result
    }
}

fn run_simulated(schedule: Schedule, narration: Narration, audio_config: &AudioConfig) {
    let mut session = Session::new(
        schedule,
        narration,
        ManualDriver::new(),
        ConsoleAudio::new(),
        audio_config,
    );
    let mut reporter = Reporter::new(false);

    session.start();
    reporter.report(&session);
    while session.tick() {
        reporter.report(&session);
    }

    session.discard();
}

async fn run_live(schedule: Schedule, narration: Narration, audio_config: &AudioConfig) -> Result<()> {
    let mut session = Session::new(
        schedule,
        narration,
        IntervalDriver::new(),
        ConsoleAudio::new(),
        audio_config,
    );
    let mut reporter = Reporter::new(true);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    println!("Enter: start/pause · r: reset · m: mute · t: tap to play · q: quit");
    session.start();
    reporter.report(&session);

    loop {
        tokio::select! {
            _ = session.driver_mut().next_tick() => {
                if session.tick() {
                    reporter.report(&session);
                }
                if session.state().map(|s| s.is_complete()).unwrap_or(true) {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    // Nothing left to resume a stopped session
                    if !session.state().map(TimerState::is_ticking).unwrap_or(false) {
                        println!("Input closed. Session discarded.");
                        break;
                    }
                    continue;
                };
                match line.trim().to_lowercase().as_str() {
                    "q" => {
                        println!("Session discarded.");
                        break;
                    }
                    "r" => {
                        session.reset();
                        println!("Session reset. Press Enter to start.");
                    }
                    "m" => {
                        session.toggle_mute();
                    }
                    "t" => session.user_gesture(),
                    _ => {
                        session.toggle();
                    }
                }
                reporter.report(&session);
            }
        }
    }

    session.discard();
    Ok(())
}

fn cmd_plan(config: &Config, preset: Option<&str>) -> Result<()> {
    let (name, schedule) = select_schedule(config, preset)?;

    println!("\n{}", name);
    println!("─────────────────────────────────────────");
    for segment in schedule.segments() {
        let label = match segment.phase {
            Phase::Rest => format!("Rest before set {}", segment.position.set_index + 1),
            Phase::Pause => "Pause".to_string(),
            _ => schedule
                .interval_at(segment.position)
                .map(|i| i.label.clone())
                .unwrap_or_default(),
        };
        println!(
            "  {:<7} {:<28} {}",
            format!("{:?}", segment.phase),
            label,
            format_clock(segment.seconds)
        );
    }
    println!("─────────────────────────────────────────");
    println!("Total: {}", format_clock(duration_secs(&schedule)));

    Ok(())
}

fn cmd_presets() -> Result<()> {
    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Preset validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Config("Invalid preset catalog".into()));
    }

    for preset in catalog.presets.values() {
        let total = preset.schedule()?.total_seconds();
        println!(
            "{:<12} {:<20} {:>7}  {}",
            preset.id,
            preset.name,
            format_clock(u32::try_from(total).unwrap_or(u32::MAX)),
            preset.description
        );
    }

    Ok(())
}

fn cmd_init(path: Option<&Path>, force: bool) -> Result<()> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_config_path);
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        )));
    }

    Config::default().save_to(&path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn duration_secs(schedule: &Schedule) -> u32 {
    u32::try_from(schedule.total_seconds()).unwrap_or(u32::MAX)
}
