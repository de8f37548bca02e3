//! Reel CLI
//!
//! Inspect, sample, play, and render storyboard chase timelines.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reel_animation::{driver, render_offline, FrameDriver, Player, Snapshot, TokioClock};
use reel_core::Project;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod project;

use config::ReelConfig;

#[derive(Parser)]
#[command(name = "reel")]
#[command(author, version, about = "Storyboard timeline player", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to reel.toml (defaults to the project's directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a storyboard directory with reel.toml and a sample project
    Init {
        /// Directory to create
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Project name (defaults to the directory name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Print durations, phases, and validation problems
    Inspect {
        /// Project file or directory containing project.json
        project: PathBuf,
    },

    /// Print the snapshot at one instant as JSON
    Sample {
        project: PathBuf,

        /// Global time in seconds
        #[arg(long)]
        at: f32,
    },

    /// Play in real time, printing one line per frame
    Play {
        project: PathBuf,

        /// Frames per second (overrides reel.toml)
        #[arg(long)]
        fps: Option<u32>,
    },

    /// Render every frame offline as JSON lines
    Render {
        project: PathBuf,

        /// Frames per second (overrides reel.toml)
        #[arg(long)]
        fps: Option<u32>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Init { path, name } => cmd_init(&path, name),
        Commands::Inspect { project } => cmd_inspect(&config, &project),
        Commands::Sample { project, at } => cmd_sample(&config, &project, at),
        Commands::Play { project, fps } => {
            cmd_play(&config, &project, fps.unwrap_or(config.playback.fps)).await
        }
        Commands::Render {
            project,
            fps,
            output,
        } => cmd_render(
            &config,
            &project,
            fps.unwrap_or(config.playback.fps),
            output,
        ),
    }
}

fn load_config(cli: &Cli) -> Result<ReelConfig> {
    if let Some(path) = &cli.config {
        return ReelConfig::load_from_dir(path);
    }

    let dir = match &cli.command {
        Commands::Init { .. } => return Ok(ReelConfig::default()),
        Commands::Inspect { project }
        | Commands::Sample { project, .. }
        | Commands::Play { project, .. }
        | Commands::Render { project, .. } => project_dir(project),
    };
    ReelConfig::load_from_dir(&dir)
}

fn project_dir(project: &Path) -> PathBuf {
    if project.is_dir() {
        return project.to_path_buf();
    }
    match project.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// `RUST_LOG` wins over reel.toml; `--verbose` forces debug
fn init_logging(config: &ReelConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_project(config: &ReelConfig, path: &Path) -> Result<Project> {
    let mut project = project::load_project(path)?;
    project.max_survivors = config.roster.max_survivors;

    for problem in project.validate() {
        warn!("{}", problem);
    }
    Ok(project)
}

fn cmd_init(path: &Path, name: Option<String>) -> Result<()> {
    let name = name.unwrap_or_else(|| {
        path.canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "storyboard".to_string())
    });

    info!("Creating storyboard '{}' in {}", name, path.display());
    project::create_project(path, &name)?;

    println!("Created {}", path.join(project::PROJECT_FILE).display());
    println!();
    println!("Next steps:");
    println!("  reel inspect {}", path.display());
    println!("  reel play {}", path.display());
    Ok(())
}

fn cmd_inspect(config: &ReelConfig, path: &Path) -> Result<()> {
    let project = open_project(config, path)?;
    let player = Player::new(project);
    let project = player.project();
    let schedule = player.schedule();

    println!("{}", project.name);
    println!();
    println!("Characters:");
    for character in &project.characters {
        let end = project
            .path_for(&character.id)
            .map(|p| format!("{} waypoints, ends at {:.2}s", p.points.len(), p.end_time()))
            .unwrap_or_else(|| "no path".to_string());
        println!(
            "  {:<14} {:<12} {:?}, {}",
            character.id.as_str(),
            character.display_name,
            character.role,
            end
        );
    }

    let active_start = schedule.start_pause;
    let active_end = active_start + schedule.animation_duration;
    println!();
    println!("Timeline:");
    println!("  start pause   0.00s - {:.2}s", active_start);
    println!("  active        {:.2}s - {:.2}s", active_start, active_end);
    println!(
        "  end pause     {:.2}s - {:.2}s",
        active_end,
        schedule.total_duration()
    );
    println!(
        "  killer enters {:.2}s",
        active_start + schedule.killer_delay
    );

    let survivors = project.survivors().count();
    if survivors > config.roster.max_survivors {
        warn!(
            survivors,
            limit = config.roster.max_survivors,
            "roster exceeds survivor limit"
        );
    }

    let problems = project.validate();
    if problems.is_empty() {
        println!();
        println!("No problems found.");
    } else {
        println!();
        println!("Problems:");
        for problem in problems {
            println!("  - {}", problem);
        }
    }
    Ok(())
}

fn cmd_sample(config: &ReelConfig, path: &Path, at: f32) -> Result<()> {
    let mut player = Player::new(open_project(config, path)?);
    player.seek_to(at);

    let json = serde_json::to_string_pretty(player.snapshot())
        .context("Failed to serialize snapshot")?;
    println!("{}", json);
    Ok(())
}

async fn cmd_play(config: &ReelConfig, path: &Path, fps: u32) -> Result<()> {
    let project = open_project(config, path)?;
    let period = Duration::from_secs_f32(1.0 / fps.max(1) as f32);

    let player = Arc::new(Mutex::new(Player::with_clock(project, TokioClock::new())));
    {
        let mut player = driver::lock(&player);
        info!(duration = player.total_duration(), fps, "playing");
        player.play();
    }

    let frames = FrameDriver::spawn(player.clone(), period);
    let mut printer = tokio::time::interval(period);
    let mut last_printed = None;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                frames.cancel();
                driver::lock(&player).stop();
                info!("playback interrupted");
                break;
            }
            _ = printer.tick() => {
                let finished = frames.is_finished();
                let player = driver::lock(&player);
                let snapshot = player.snapshot();
                if last_printed != Some(snapshot.time) {
                    println!("{}", describe(snapshot));
                    last_printed = Some(snapshot.time);
                }
                if finished {
                    break;
                }
            }
        }
    }

    let exit = frames.join().await;
    info!(?exit, "frame loop ended");
    Ok(())
}

fn cmd_render(config: &ReelConfig, path: &Path, fps: u32, output: Option<PathBuf>) -> Result<()> {
    let project = open_project(config, path)?;
    let frames = render_offline(project, fps);
    info!(frames = frames.len(), fps, "rendered");

    let mut out: Box<dyn Write> = match &output {
        Some(file) => Box::new(std::io::BufWriter::new(
            std::fs::File::create(file)
                .with_context(|| format!("Failed to create {}", file.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };

    for frame in &frames {
        serde_json::to_writer(&mut out, frame).context("Failed to serialize frame")?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// One human-readable line per frame
fn describe(snapshot: &Snapshot) -> String {
    let mut line = format!("{:>7.2}s {:<10}", snapshot.time, format!("{:?}", snapshot.phase));
    for (id, state) in snapshot.iter() {
        if !state.visible {
            line.push_str(&format!("  {}: hidden", id));
            continue;
        }
        line.push_str(&format!(
            "  {}: ({:.0},{:.0}) {:?}",
            id, state.x, state.y, state.effect
        ));
        if state.shaking {
            line.push_str(" ~");
        }
    }
    line
}
