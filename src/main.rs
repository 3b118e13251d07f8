//! repcue CLI - run tempo-timed sets from the terminal

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::*;
use repcue::commands::set::format_timeline;
use repcue::commands::CommandContext;
use repcue::config::{Config, ConfigStore, FileConfigStore};
use repcue::engine::{ConsoleVoice, VoiceStyle, WorkoutSession};
use repcue::repl::Repl;
use repcue_core::{build_cue_timeline, Language, SetConfig};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "repcue")]
#[command(about = "Tempo-synchronized set coach with spoken rep cues", long_about = None)]
struct Cli {
    /// Config file (default: the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "repcue=trace" (default: RUST_LOG or "warn")
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Cue language tag (en, es, pt, fr, de)
    #[arg(short, long, global = true)]
    language: Option<String>,

    /// Print cues without colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session (default)
    Repl,
    /// Run one set to completion, printing each cue as it is due
    Run {
        #[command(flatten)]
        set: SetArgs,
    },
    /// Print the cue timeline of a set without running it
    Preview {
        #[command(flatten)]
        set: SetArgs,

        /// Print the timeline as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct SetArgs {
    /// Tempo as eccentric-bottom-concentric-top seconds, e.g. 3-1-1-0
    #[arg(short, long)]
    tempo: String,

    /// Number of reps
    #[arg(short, long)]
    reps: u32,

    /// Exercise name announced at the start
    #[arg(short, long, default_value = "")]
    exercise: String,

    /// Set number announced at the start
    #[arg(short, long)]
    set: Option<u32>,
}

impl SetArgs {
    fn into_config(self, language: Language) -> SetConfig {
        let config = SetConfig::new(self.tempo, self.reps)
            .with_exercise(self.exercise)
            .with_language(language);
        match self.set {
            Some(n) => config.with_set_number(n),
            None => config,
        }
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    // Logs on stderr, spoken cues on stdout
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let mut config = store.load();
    info!(path = %store.path().display(), "Configuration loaded");

    if let Some(tag) = &cli.language {
        if Language::from_tag(tag).is_none() {
            bail!("unknown language {:?} (expected en, es, pt, fr or de)", tag);
        }
        config.language = tag.clone();
    }
    if cli.no_color {
        config.colored_voice = false;
        colored::control::set_override(false);
    }

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => run_repl(config, store),
        Commands::Run { set } => run_set(&config, set),
        Commands::Preview { set, json } => preview(&config, set, json),
    }
}

fn voice_style(config: &Config) -> VoiceStyle {
    if config.colored_voice {
        VoiceStyle::Colored
    } else {
        VoiceStyle::Plain
    }
}

fn run_repl(config: Config, store: FileConfigStore) -> Result<()> {
    let voice = ConsoleVoice::stdout(voice_style(&config));
    let session = WorkoutSession::spawn(voice, config.coordinator_options());
    let ctx = CommandContext::new(session, config).with_store(Box::new(store));
    let mut repl = Repl::new(ctx)?;
    repl.run()
}

fn run_set(config: &Config, set: SetArgs) -> Result<()> {
    let set_config = set.into_config(config.language());
    let target_reps = set_config.target_reps;
    let voice = ConsoleVoice::stdout(voice_style(config));
    let session = WorkoutSession::spawn(voice, config.coordinator_options());

    let final_state = session.run_set(set_config)?;
    if final_state.completed_reps < target_reps {
        warn!(completed = final_state.completed_reps, target_reps, "Set ended early");
    }
    println!(
        "{}",
        format!("{} of {} reps completed", final_state.completed_reps, target_reps).bright_cyan()
    );
    Ok(())
}

fn preview(config: &Config, set: SetArgs, json: bool) -> Result<()> {
    let set_config = set.into_config(config.language());
    let phases = set_config.phases()?;
    let cues = build_cue_timeline(&set_config, &phases);
    if json {
        println!("{}", serde_json::to_string_pretty(&cues)?);
        return Ok(());
    }
    println!(
        "{} {} x {} ({}s)",
        "Tempo".bold(),
        phases,
        set_config.target_reps,
        phases.rep_duration() * set_config.target_reps
    );
    println!("{}", format_timeline(&cues));
    Ok(())
}
