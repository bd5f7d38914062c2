//! Command-line front end: compile workout text into FIT files, and inspect
//! existing ones.
//!
//! ```bash
//! # Compile a description, writing intervals.fit
//! chainring compile intervals.txt --ftp 250 -v
//!
//! # Read from standard input
//! echo "3x 5min 95% FTP" | chainring compile - -o threes.fit
//!
//! # Show the steps of a file
//! chainring inspect threes.fit
//! ```

mod config;

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use chainring::{
    avec::{self, RepeatMode},
    sans::data::StringMode,
    text,
    workout::Workout,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;

#[derive(Parser)]
#[command(
    name = "chainring",
    version,
    about = "Compile plain-text cycling workouts into FIT workout files"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging and print step breakdowns
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a workout description into a FIT file
    Compile {
        /// Input text file, or `-` for standard input
        input: PathBuf,

        /// Output file (defaults to the input name with a .fit extension)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Workout name
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// Threshold power in watts, for the step breakdown
        #[arg(long)]
        ftp: Option<u16>,

        /// Maximum heart rate, for the step breakdown
        #[arg(long)]
        max_hr: Option<u8>,

        /// TOML file with parse and encode settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// String layout expected by the receiving device
        #[arg(long, value_enum)]
        strings: Option<Strings>,

        /// Write repeated lines once, followed by a repeat step
        #[arg(long)]
        native_repeats: bool,
    },

    /// Print the steps of a FIT workout file
    Inspect {
        /// FIT workout file
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Strings {
    /// Padded or truncated to a fixed width
    Fixed,
    /// Sized to each value
    Variable,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();

    match cli.command {
        Command::Compile {
            input,
            output,
            name,
            ftp,
            max_hr,
            config,
            strings,
            native_repeats,
        } => {
            let mut config = Config::load(config.as_deref())?;

            if let Some(name) = name {
                config.parse.name = name;
            }
            config.parse.ftp = ftp.or(config.parse.ftp);
            config.parse.max_heart_rate = max_hr.or(config.parse.max_heart_rate);

            match strings {
                Some(Strings::Fixed) => config.encode.strings = StringMode::default(),
                Some(Strings::Variable) => config.encode.strings = StringMode::Variable,
                None => {}
            }
            if native_repeats {
                config.encode.repeats = RepeatMode::Native;
            }

            compile(&input, output, &config, cli.verbose)
        }
        Command::Inspect { file } => inspect(&file),
    }
}

fn compile(
    input: &Path,
    output: Option<PathBuf>,
    config: &Config,
    verbose: bool,
) -> anyhow::Result<()> {
    let text = read_input(input)?;
    let parse = text::parse_with(&text, &config.parse);

    for warning in &parse.warnings {
        warn!("{warning}");
    }
    for err in &parse.errors {
        error!("{err}");
    }

    let Some(workout) = parse.workout else {
        bail!("No workout produced from {}", input.display());
    };

    if verbose {
        print_steps(&workout);
    }

    let output = output.unwrap_or_else(|| default_output(input));
    let bytes = avec::encode_with(&workout, &config.encode);

    fs::write(&output, &bytes).with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        path = %output.display(),
        steps = workout.steps.len(),
        duration = %workout.total_duration_formatted(),
        bytes = bytes.len(),
        "Wrote workout"
    );

    Ok(())
}

fn inspect(path: &Path) -> anyhow::Result<()> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    debug!(path = %path.display(), bytes = bytes.len(), "Read file");

    let workout = avec::decode_workout(&bytes)
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    print_steps(&workout);

    Ok(())
}

fn read_input(input: &Path) -> anyhow::Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read standard input")?;
        return Ok(text);
    }

    fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
}

fn default_output(input: &Path) -> PathBuf {
    if input == Path::new("-") {
        PathBuf::from("workout.fit")
    } else {
        input.with_extension("fit")
    }
}

fn print_steps(workout: &Workout) {
    println!(
        "{} ({} steps, {})",
        workout.name,
        workout.steps.len(),
        workout.total_duration_formatted()
    );

    for (i, step) in workout.steps.iter().enumerate() {
        println!(
            "{:>3}. {:<16} {}",
            i + 1,
            step.label(),
            step.describe(workout.ftp, workout.max_heart_rate)
        );
    }
}
