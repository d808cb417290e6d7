mod logging;

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use jam::{
    JamError, RunEnvironment, Simulation, SimulationOutput, SolverStats, Summary, ValidationMode,
};
use log::{LevelFilter, info};
use serde::Serialize;

const TRAJECTORY_FILE: &str = "jam_trajectory.csv";
const SUMMARY_FILE: &str = "jam_summary.json";

/// Runs the Junk Accumulation Model for one run envelope.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Run envelope (JSON). Read from stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// TOML configuration, used instead of the envelope's `model.files.config`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reject negative rates and populations, and an undefined Rt.
    #[arg(long)]
    strict: bool,

    #[arg(long, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,
}

#[derive(Debug, Serialize)]
struct Report {
    #[serde(flatten)]
    summary: Summary,
    solver: SolverStats,
    samples: usize,
    digest: String,
}

impl Report {
    fn new(output: &SimulationOutput) -> Option<Self> {
        Some(Report {
            summary: output.summary()?,
            solver: output.stats,
            samples: output.len(),
            digest: output.digest(),
        })
    }
}

fn run(args: Args) -> Result<(), JamError> {
    let mut env = match &args.input {
        Some(path) => RunEnvironment::from_reader(File::open(path)?)?,
        None => RunEnvironment::from_stdin()?,
    };
    if let Some(path) = args.config {
        env.files.insert("config".to_string(), path);
    }

    let mut config = env.config()?;
    if args.strict {
        config.mode = ValidationMode::Strict;
    }

    let output = Simulation::new(config)?.run()?;
    env.write_trajectory(TRAJECTORY_FILE, &output)?;

    let report = Report::new(&output).ok_or_else(|| JamError::Config("empty output".to_string()))?;
    info!(
        "final S = {:.0}, I = {:.0}, R = {:.0}; max Rt = {:.2}, final Rt = {:.2}",
        report.summary.final_s,
        report.summary.final_i,
        report.summary.final_r,
        report.summary.max_rt,
        report.summary.final_rt
    );
    env.write(SUMMARY_FILE, &serde_json::to_vec_pretty(&report)?)?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = logging::init(args.log_level) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
