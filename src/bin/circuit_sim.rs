//! `circuit-sim <FILE> [--cycles N] [--monitor NAME]... [-v|-q]`
//!
//! Compiles a circuit description, runs a fixed number of cycles, and prints a monitor table.
//! The only I/O-performing, environment-reading part of this crate — the library itself never
//! reads the environment or a file directly; both are handled here and threaded in.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use circuit_sim::config::Config;
use circuit_sim::simulator::{CompileOutcome, Simulator};

#[derive(Parser, Debug)]
#[command(author, version, about = "Compiles and runs a digital logic circuit description")]
struct Args {
    /// Path to a circuit description file.
    file: PathBuf,

    /// Number of cycles to run after a successful compile.
    #[arg(long)]
    cycles: Option<usize>,

    /// Add a monitor point beyond those declared in the file's own MONITOR block.
    #[arg(long = "monitor", value_name = "NAME")]
    monitors: Vec<String>,

    /// Raise log verbosity (repeatable).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Lower log verbosity to warnings and errors only.
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let config = Config::from_env();
    init_logging(&config, args.verbose, args.quiet);

    tracing::info!(file = %args.file.display(), "compiling circuit");
    let mut simulator = match Simulator::compile(&args.file, config.max_settle_iterations) {
        Ok(simulator) => simulator,
        Err(CompileOutcome::Io { path, source }) => {
            return Err(source).with_context(|| format!("reading {}", path.display()));
        }
        Err(outcome @ CompileOutcome::Diagnostics { .. }) => {
            print!("{}", outcome.render());
            return Ok(ExitCode::FAILURE);
        }
    };

    for name in &args.monitors {
        simulator
            .add_monitor(name)
            .with_context(|| format!("adding monitor on {name}"))?;
    }

    simulator.cold_startup();
    let cycles = args.cycles.unwrap_or(config.default_cycles);
    tracing::info!(cycles, "running circuit");
    for cycle in 0..cycles {
        if !simulator.execute_cycle() {
            eprintln!("circuit failed to settle on cycle {cycle}: oscillation detected");
            return Ok(ExitCode::FAILURE);
        }
    }

    print_monitor_table(&simulator);
    Ok(ExitCode::SUCCESS)
}

fn init_logging(config: &Config, verbose: u8, quiet: bool) {
    let directive = if quiet {
        "warn".to_string()
    } else {
        match verbose {
            0 => config.log_filter.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(directive))
        .with_writer(std::io::stderr)
        .init();
}

fn print_monitor_table(simulator: &Simulator) {
    let margin = simulator.margin();
    let names = simulator.monitored_signals();
    if names.is_empty() {
        println!("(no monitored signals)");
        return;
    }
    let histories: Vec<_> = names.iter().map(|name| simulator.monitor_history(name).unwrap_or(&[])).collect();
    for (name, history) in names.iter().zip(&histories) {
        print!("{name:<margin$}");
        for level in history.iter() {
            print!(" {}", format_level(*level));
        }
        println!();
    }
}

fn format_level(level: circuit_sim::devices::SignalLevel) -> &'static str {
    use circuit_sim::devices::SignalLevel;
    match level {
        SignalLevel::Low => "0",
        SignalLevel::High => "1",
        SignalLevel::Rising => "/",
        SignalLevel::Falling => "\\",
        SignalLevel::Blank => ".",
    }
}
