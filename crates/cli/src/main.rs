//! `jsbridge` command line tool.
//!
//! * `jsbridge replay <scenario.toml>` drives a bridge through a scripted
//!   sequence of host and script-side events and prints the wire traffic
//! * `jsbridge format <function> [argument]` prints the instruction a call
//!   would be submitted as

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use jsbridge_core::wire::{self, Instruction};
use jsbridge_core::{BridgeConfig, CallId};
use tracing::info;

mod replay;
mod scenario;

use scenario::Scenario;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "jsbridge")]
#[command(about = "Inspect and replay host/script bridge traffic")]
struct Args {
	/// Verbose logging
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Replay a scenario file and print every injection, instruction and completion
	Replay {
		/// Scenario file
		scenario: PathBuf,

		/// Bridge config file; replaces the scenario's [config] table
		#[arg(short, long, value_name = "PATH")]
		config: Option<PathBuf>,
	},
	/// Print the instruction string for one call
	Format {
		/// Script-side function name
		function: String,

		/// Pre-serialized argument, embedded verbatim
		argument: Option<String>,

		/// Call identifier to embed
		#[arg(long, default_value_t = 1)]
		id: u64,
	},
}

fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	match args.command {
		Command::Replay { scenario, config } => run_replay(&scenario, config.as_deref()),
		Command::Format { function, argument, id } => {
			let id = CallId::new(id).context("call identifiers start at 1")?;
			let argument = wire::normalize_argument(argument, wire::EMPTY_ARGUMENT);
			println!("{}", Instruction::call(&function, id, &argument));
			Ok(())
		}
	}
}

fn run_replay(scenario_path: &Path, config_path: Option<&Path>) -> anyhow::Result<()> {
	let source = std::fs::read_to_string(scenario_path).with_context(|| format!("reading {}", scenario_path.display()))?;
	let scenario = Scenario::from_toml_str(&source).with_context(|| format!("parsing {}", scenario_path.display()))?;

	let config = match config_path {
		Some(path) => {
			let source = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
			BridgeConfig::from_toml_str(&source).with_context(|| format!("parsing {}", path.display()))?
		}
		None => scenario.config.clone().unwrap_or_default(),
	};

	info!(scenario = %scenario_path.display(), steps = scenario.steps.len(), "replaying scenario");
	for line in replay::replay(&scenario, config)? {
		println!("{line}");
	}
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("jsbridge=trace,info")
		} else {
			EnvFilter::new("jsbridge=info,warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();
}
