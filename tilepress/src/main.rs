mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{ErrorLevel, Verbosity};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<ErrorLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Deduplicate tile content into a content-addressed schema
	Compact(tools::compact::Subcommand),

	/// Run ANALYZE and VACUUM on an MBTiles database
	Optimize(tools::optimize::Subcommand),

	/// List the tiles covering a bounding box
	Tiles(tools::tiles::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	match &cli.command {
		Commands::Compact(arguments) => tools::compact::run(arguments),
		Commands::Optimize(arguments) => tools::optimize::run(arguments),
		Commands::Tiles(arguments) => tools::tiles::run(arguments),
	}
}

#[cfg(test)]
mod tests {
	use crate::{Cli, run};
	use anyhow::Result;
	use clap::Parser;

	pub fn run_command(arg_vec: Vec<&str>) -> Result<String> {
		let cli = Cli::try_parse_from(arg_vec)?;
		let msg = format!("{:?}", cli);
		run(cli)?;
		Ok(msg)
	}

	#[test]
	fn help() {
		let err = run_command(vec!["tilepress"]).unwrap_err().to_string();
		assert!(err.starts_with("A toolbox for compacting and maintaining MBTiles tile archives."));
		assert!(err.contains("\nUsage: tilepress [OPTIONS] <COMMAND>"));
	}

	#[test]
	fn version() {
		let err = run_command(vec!["tilepress", "-V"]).unwrap_err().to_string();
		assert!(err.starts_with("tilepress "));
	}

	#[test]
	fn compact_subcommand() {
		let output = run_command(vec!["tilepress", "compact"]).unwrap_err().to_string();
		assert!(output.starts_with("Deduplicate tile content into a content-addressed schema"));
	}

	#[test]
	fn optimize_subcommand() {
		let output = run_command(vec!["tilepress", "optimize"]).unwrap_err().to_string();
		assert!(output.starts_with("Run ANALYZE and VACUUM on an MBTiles database"));
	}

	#[test]
	fn tiles_subcommand() {
		let output = run_command(vec!["tilepress", "tiles"]).unwrap_err().to_string();
		assert!(output.starts_with("List the tiles covering a bounding box"));
	}

	#[test]
	fn tiles_enumerates_the_world() -> Result<()> {
		run_command(vec!["tilepress", "tiles", "-180,-85,180,85", "--max-zoom", "1"])?;
		Ok(())
	}
}
