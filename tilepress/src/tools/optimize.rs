use anyhow::Result;
use std::path::PathBuf;
use tilepress::store::optimize;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// MBTiles file
	#[arg()]
	file: PathBuf,

	/// do not run ANALYZE
	#[arg(long)]
	skip_analyze: bool,

	/// do not run VACUUM
	#[arg(long)]
	skip_vacuum: bool,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	optimize(&arguments.file, arguments.skip_analyze, arguments.skip_vacuum)
}
