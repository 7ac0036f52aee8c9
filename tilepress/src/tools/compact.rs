use anyhow::Result;
use std::path::PathBuf;
use tilepress::store::{CompactionConfig, JournalMode, TransformPipeline, Tuning, compact};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// MBTiles file with a flat `tiles` table
	#[arg()]
	file: PathBuf,

	/// number of tiles processed per scan batch
	#[arg(long, value_name = "int", default_value_t = 100, display_order = 1)]
	chunk_size: usize,

	/// run a command on every tile before hashing; `{}` is replaced with the
	/// tile scratch file (repeatable, executed in order)
	#[arg(long = "exec", value_name = "CMD", display_order = 1)]
	exec: Vec<String>,

	/// scratch directory for transform intermediate files
	#[arg(long, value_name = "DIR", display_order = 1)]
	tmp_dir: Option<PathBuf>,

	/// use a write-ahead journal instead of the rollback journal
	#[arg(long, display_order = 2)]
	wal: bool,

	/// set `PRAGMA synchronous = OFF` (faster, less durable)
	#[arg(long, display_order = 2)]
	synchronous_off: bool,

	/// do not take an exclusive lock on the database
	#[arg(long, display_order = 2)]
	no_exclusive_lock: bool,

	/// do not draw a progress bar
	#[arg(long, display_order = 3)]
	no_progress: bool,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let config = CompactionConfig {
		chunk_size: arguments.chunk_size,
		transform: (!arguments.exec.is_empty())
			.then(|| TransformPipeline::new(arguments.exec.clone(), arguments.tmp_dir.clone())),
		tuning: Tuning {
			journal_mode: if arguments.wal { JournalMode::Wal } else { JournalMode::Delete },
			synchronous_off: arguments.synchronous_off,
			exclusive_lock: !arguments.no_exclusive_lock,
		},
		progress: !arguments.no_progress,
	};

	let stats = compact(&arguments.file, &config)?;

	eprintln!(
		"{} tiles finished, {} unique, {} duplicates",
		stats.finished, stats.unique, stats.duplicate
	);
	Ok(())
}
