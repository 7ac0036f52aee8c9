//! External per-tile transform pipeline.
//!
//! Each tile's bytes are written to a scratch file, every configured command
//! is run on that file in order (via `sh -c`), and the file's final content
//! replaces the tile. Commands are synchronous and have no timeout; a hung
//! command stalls the whole migration.

use anyhow::{Context, Result, ensure};
use std::{
	fs,
	io::Write,
	path::PathBuf,
	process::{Command, Stdio},
};

/// An ordered list of shell commands applied to every tile.
///
/// Every `{}` in a command is replaced with the scratch file path; a command
/// without `{}` gets the path appended as its last argument. Each command must
/// rewrite the file in place and exit with status zero.
#[derive(Debug, Clone, Default)]
pub struct TransformPipeline {
	commands: Vec<String>,
	temp_dir: Option<PathBuf>,
}

impl TransformPipeline {
	pub fn new(commands: Vec<String>, temp_dir: Option<PathBuf>) -> TransformPipeline {
		TransformPipeline { commands, temp_dir }
	}

	pub fn is_empty(&self) -> bool {
		self.commands.is_empty()
	}

	/// Run the pipeline on one tile's bytes and return the replacement bytes.
	pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
		let dir = match &self.temp_dir {
			Some(dir) => {
				fs::create_dir_all(dir).with_context(|| format!("creating scratch directory {dir:?}"))?;
				dir.clone()
			}
			None => std::env::temp_dir(),
		};

		let mut file = tempfile::Builder::new()
			.prefix("tile_")
			.tempfile_in(&dir)
			.context("creating tile scratch file")?;
		file.write_all(data)?;
		file.flush()?;

		let path = file.path().display().to_string();
		for command in &self.commands {
			let line = if command.contains("{}") {
				command.replace("{}", &path)
			} else {
				format!("{command} {path}")
			};
			log::trace!("running transform: {line}");

			let status = Command::new("sh")
				.arg("-c")
				.arg(&line)
				.stdin(Stdio::null())
				.status()
				.with_context(|| format!("spawning transform command '{line}'"))?;
			ensure!(status.success(), "transform command '{line}' failed with {status}");
		}

		Ok(fs::read(file.path())?)
	}
}
