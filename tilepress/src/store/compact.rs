//! Migration of a flat tile store to the content-addressed layout.
//!
//! The engine streams the flat `tiles` table in ascending rowid order using
//! half-open `(lower, upper]` rowid windows, so every source row is visited
//! exactly once regardless of rowid gaps. Per row it optionally runs the
//! transform pipeline, hashes the bytes, deduplicates them into `images` and
//! upserts the coordinate association into `map`. Afterwards the `tiles`
//! table is replaced with a view over the join, so readers keep working
//! unchanged.
//!
//! The run is single-threaded and holds one connection (with an exclusive
//! lock by default) from start to finish. Progress is not checkpointed: an
//! aborted run leaves both layouts on disk, and re-running reprocesses all
//! rows. A store that already has an `images` table is left untouched.

use crate::TransformPipeline;
use crate::store::{MBTiles, Tuning, schema};
use anyhow::{Context, Result};
use r2d2_sqlite::rusqlite::{Connection, Transaction, params};
use sha2::{Digest, Sha256};
use std::{path::Path, time::Instant};
use tilepress_core::progress::ProgressBar;

/// Configuration of one compaction run, with all knobs explicit.
#[derive(Debug, Clone)]
pub struct CompactionConfig {
	/// Rows processed per scan batch. Each batch is read fully into memory
	/// and written in one transaction.
	pub chunk_size: usize,
	/// Optional external pipeline applied to every tile before hashing.
	pub transform: Option<TransformPipeline>,
	/// Connection pragmas for the run.
	pub tuning: Tuning,
	/// Draw a progress bar on stderr.
	pub progress: bool,
}

impl Default for CompactionConfig {
	fn default() -> Self {
		CompactionConfig {
			chunk_size: 100,
			transform: None,
			tuning: Tuning::default(),
			progress: false,
		}
	}
}

/// Running totals of one compaction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactionStats {
	/// Tiles visited.
	pub finished: u64,
	/// Tiles whose content was seen for the first time.
	pub unique: u64,
	/// Tiles whose content hash already existed ("overlapping"); the stored
	/// bytes win and the new bytes are discarded.
	pub duplicate: u64,
}

/// Content address of a tile: the hex digest of its (transformed) bytes.
pub fn tile_digest(data: &[u8]) -> String {
	hex::encode(Sha256::digest(data))
}

/// Migrate a flat MBTiles store to the compacted layout.
///
/// A store that is already compacted is logged and left unchanged; the
/// returned stats are all zero in that case.
pub fn compact(path: &Path, config: &CompactionConfig) -> Result<CompactionStats> {
	log::info!("compacting database '{}'", path.display());

	let db = MBTiles::open(path)?;
	let mut conn = db.conn()?;
	config.tuning.apply(&conn)?;

	if MBTiles::is_compacted_on(&conn)? {
		log::info!("the mbtiles file is already compacted");
		return Ok(CompactionStats::default());
	}

	schema::prepare_compacted(&conn)?;

	let total_tiles: u64 = conn.query_row("SELECT count(zoom_level) FROM tiles", [], |row| row.get(0))?;
	// stable upper bound for the chunked scan, read once up front
	let max_rowid: i64 = conn.query_row("SELECT max(rowid) FROM tiles", [], |row| {
		row.get::<_, Option<i64>>(0)
	})?
	.unwrap_or(0);

	log::debug!("{total_tiles} total tiles, max rowid {max_rowid}");

	let progress = config
		.progress
		.then(|| ProgressBar::new("compacting tiles", total_tiles));
	let start = Instant::now();
	let mut stats = CompactionStats::default();

	let chunk_size = config.chunk_size.max(1) as i64;
	let mut lower = 0i64;
	while lower < max_rowid {
		let upper = lower + chunk_size;
		let rows = read_chunk(&conn, lower, upper)?;
		lower = upper;

		let transaction = conn.transaction()?;
		for row in &rows {
			compact_row(&transaction, row, config.transform.as_ref(), &mut stats)?;

			if stats.finished % 100 == 0 {
				let elapsed = start.elapsed().as_secs_f64().max(f64::EPSILON);
				log::debug!(
					"{} tiles finished, {} unique, {} duplicates ({:.1}% @ {:.1} tiles/sec)",
					stats.finished,
					stats.unique,
					stats.duplicate,
					stats.finished as f64 * 100.0 / total_tiles.max(1) as f64,
					stats.finished as f64 / elapsed
				);
				if let Some(progress) = &progress {
					progress.set_position(stats.finished);
				}
			}
		}
		transaction.commit()?;
	}

	schema::finalize_compacted(&conn)?;

	if let Some(progress) = &progress {
		progress.finish();
	}
	let elapsed = start.elapsed().as_secs_f64().max(f64::EPSILON);
	log::info!(
		"{} tiles finished, {} unique, {} duplicates (100.0% @ {:.1} tiles/sec)",
		stats.finished,
		stats.unique,
		stats.duplicate,
		stats.finished as f64 / elapsed
	);

	Ok(stats)
}

struct TileRow {
	zoom_level: i64,
	tile_column: i64,
	tile_row: i64,
	tile_data: Vec<u8>,
}

/// Read all rows in the half-open rowid window `(lower, upper]`.
fn read_chunk(conn: &Connection, lower: i64, upper: i64) -> Result<Vec<TileRow>> {
	let mut stmt = conn.prepare_cached(
		"SELECT zoom_level, tile_column, tile_row, tile_data FROM tiles WHERE rowid > ?1 AND rowid <= ?2 ORDER BY rowid",
	)?;
	let rows = stmt
		.query_map(params![lower, upper], |row| {
			Ok(TileRow {
				zoom_level: row.get(0)?,
				tile_column: row.get(1)?,
				tile_row: row.get(2)?,
				tile_data: row.get(3)?,
			})
		})?
		.collect::<Result<Vec<_>, _>>()?;
	Ok(rows)
}

/// Dedupe one tile into `images` and upsert its `map` entry.
fn compact_row(
	transaction: &Transaction,
	row: &TileRow,
	transform: Option<&TransformPipeline>,
	stats: &mut CompactionStats,
) -> Result<()> {
	let data = match transform {
		Some(pipeline) => pipeline.apply(&row.tile_data).with_context(|| {
			format!(
				"transforming tile z{} x{} y{}",
				row.zoom_level, row.tile_column, row.tile_row
			)
		})?,
		None => row.tile_data.clone(),
	};
	let tile_id = tile_digest(&data);

	// explicit insert-or-get: an unchanged row count means the hash existed
	// and the already stored bytes win
	let inserted = transaction.execute(
		"INSERT OR IGNORE INTO images (tile_id, tile_data) VALUES (?1, ?2)",
		params![tile_id, data],
	)?;
	if inserted == 0 {
		stats.duplicate += 1;
	} else {
		stats.unique += 1;
	}

	transaction.execute(
		"INSERT OR REPLACE INTO map (zoom_level, tile_column, tile_row, tile_id) VALUES (?1, ?2, ?3, ?4)",
		params![row.zoom_level, row.tile_column, row.tile_row, tile_id],
	)?;

	stats.finished += 1;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn digest_is_deterministic_and_content_sensitive() {
		assert_eq!(tile_digest(b"abc"), tile_digest(b"abc"));
		assert_ne!(tile_digest(b"abc"), tile_digest(b"abd"));
		assert_eq!(tile_digest(b"").len(), 64);
	}

	#[test]
	fn default_config() {
		let config = CompactionConfig::default();
		assert_eq!(config.chunk_size, 100);
		assert!(config.transform.is_none());
		assert!(!config.progress);
	}
}
