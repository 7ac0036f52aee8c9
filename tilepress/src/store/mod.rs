//! Access to MBTiles (SQLite) databases.
//!
//! [`MBTiles`] wraps a connection pool over one database file and offers the
//! operations the rest of the crate needs: schema detection, tile and metadata
//! access, and connection tuning pragmas. Tile coordinates pass through
//! verbatim; row-numbering schemes are an import/export-time concern and are
//! never applied here.

mod compact;
pub use compact::*;

mod optimize;
pub use optimize::*;

pub(crate) mod schema;

mod transform;
pub use transform::*;

use anyhow::{Context, Result, ensure};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::{
	SqliteConnectionManager,
	rusqlite::{Connection, OptionalExtension, params},
};
use std::path::Path;
use tilepress_core::TileCoord;

/// Journal mode applied when opening a store for compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JournalMode {
	/// The default rollback journal.
	#[default]
	Delete,
	/// Write-ahead logging.
	Wal,
}

/// Connection tuning pragmas, applied once per compaction run.
#[derive(Debug, Clone)]
pub struct Tuning {
	pub journal_mode: JournalMode,
	/// Sets `PRAGMA synchronous = OFF`: faster, but a crash can corrupt the file.
	pub synchronous_off: bool,
	/// Takes `PRAGMA locking_mode = EXCLUSIVE` to keep concurrent writers out.
	pub exclusive_lock: bool,
}

impl Default for Tuning {
	fn default() -> Self {
		Tuning {
			journal_mode: JournalMode::Delete,
			synchronous_off: false,
			exclusive_lock: true,
		}
	}
}

impl Tuning {
	/// Apply the pragmas to one connection. They stay attached to that
	/// connection, so callers must run their work on the same handle.
	pub fn apply(&self, conn: &Connection) -> Result<()> {
		conn.pragma_update(None, "cache_size", 40000)?;
		conn.pragma_update(None, "temp_store", "memory")?;
		match self.journal_mode {
			JournalMode::Delete => conn.pragma_update(None, "journal_mode", "DELETE")?,
			JournalMode::Wal => conn.pragma_update(None, "journal_mode", "WAL")?,
		}
		if self.exclusive_lock {
			conn.pragma_update(None, "locking_mode", "EXCLUSIVE")?;
		}
		if self.synchronous_off {
			conn.pragma_update(None, "synchronous", "OFF")?;
		}
		Ok(())
	}
}

/// Handle on one MBTiles database file.
pub struct MBTiles {
	name: String,
	pool: Pool<SqliteConnectionManager>,
}

impl MBTiles {
	/// Open an existing MBTiles database.
	pub fn open(path: &Path) -> Result<MBTiles> {
		log::debug!("open {path:?}");
		ensure!(path.exists(), "file {path:?} does not exist");
		MBTiles::connect(path)
	}

	/// Create a new, empty MBTiles database with the flat layout.
	pub fn create(path: &Path) -> Result<MBTiles> {
		log::debug!("create {path:?}");
		let store = MBTiles::connect(path)?;
		let conn = store.conn()?;
		schema::setup_flat(&conn)?;
		Ok(store)
	}

	fn connect(path: &Path) -> Result<MBTiles> {
		let manager = SqliteConnectionManager::file(path);
		let pool = Pool::builder()
			.max_size(10)
			.build(manager)
			.with_context(|| format!("connecting to {path:?}"))?;
		Ok(MBTiles {
			name: path.display().to_string(),
			pool,
		})
	}

	pub(crate) fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
		Ok(self.pool.get()?)
	}

	/// A store is compacted iff an `images` table exists.
	pub fn is_compacted(&self) -> Result<bool> {
		let conn = self.conn()?;
		Self::is_compacted_on(&conn)
	}

	pub(crate) fn is_compacted_on(conn: &Connection) -> Result<bool> {
		let count: u32 = conn.query_row(
			"SELECT count(name) FROM sqlite_master WHERE type = 'table' AND name = 'images'",
			[],
			|row| row.get(0),
		)?;
		Ok(count > 0)
	}

	/// Number of tile rows, read through the table or the view identically.
	pub fn count_tiles(&self) -> Result<u64> {
		Ok(
			self
				.conn()?
				.query_row("SELECT count(zoom_level) FROM tiles", [], |row| row.get(0))?,
		)
	}

	/// Fetch one tile blob by its stored coordinate. No row flipping.
	pub fn get_tile(&self, coord: &TileCoord) -> Result<Option<Vec<u8>>> {
		log::trace!("read tile at {coord:?} from '{}'", self.name);
		let conn = self.conn()?;
		let mut stmt =
			conn.prepare("SELECT tile_data FROM tiles WHERE tile_column = ?1 AND tile_row = ?2 AND zoom_level = ?3")?;
		Ok(
			stmt
				.query_row(params![coord.x, coord.y, coord.level], |row| row.get(0))
				.optional()?,
		)
	}

	/// Insert tiles with their coordinates stored verbatim, in one transaction.
	pub fn put_tiles(&self, tiles: &[(TileCoord, Vec<u8>)]) -> Result<()> {
		let mut conn = self.conn()?;
		let transaction = conn.transaction()?;
		for (coord, blob) in tiles {
			transaction.execute(
				"INSERT INTO tiles (zoom_level, tile_column, tile_row, tile_data) VALUES (?1, ?2, ?3, ?4)",
				params![coord.level, coord.x, coord.y, blob.as_slice()],
			)?;
		}
		transaction.commit()?;
		Ok(())
	}

	/// All metadata entries, verbatim.
	pub fn get_metadata(&self) -> Result<Vec<(String, String)>> {
		let conn = self.conn()?;
		let mut stmt = conn.prepare("SELECT name, value FROM metadata ORDER BY name")?;
		let entries = stmt
			.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
			.collect::<Result<Vec<_>, _>>()?;
		Ok(entries)
	}

	/// Insert or replace one metadata entry.
	pub fn set_metadata(&self, name: &str, value: &str) -> Result<()> {
		self.conn()?.execute(
			"INSERT OR REPLACE INTO metadata (name, value) VALUES (?1, ?2)",
			params![name, value],
		)?;
		Ok(())
	}
}

impl std::fmt::Debug for MBTiles {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MBTiles").field("name", &self.name).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_fs::NamedTempFile;

	#[test]
	fn open_requires_an_existing_file() {
		let error = MBTiles::open(Path::new("/no/such/file.mbtiles")).unwrap_err().to_string();
		assert!(error.contains("does not exist"));
	}

	#[test]
	fn create_put_get() -> Result<()> {
		let file = NamedTempFile::new("store.mbtiles")?;
		let store = MBTiles::create(file.path())?;

		assert!(!store.is_compacted()?);
		assert_eq!(store.count_tiles()?, 0);

		let coord = TileCoord::new(3, 2, 1)?;
		store.put_tiles(&[(coord, vec![1, 2, 3])])?;
		assert_eq!(store.count_tiles()?, 1);
		assert_eq!(store.get_tile(&coord)?, Some(vec![1, 2, 3]));
		assert_eq!(store.get_tile(&TileCoord::new(3, 1, 2)?)?, None);

		Ok(())
	}

	#[test]
	fn metadata_round_trip() -> Result<()> {
		let file = NamedTempFile::new("store.mbtiles")?;
		let store = MBTiles::create(file.path())?;

		store.set_metadata("name", "test")?;
		store.set_metadata("bounds", "-180,-85,180,85")?;
		store.set_metadata("name", "renamed")?;

		assert_eq!(
			store.get_metadata()?,
			vec![
				("bounds".to_string(), "-180,-85,180,85".to_string()),
				("name".to_string(), "renamed".to_string()),
			]
		);
		Ok(())
	}

	#[test]
	fn duplicate_coordinates_are_rejected() -> Result<()> {
		let file = NamedTempFile::new("store.mbtiles")?;
		let store = MBTiles::create(file.path())?;

		let coord = TileCoord::new(1, 0, 0)?;
		store.put_tiles(&[(coord, vec![1])])?;
		assert!(store.put_tiles(&[(coord, vec![2])]).is_err());
		Ok(())
	}

	#[test]
	fn tuning_pragmas_apply() -> Result<()> {
		let file = NamedTempFile::new("store.mbtiles")?;
		let store = MBTiles::create(file.path())?;
		let conn = store.conn()?;

		Tuning {
			journal_mode: JournalMode::Wal,
			synchronous_off: true,
			exclusive_lock: false,
		}
		.apply(&conn)?;

		let mode: String = conn.pragma_query_value(None, "journal_mode", |row| row.get(0))?;
		assert_eq!(mode.to_ascii_lowercase(), "wal");
		let synchronous: i64 = conn.pragma_query_value(None, "synchronous", |row| row.get(0))?;
		assert_eq!(synchronous, 0);
		Ok(())
	}
}
