//! The two on-disk MBTiles layouts and the DDL to move between them.
//!
//! Flat: `tiles (zoom_level, tile_column, tile_row, tile_data)` plus
//! `metadata` and the optional UTFGrid tables `grids` / `grid_data`.
//!
//! Compacted: content-addressed `images (tile_data, tile_id)` plus the
//! coordinate map `map (zoom_level, tile_column, tile_row, tile_id)`, with a
//! `tiles` view joining the two so readers see the flat shape unchanged.

use anyhow::Result;
use r2d2_sqlite::rusqlite::{Connection, OptionalExtension};

/// Create the flat layout in an empty database.
pub(crate) fn setup_flat(conn: &Connection) -> Result<()> {
	conn.execute_batch(
		"CREATE TABLE tiles (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB);
		CREATE TABLE metadata (name TEXT, value TEXT);
		CREATE TABLE grids (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, grid BLOB);
		CREATE TABLE grid_data (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, key_name TEXT, key_json TEXT);
		CREATE UNIQUE INDEX name ON metadata (name);
		CREATE UNIQUE INDEX tile_index ON tiles (zoom_level, tile_column, tile_row);",
	)?;
	Ok(())
}

/// Create the compacted-layout objects next to a still-present `tiles` table,
/// so the source stays queryable throughout the migration. Idempotent.
pub(crate) fn prepare_compacted(conn: &Connection) -> Result<()> {
	conn.pragma_update(None, "page_size", 4096)?;
	conn.execute_batch(
		"CREATE TABLE IF NOT EXISTS images (tile_data BLOB, tile_id TEXT);
		CREATE TABLE IF NOT EXISTS map (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_id TEXT);
		CREATE UNIQUE INDEX IF NOT EXISTS map_index ON map (zoom_level, tile_column, tile_row);
		CREATE UNIQUE INDEX IF NOT EXISTS images_id ON images (tile_id);
		CREATE TABLE IF NOT EXISTS metadata (name TEXT, value TEXT);
		CREATE UNIQUE INDEX IF NOT EXISTS name ON metadata (name);",
	)?;
	Ok(())
}

/// Replace the flat `tiles` table (or a stale view) with the join view over
/// `map` and `images`, and make sure both unique indexes exist.
pub(crate) fn finalize_compacted(conn: &Connection) -> Result<()> {
	match object_type(conn, "tiles")?.as_deref() {
		Some("view") => conn.execute_batch("DROP VIEW tiles;")?,
		Some(_) => conn.execute_batch("DROP TABLE tiles;")?,
		None => {}
	}
	conn.execute_batch(
		"CREATE VIEW tiles AS
			SELECT map.zoom_level AS zoom_level,
				map.tile_column AS tile_column,
				map.tile_row AS tile_row,
				images.tile_data AS tile_data
			FROM map JOIN images ON images.tile_id = map.tile_id;
		CREATE UNIQUE INDEX IF NOT EXISTS map_index ON map (zoom_level, tile_column, tile_row);
		CREATE UNIQUE INDEX IF NOT EXISTS images_id ON images (tile_id);",
	)?;
	Ok(())
}

/// The `sqlite_master` type of a schema object, if it exists.
fn object_type(conn: &Connection, name: &str) -> Result<Option<String>> {
	Ok(
		conn
			.query_row("SELECT type FROM sqlite_master WHERE name = ?1", [name], |row| {
				row.get(0)
			})
			.optional()?,
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn memory_conn() -> Connection {
		Connection::open_in_memory().unwrap()
	}

	#[test]
	fn prepare_is_idempotent() -> Result<()> {
		let conn = memory_conn();
		setup_flat(&conn)?;
		prepare_compacted(&conn)?;
		prepare_compacted(&conn)?;
		assert_eq!(object_type(&conn, "images")?.as_deref(), Some("table"));
		assert_eq!(object_type(&conn, "map")?.as_deref(), Some("table"));
		assert_eq!(object_type(&conn, "tiles")?.as_deref(), Some("table"));
		Ok(())
	}

	#[test]
	fn finalize_replaces_table_with_view() -> Result<()> {
		let conn = memory_conn();
		setup_flat(&conn)?;
		prepare_compacted(&conn)?;
		finalize_compacted(&conn)?;
		assert_eq!(object_type(&conn, "tiles")?.as_deref(), Some("view"));

		// running again replaces the stale view
		finalize_compacted(&conn)?;
		assert_eq!(object_type(&conn, "tiles")?.as_deref(), Some("view"));
		Ok(())
	}

	#[test]
	fn missing_object_reports_none() -> Result<()> {
		let conn = memory_conn();
		assert_eq!(object_type(&conn, "tiles")?, None);
		Ok(())
	}
}
