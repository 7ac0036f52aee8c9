//! Database maintenance: ANALYZE and VACUUM.

use crate::store::MBTiles;
use anyhow::Result;
use std::path::Path;

/// Run `ANALYZE` and `VACUUM` on an MBTiles database; either step can be
/// skipped.
pub fn optimize(path: &Path, skip_analyze: bool, skip_vacuum: bool) -> Result<()> {
	let db = MBTiles::open(path)?;
	let conn = db.conn()?;

	if !skip_analyze {
		log::info!("analyzing database");
		conn.execute_batch("ANALYZE")?;
	}
	if !skip_vacuum {
		log::info!("vacuuming database");
		conn.execute_batch("VACUUM")?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_fs::NamedTempFile;

	#[test]
	fn optimize_runs_on_a_fresh_store() -> Result<()> {
		let file = NamedTempFile::new("store.mbtiles")?;
		MBTiles::create(file.path())?;
		optimize(file.path(), false, false)?;
		optimize(file.path(), true, true)?;
		Ok(())
	}
}
