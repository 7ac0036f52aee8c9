//! This module defines the `TileCoord` structure, representing one tile address
//! as `(level, column, row)`. It includes methods for creating and validating
//! coordinates and for converting the row between the two supported row
//! numbering schemes.
//!
//! # Examples
//!
//! ```
//! use tilepress_core::TileCoord;
//!
//! let mut coord = TileCoord::new(3, 2, 1).unwrap();
//! assert_eq!(coord.level, 3);
//! assert_eq!(coord.x, 2);
//! assert_eq!(coord.y, 1);
//!
//! // XYZ <-> TMS row conversion
//! coord.flip_y();
//! assert_eq!(coord.y, 6);
//! ```

use anyhow::{Result, ensure};
use std::fmt::{self, Debug};

/// A tile address: zoom `level`, column `x` and row `y`.
///
/// The row numbering scheme (XYZ counts from the north edge, TMS from the
/// south edge) is a property of the surrounding container, not of the
/// coordinate itself; [`flip_y`](TileCoord::flip_y) converts between the two.
#[derive(Eq, PartialEq, Clone, Hash, Copy)]
pub struct TileCoord {
	pub x: u32,
	pub y: u32,
	pub level: u8,
}

impl TileCoord {
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		ensure!(level <= 31, "level ({level}) must be <= 31");
		Ok(TileCoord { x, y, level })
	}

	/// Flip the row between XYZ and TMS numbering: `y' = 2^level - 1 - y`.
	///
	/// The mapping is an involution, flipping twice restores the original row.
	pub fn flip_y(&mut self) {
		let max_index = 2u32.pow(self.level as u32) - 1;
		self.y = max_index - self.y;
	}

	/// Non-mutating version of [`flip_y`](Self::flip_y).
	pub fn flipped_y(mut self) -> TileCoord {
		self.flip_y();
		self
	}

	pub fn is_valid(&self) -> bool {
		let max = 2u32.pow(self.level as u32);
		(self.x < max) && (self.y < max)
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_fmt(format_args!("TileCoord({}, [{}, {}])", &self.level, &self.x, &self.y))
	}
}

impl PartialOrd for TileCoord {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for TileCoord {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self
			.level
			.cmp(&other.level)
			.then(self.y.cmp(&other.y))
			.then(self.x.cmp(&other.x))
	}
}
