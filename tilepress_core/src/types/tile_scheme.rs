//! This module defines the `TileScheme` enum, the closed set of supported row
//! numbering schemes, with parsing and display support.
//!
//! # Examples
//!
//! ```
//! use tilepress_core::TileScheme;
//!
//! assert_eq!("tms".parse::<TileScheme>().unwrap(), TileScheme::Tms);
//! assert_eq!("wmts".parse::<TileScheme>().unwrap(), TileScheme::Xyz);
//! assert_eq!(TileScheme::Xyz.to_string(), "xyz");
//! ```

use anyhow::bail;
use std::{fmt::Display, str::FromStr};

/// Row numbering scheme for tile addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileScheme {
	/// Rows count from the north (top) edge. Also known as WMTS or "slippy map".
	Xyz,
	/// Rows count from the south (bottom) edge, as stored in MBTiles.
	Tms,
}

impl TileScheme {
	pub fn as_str(&self) -> &str {
		match self {
			TileScheme::Xyz => "xyz",
			TileScheme::Tms => "tms",
		}
	}
}

impl FromStr for TileScheme {
	type Err = anyhow::Error;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		Ok(match value.to_ascii_lowercase().as_str() {
			"xyz" | "wmts" => TileScheme::Xyz,
			"tms" => TileScheme::Tms,
			_ => bail!("unknown tile scheme '{value}', expected 'xyz' or 'tms'"),
		})
	}
}

impl Display for TileScheme {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse() {
		assert_eq!("xyz".parse::<TileScheme>().unwrap(), TileScheme::Xyz);
		assert_eq!("WMTS".parse::<TileScheme>().unwrap(), TileScheme::Xyz);
		assert_eq!("tms".parse::<TileScheme>().unwrap(), TileScheme::Tms);
		assert_eq!(
			"ags".parse::<TileScheme>().unwrap_err().to_string(),
			"unknown tile scheme 'ags', expected 'xyz' or 'tms'"
		);
	}

	#[test]
	fn display() {
		assert_eq!(TileScheme::Xyz.to_string(), "xyz");
		assert_eq!(TileScheme::Tms.to_string(), "tms");
	}
}
