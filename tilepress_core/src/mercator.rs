//! Web-Mercator (EPSG:3857) projection and tile coverage math.
//!
//! [`Mercator`] converts between geographic coordinates, projected meters,
//! global pixel coordinates and tile addresses, and computes which tiles (or
//! tile ranges) cover a geographic bounding box at a set of zoom levels.
//!
//! Pixel coordinates live on a square raster of `tile_size * 2^level` pixels
//! spanning the globe, with the origin in the north-west corner. They are
//! computed in double precision, rounded to the nearest integer, and only then
//! divided by the tile size (truncating toward zero) to obtain tile indices.
//!
//! # Examples
//!
//! ```
//! use tilepress_core::{GeoBBox, Mercator, TileScheme};
//!
//! let mercator = Mercator::default();
//!
//! let (x, y) = mercator.project(13.4, 52.5);
//! let (lng, lat) = mercator.unproject(x, y);
//! assert!((lng - 13.4).abs() < 1e-6);
//! assert!((lat - 52.5).abs() < 1e-6);
//!
//! let bbox = GeoBBox::new(-180.0, -85.0, 180.0, 85.0).unwrap();
//! let tiles = mercator.tiles_covering(&bbox, &[0], TileScheme::Xyz).unwrap();
//! assert_eq!(tiles.len(), 1);
//! ```

use crate::{GeoBBox, TileCoord, TileScheme};
use anyhow::Result;
use std::{collections::BTreeMap, f64::consts::PI};

/// Mercator y diverges beyond this latitude; inputs are clamped to it.
pub static MAX_MERCATOR_LAT: f64 = 85.05112877980659;
static EARTH_RADIUS: f64 = 6_378_137.0; // meters

/// An inclusive column/row span of tiles at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
	pub x_min: u32,
	pub y_min: u32,
	pub x_max: u32,
	pub y_max: u32,
}

impl TileRange {
	pub fn contains(&self, coord: &TileCoord) -> bool {
		(self.x_min..=self.x_max).contains(&coord.x) && (self.y_min..=self.y_max).contains(&coord.y)
	}

	pub fn count(&self) -> u64 {
		u64::from(self.x_max - self.x_min + 1) * u64::from(self.y_max - self.y_min + 1)
	}
}

/// Web-Mercator projection for a fixed tile edge length in pixels.
#[derive(Debug, Clone, Copy)]
pub struct Mercator {
	tile_size: u32,
}

impl Default for Mercator {
	fn default() -> Self {
		Mercator { tile_size: 256 }
	}
}

impl Mercator {
	pub fn new(tile_size: u32) -> Mercator {
		Mercator { tile_size }
	}

	/// Forward projection from degrees to meters. Latitude is clamped to
	/// ±85.0511287798° before projecting.
	pub fn project(&self, lng: f64, lat: f64) -> (f64, f64) {
		let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
		let x = lng.to_radians() * EARTH_RADIUS;
		let y = (PI / 4.0 + lat.to_radians() / 2.0).tan().ln() * EARTH_RADIUS;
		(x, y)
	}

	/// Inverse of [`project`](Self::project).
	pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
		let lng = (x / EARTH_RADIUS).to_degrees();
		let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
		(lng, lat)
	}

	fn raster_size(&self, level: u8) -> f64 {
		self.tile_size as f64 * 2.0f64.powi(level as i32)
	}

	/// Global pixel coordinate of a geographic position at the given level,
	/// rounded to the nearest integer pixel.
	pub fn pixel(&self, lng: f64, lat: f64, level: u8) -> (i64, i64) {
		let size = self.raster_size(level);
		let half = size / 2.0;
		let px = half + lng * size / 360.0;
		let sin_lat = lat.to_radians().sin().clamp(-0.9999, 0.9999);
		let py = half - 0.5 * ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() * size / (2.0 * PI);
		(px.round() as i64, py.round() as i64)
	}

	fn unpixel(&self, px: f64, py: f64, level: u8) -> (f64, f64) {
		let size = self.raster_size(level);
		let half = size / 2.0;
		let lng = (px - half) * 360.0 / size;
		let g = (half - py) * 2.0 * PI / size;
		let lat = (2.0 * g.exp().atan() - PI / 2.0).to_degrees();
		(lng, lat)
	}

	/// The tile containing a geographic position, in XYZ row numbering.
	pub fn tile_at(&self, level: u8, lng: f64, lat: f64) -> Result<TileCoord> {
		let (px, py) = self.pixel(lng, lat, level);
		let ts = self.tile_size as i64;
		TileCoord::new(level, (px / ts) as u32, (py / ts) as u32)
	}

	/// Geographic bounds `(west, south, east, north)` of one tile cell, in XYZ
	/// row numbering.
	pub fn tile_bounds(&self, coord: &TileCoord) -> Result<GeoBBox> {
		let ts = self.tile_size as f64;
		let (west, south) = self.unpixel(coord.x as f64 * ts, (coord.y + 1) as f64 * ts, coord.level);
		let (east, north) = self.unpixel((coord.x + 1) as f64 * ts, coord.y as f64 * ts, coord.level);
		GeoBBox::new(west, south, east, north)
	}

	/// Pixel-space column/row span of `bbox` at `level`, clipped to the valid
	/// `[0, 2^level)` range per axis. `None` when the box misses the world.
	fn span(&self, bbox: &GeoBBox, level: u8) -> Option<TileRange> {
		let ts = self.tile_size as i64;
		let (px0, py0) = self.pixel(bbox.x_min, bbox.y_max, level); // north-west
		let (px1, py1) = self.pixel(bbox.x_max, bbox.y_min, level); // south-east

		let max_index = 2i64.pow(level as u32) - 1;
		let x_min = (px0 / ts).max(0);
		let x_max = (px1 / ts).min(max_index);
		let y_min = (py0 / ts).max(0);
		let y_max = (py1 / ts).min(max_index);

		if x_min > x_max || y_min > y_max {
			return None;
		}
		Some(TileRange {
			x_min: x_min as u32,
			y_min: y_min as u32,
			x_max: x_max as u32,
			y_max: y_max as u32,
		})
	}

	/// All tiles covering `bbox` at each of the requested levels.
	///
	/// Rows are flipped to south-up numbering when `scheme` is
	/// [`TileScheme::Tms`].
	pub fn tiles_covering(&self, bbox: &GeoBBox, levels: &[u8], scheme: TileScheme) -> Result<Vec<TileCoord>> {
		log::trace!("tiles_covering {bbox:?} at levels {levels:?} ({scheme})");

		let mut tiles = Vec::new();
		for &level in levels {
			let Some(range) = self.span(bbox, level) else {
				continue;
			};
			for x in range.x_min..=range.x_max {
				for y in range.y_min..=range.y_max {
					let coord = TileCoord::new(level, x, y)?;
					tiles.push(match scheme {
						TileScheme::Xyz => coord,
						TileScheme::Tms => coord.flipped_y(),
					});
				}
			}
		}
		Ok(tiles)
	}

	/// Per-level column/row ranges covering `bbox`, used to prune unrelated
	/// coordinates in bulk before itemized processing.
	///
	/// The ranges enclose exactly the tiles returned by
	/// [`tiles_covering`](Self::tiles_covering): inclusive, clipped, and with
	/// the row endpoints flipped (and re-sorted ascending) for
	/// [`TileScheme::Tms`]. Levels whose span is empty are omitted.
	pub fn tile_ranges(&self, bbox: &GeoBBox, levels: &[u8], scheme: TileScheme) -> Result<BTreeMap<u8, TileRange>> {
		log::trace!("tile_ranges {bbox:?} at levels {levels:?} ({scheme})");

		let mut ranges = BTreeMap::new();
		for &level in levels {
			let Some(mut range) = self.span(bbox, level) else {
				continue;
			};
			if scheme == TileScheme::Tms {
				let max_index = 2u32.pow(level as u32) - 1;
				(range.y_min, range.y_max) = (max_index - range.y_max, max_index - range.y_min);
			}
			ranges.insert(level, range);
		}
		Ok(ranges)
	}
}
