use anyhow::{Result, ensure};
use std::fmt::Debug;

/// A geographical bounding box defined by its minimum and maximum longitude
/// (x) and latitude (y) coordinates, in degrees.
///
/// Construction validates the box: longitudes must stay within ±180°,
/// latitudes within ±90°, and both minima must be strictly smaller than the
/// corresponding maxima. Operations that consume a `GeoBBox` can therefore
/// rely on it being well formed.
///
/// # Examples
///
/// ```
/// use tilepress_core::GeoBBox;
///
/// let bbox = GeoBBox::new(-10.0, -5.0, 10.0, 5.0).unwrap();
/// assert_eq!(bbox.as_tuple(), (-10.0, -5.0, 10.0, 5.0));
///
/// assert!(GeoBBox::new(-181.0, 0.0, 10.0, 10.0).is_err());
/// assert!(GeoBBox::new(10.0, 0.0, -5.0, 10.0).is_err());
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct GeoBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl GeoBBox {
	/// Creates a new `GeoBBox` from `west, south, east, north`.
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<GeoBBox> {
		GeoBBox {
			x_min,
			y_min,
			x_max,
			y_max,
		}
		.checked()
	}

	fn checked(self) -> Result<GeoBBox> {
		ensure!(
			self.x_min.abs() <= 180.0 && self.x_max.abs() <= 180.0,
			"bounding box longitudes must be within [-180, 180], got [{}, {}]",
			self.x_min,
			self.x_max
		);
		ensure!(
			self.y_min.abs() <= 90.0 && self.y_max.abs() <= 90.0,
			"bounding box latitudes must be within [-90, 90], got [{}, {}]",
			self.y_min,
			self.y_max
		);
		ensure!(
			self.x_min < self.x_max && self.y_min < self.y_max,
			"bounding box must be (xmin, ymin, xmax, ymax) with min < max, got [{}, {}, {}, {}]",
			self.x_min,
			self.y_min,
			self.x_max,
			self.y_max
		);
		Ok(self)
	}

	/// Returns the bounding box as a tuple `(x_min, y_min, x_max, y_max)`.
	pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
		(self.x_min, self.y_min, self.x_max, self.y_max)
	}

	/// Returns the bounding box as `[west, south, east, north]`.
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}

	/// Returns the bounding box as a string `x_min,y_min,x_max,y_max`.
	pub fn as_string_list(&self) -> String {
		format!("{},{},{},{}", self.x_min, self.y_min, self.x_max, self.y_max)
	}
}

impl TryFrom<Vec<f64>> for GeoBBox {
	type Error = anyhow::Error;

	fn try_from(input: Vec<f64>) -> Result<Self> {
		ensure!(
			input.len() == 4,
			"bounding box must have 4 components, got {}",
			input.len()
		);
		GeoBBox::new(input[0], input[1], input[2], input[3])
	}
}

impl Debug for GeoBBox {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_fmt(format_args!(
			"GeoBBox[{}, {}, {}, {}]",
			self.x_min, self.y_min, self.x_max, self.y_max
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn new_valid() {
		let bbox = GeoBBox::new(-10.0, -5.0, 10.0, 5.0).unwrap();
		assert_eq!(bbox.as_array(), [-10.0, -5.0, 10.0, 5.0]);
		assert_eq!(bbox.as_string_list(), "-10,-5,10,5");
		assert_eq!(format!("{bbox:?}"), "GeoBBox[-10, -5, 10, 5]");
	}

	#[rstest]
	#[case(-181.0, 0.0, 10.0, 10.0, "longitudes")]
	#[case(0.0, 0.0, 180.5, 10.0, "longitudes")]
	#[case(0.0, -91.0, 10.0, 10.0, "latitudes")]
	#[case(0.0, 0.0, 10.0, 90.1, "latitudes")]
	#[case(10.0, 0.0, -5.0, 10.0, "min < max")]
	#[case(0.0, 10.0, 10.0, 0.0, "min < max")]
	#[case(5.0, 0.0, 5.0, 10.0, "min < max")]
	fn new_invalid(#[case] x0: f64, #[case] y0: f64, #[case] x1: f64, #[case] y1: f64, #[case] msg: &str) {
		let error = GeoBBox::new(x0, y0, x1, y1).unwrap_err().to_string();
		assert!(error.contains(msg), "{error:?} should mention {msg:?}");
	}

	#[test]
	fn try_from_vec() {
		let bbox = GeoBBox::try_from(vec![-10.0, -5.0, 10.0, 5.0]).unwrap();
		assert_eq!(bbox.as_tuple(), (-10.0, -5.0, 10.0, 5.0));

		assert_eq!(
			GeoBBox::try_from(vec![1.0, 2.0, 3.0]).unwrap_err().to_string(),
			"bounding box must have 4 components, got 3"
		);
	}
}
