//! Core building blocks for working with MBTiles archives: tile coordinates,
//! geographic bounding boxes, tiling schemes, Web-Mercator math and a terminal
//! progress bar.

pub mod mercator;

pub mod progress;

pub mod types;

pub use mercator::*;
pub use types::*;
