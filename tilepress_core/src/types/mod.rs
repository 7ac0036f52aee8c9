//! Coordinate, bounding box and scheme types shared across the workspace.

mod geo_bbox;
pub use geo_bbox::*;

mod tile_coord;
pub use tile_coord::*;

mod tile_scheme;
pub use tile_scheme::*;
