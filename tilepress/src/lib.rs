//! MBTiles storage: the SQLite-backed container, its two on-disk layouts, and
//! the compaction engine that migrates between them.

pub mod store;

pub use store::*;
