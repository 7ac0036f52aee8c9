pub mod compact;
pub mod optimize;
pub mod tiles;
