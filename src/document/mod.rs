//! Document tree: files, option blocks, assets and their persistence

pub mod asset;
pub mod block;
pub mod file;
pub mod persist;

pub use asset::Asset;
pub use block::OptionBlock;
pub use file::{Import, NixFile};
pub use persist::{ModularizationLevel, SavedFile};
