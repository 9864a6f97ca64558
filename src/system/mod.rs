//! The scanned system: file access, commands and unit state

pub mod context;
pub mod path;
pub mod units;

pub use context::{SystemAccess, SystemContext};
pub use units::UnitState;
