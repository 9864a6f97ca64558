pub mod rtkit;
pub mod sudo;
