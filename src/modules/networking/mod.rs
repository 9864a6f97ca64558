//! Networking modules

pub mod base;
pub mod networkmanager;
