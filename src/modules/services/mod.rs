//! System services

pub mod cosmic_greeter;
pub mod desktop;
pub mod gdm;
pub mod plasma_login;
pub mod sddm;
