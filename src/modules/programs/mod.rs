//! Programs configured through `programs.*`

pub mod bash;
pub mod git;
pub mod hyprland;
pub mod nano;
pub mod vim;
