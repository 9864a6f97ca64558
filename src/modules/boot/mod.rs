//! Boot loader modules

pub mod grub;
