//! Accounts and groups

pub mod accounts;
pub mod groups;
