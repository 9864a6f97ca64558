//! Nix value model and text rendering

pub mod quote;
pub mod value;
pub mod writer;

pub use quote::{quote_key, quote_string};
pub use value::{nix_with, with_pkgs, AttrSet, Value};
pub use writer::{NixWriter, WriterOptions};
