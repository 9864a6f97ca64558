//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ScribeError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &ScribeError) -> String {
    match e {
        ScribeError::Context(inner) if inner.is_elevation_request() => format!(
            "{}\nRe-run with --sudo, or --interactive to be asked.",
            inner
        ),
        _ => e.to_string(),
    }
}
