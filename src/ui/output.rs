//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Results go to stdout, diagnostics to stderr. Output respects the quiet
//! flag; when `--json` is enabled, results are a single JSON document.

use std::fmt::Display;

use anyhow::{Context as _, Result};
use serde::Serialize;

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - no result output
    Quiet,
    /// Normal mode - human-readable output
    Normal,
    /// JSON mode - one JSON document per command
    Json,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, json: bool) -> Self {
        if json {
            Verbosity::Json
        } else if quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a command result.
///
/// `text` is used in normal mode, `value` is serialized in JSON mode, and
/// nothing is printed in quiet mode.
pub fn report<T: Serialize>(verbosity: Verbosity, text: impl Display, value: &T) -> Result<()> {
    match verbosity {
        Verbosity::Quiet => {}
        Verbosity::Normal => println!("{}", text),
        Verbosity::Json => println!("{}", to_json(value)?),
    }
    Ok(())
}

/// Serialize a result as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("Error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}
