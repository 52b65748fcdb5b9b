//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All command results go through this module so quiet and JSON modes
//! behave the same for every command.

pub mod output;
