//! Command-line interface for media-minder.
//!
//! This module provides CLI commands for inspecting taxonomies, validating
//! sidecar files and downloading artwork.

mod commands;

pub use commands::{Cli, Commands, run_command};
