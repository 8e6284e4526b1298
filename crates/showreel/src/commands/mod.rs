//! Subcommand implementations

pub mod scroll;
pub mod tilt;
pub mod visualize;
