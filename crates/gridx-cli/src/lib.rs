//! CLI library components for the grid exchange tool.

pub mod commands;
pub mod logging;
