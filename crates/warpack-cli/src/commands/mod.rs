//! CLI commands

pub mod package;
pub mod plan;
