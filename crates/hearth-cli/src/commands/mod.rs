//! CLI commands

pub mod ask;
pub mod classify;
pub mod status;
