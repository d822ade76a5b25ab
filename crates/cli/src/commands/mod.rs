//! CLI subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;
pub mod webhook;
