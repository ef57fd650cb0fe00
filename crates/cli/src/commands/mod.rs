//! CLI subcommand implementations.

pub mod migrate;
