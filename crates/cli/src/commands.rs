//! CLI subcommand implementations.

pub mod account;
pub mod trending;
