//! # embed-cli
//!
//! Command-line front end for the embedding providers: argument parsing and config loading.

pub mod cli;

pub use cli::{execute, load_config, Cli, Commands};
