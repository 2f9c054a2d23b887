//! CLI command implementations.

pub mod bands;
pub mod common;
pub mod config;
pub mod derive;
pub mod generate;
pub mod stream;
