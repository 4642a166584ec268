//! CLI command implementations.

pub mod generate;
pub mod job;
mod output;
pub mod profile;
pub mod templates;
