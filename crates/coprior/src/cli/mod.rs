//! CLI command implementations.

pub mod compute;
pub mod config;
pub mod inspect;
