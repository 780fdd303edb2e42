//! Data structures for pool records and configuration.

pub mod config;
pub mod host;
pub mod token;
