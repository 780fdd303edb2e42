//! Core logic: record codec, pools, token index, and token lifecycle.

pub mod codec;
pub mod config;
pub mod error;
pub mod file_lock;
pub mod lifecycle;
pub mod paths;
pub mod pool;
pub mod pools;
pub mod token_index;
