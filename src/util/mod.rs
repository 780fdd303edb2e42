//! Collaborators around the core: obfuscation, prompts, signals, filesystem.

pub mod fs;
pub mod obfuscate;
pub mod prompt;
pub mod signal;
