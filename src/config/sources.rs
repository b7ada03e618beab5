//! Configuration file sources, in ascending precedence.

pub mod global_file;
pub mod workspace_file;
