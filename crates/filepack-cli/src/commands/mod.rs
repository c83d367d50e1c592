//! Subcommand implementations.

pub mod add;
pub mod completion;
pub mod compress;
pub mod extract;
pub mod info;
pub mod list;
pub mod remove;
