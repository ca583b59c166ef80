//! Typed access to the Assistants v2 resources: assistants, threads,
//! messages and runs.

pub mod assistants;
pub use assistants::*;

pub mod messages;
pub mod runs;
pub mod threads;
