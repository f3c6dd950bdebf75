//! World orchestration: terrain regeneration and per-frame water cameras.

pub mod config;
pub mod orchestrator;

pub use config::*;
pub use orchestrator::*;
