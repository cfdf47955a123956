//! Command-line workflows built on the library.

pub mod orchestration;

pub use orchestration::{ReleaseOutcome, ReleaseState, ReleaseWorkflow};
