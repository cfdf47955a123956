pub mod cli;
pub mod config;
pub mod domain;
pub mod editor;
pub mod error;
pub mod generate;
pub mod git;
pub mod project;
pub mod ui;

pub use error::{AttributionError, Result};
