//! Hook system for build automation.
//!
//! This module provides:
//! - `runner`: Hook execution utilities (environment variables, command execution)
//! - `css`: CSS toolchain integration run by the styles stage

pub mod css;
mod runner;

pub use runner::*;
