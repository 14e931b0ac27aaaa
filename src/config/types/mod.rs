//! Configuration utility types.
//!
//! | Module  | Purpose                                  |
//! |---------|------------------------------------------|
//! | `error` | Configuration errors and diagnostics     |

mod error;

pub use error::{ConfigDiagnostics, ConfigError};
