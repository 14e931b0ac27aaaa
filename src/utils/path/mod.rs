//! Path and URL utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `is_within`)
//! - [`route`]: Slash-normalized relative paths and URL segments

pub mod fs;
pub mod route;

pub use fs::{is_within, normalize_path};
pub use route::{is_lexically_safe, to_slash};
