//! Shared helpers used across the build pipeline and dev server.

pub mod exec;
pub mod hash;
pub mod html;
pub mod http;
pub mod mime;
pub mod path;
pub mod plural;

pub use plural::plural_count;
