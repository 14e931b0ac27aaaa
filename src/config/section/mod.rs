//! Configuration section definitions.
//!
//! Each module corresponds to a key in `site.json`:
//!
//! | Module  | JSON key | Purpose                                  |
//! |---------|----------|------------------------------------------|
//! | `build` | `build`  | Output dir, minify, passthrough, css     |
//! | `serve` | `serve`  | Development server                       |

pub mod build;
mod serve;

pub use build::BuildSectionConfig;
pub use serve::ServeConfig;
