//! Path and URL utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`)
//! - [`route`]: URL and route helpers (`route_pathname`, `to_slash`, `is_external_link`)

pub mod fs;
pub mod route;

pub use fs::normalize_path;
pub use route::{is_external_link, route_pathname, to_slash};
