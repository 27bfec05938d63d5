//! Configuration section definitions.
//!
//! Each module corresponds to a section in `islet.toml`:
//!
//! | Module   | TOML Section | Purpose                                     |
//! |----------|--------------|---------------------------------------------|
//! | `build`  | `[build]`    | Source, temp and output paths, alias map    |
//! | `assets` | `[assets]`   | Entry/bundle rules, partial hydration       |
//! | `search` | `[search]`   | Search index output and hit predicate       |

pub mod assets;
pub mod build;
pub mod search;

pub use assets::{AssetsConfig, EntryPattern, PartialConfig};
pub use build::BuildSectionConfig;
pub use search::{HitConfig, SearchConfig};
