//! Utility modules shared across build stages.

pub mod html;
pub mod path;
mod plural;
pub mod sort;

pub use plural::plural_count;
