//! Build error taxonomy.
//!
//! Only [`BuildError::Compile`] aborts a build. Every other variant is
//! collected per page or artifact while sibling work continues, and turns
//! into a nonzero exit at the end.
//!
//! - `Write` is a page file that could not be written
//! - `Artifact` is a build output other than a page: client bundles,
//!   partial metadata, the search index

use std::error::Error as _;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("compile failed")]
    Compile(#[source] anyhow::Error),

    #[error("static data failed for `{}`", page.display())]
    StaticData {
        page: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("render failed for `{}`", page.display())]
    Render {
        page: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to write `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write artifact `{}`", path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl BuildError {
    /// The message followed by every cause, joined with `: `.
    pub fn report(&self) -> String {
        let mut out = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            out.push_str(": ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}
