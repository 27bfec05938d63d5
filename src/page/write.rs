//! Page output.

use crate::error::BuildError;
use std::path::Path;

/// Write one rendered page, creating parent directories.
pub async fn write_page(out_file: &Path, html: &str) -> Result<(), BuildError> {
    let write = async {
        if let Some(parent) = out_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(out_file, html).await
    };
    write.await.map_err(|source| BuildError::Write {
        path: out_file.to_path_buf(),
        source,
    })
}
