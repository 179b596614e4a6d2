//! Text sidecar files written next to downloaded images.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::CrawlError;

/// Name of the per-album metadata file.
pub const METADATA_FILE: &str = "album-metadata.txt";

/// Stem of [`METADATA_FILE`]; reserved so no image description overwrites it.
pub(crate) const METADATA_STEM: &str = "album-metadata";

/// Writes `album-metadata.txt` into `folder`.
pub(crate) async fn write_album_metadata(
    folder: &Path,
    title: &str,
    album_id: &str,
    description: Option<&str>,
) -> Result<PathBuf, CrawlError> {
    let path = folder.join(METADATA_FILE);
    let contents = format!(
        "Title: {title}\nAlbum ID: {album_id}\nDescription: {}\n",
        description.unwrap_or_default()
    );
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| CrawlError::io(&path, e))?;
    debug!(path = %path.display(), "wrote album metadata");
    Ok(path)
}

/// Writes an image's title and description to `path`.
pub(crate) async fn write_image_description(
    path: &Path,
    title: &str,
    description: &str,
) -> Result<(), CrawlError> {
    let contents = format!("Title: {title}\nDescription: {description}\n");
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| CrawlError::io(path, e))?;
    debug!(path = %path.display(), "wrote image description");
    Ok(())
}
