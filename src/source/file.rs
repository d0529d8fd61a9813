//! File-based data source.
//!
//! Reads a JSON array of samples from disk, e.g. a saved response of the
//! `/api/connection-data` endpoint or a previous export's `entries`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{decode_payload, FetchError, Sample, SampleSource};

/// A data source that re-reads a JSON file on every fetch.
///
/// The file is treated exactly like an HTTP response body: it must contain
/// the whole history, and a missing file is a transport failure.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    description: String,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SampleSource for FileSource {
    async fn fetch(&self) -> Result<Vec<Sample>, FetchError> {
        let content = tokio::fs::read(&self.path)
            .await
            .map_err(|e| FetchError::Transport(format!("read error: {}", e)))?;
        decode_payload(&content)
    }

    fn description(&self) -> &str {
        &self.description
    }
}
