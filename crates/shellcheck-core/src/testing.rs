//! Test doubles shared by the unit tests.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::fetch::{FetchError, FetchRequest, Fetcher};

/// Records every request and writes canned files into the unpack directory.
#[derive(Debug, Default)]
pub(crate) struct RecordingFetcher {
    files: Vec<(PathBuf, Vec<u8>)>,
    failure: Option<String>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl RecordingFetcher {
    pub(crate) fn with_file(relative: &str, bytes: &[u8]) -> Self {
        Self {
            files: vec![(PathBuf::from(relative), bytes.to_vec())],
            ..Self::default()
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for RecordingFetcher {
    async fn fetch_and_extract(&self, request: &FetchRequest) -> Result<(), FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(message) = &self.failure {
            return Err(FetchError::Other(message.clone()));
        }
        for (relative, bytes) in &self.files {
            let path = request.unpack_directory.join(relative);
            tokio::fs::create_dir_all(path.parent().unwrap()).await?;
            tokio::fs::write(&path, bytes).await?;
        }
        Ok(())
    }
}
