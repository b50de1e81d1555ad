//! Upstream dataset fetching.
//!
//! Fetching is an offline pipeline step: it downloads a catalog document,
//! verifies it parses, and writes it to disk with a provenance manifest.
//! Nothing here runs during catalog builds or lookups.

use crate::catalog::SnapshotDocument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_UPSTREAM_URL: &str = "https://models.dev/api.json";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("upstream payload is not a valid catalog document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Provenance record written next to a fetched dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchManifest {
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    pub sha256: String,
    pub bytes: u64,
}

#[derive(Debug)]
pub struct FetchResult {
    pub document: SnapshotDocument,
    pub manifest: FetchManifest,
    raw: Vec<u8>,
}

fn create_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Download a catalog document from `url`. The payload must parse as a
/// document before anything is returned, so a garbage upstream never reaches
/// disk.
pub async fn fetch_upstream(url: &str) -> Result<FetchResult, FetchError> {
    let client = create_http_client();
    debug!("fetching catalog dataset from {url}");
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Status { status, body });
    }
    let raw = response.bytes().await?.to_vec();
    let document: SnapshotDocument = serde_json::from_slice(&raw)?;
    let manifest = FetchManifest {
        url: url.to_string(),
        fetched_at: Utc::now(),
        sha256: sha256_hex(&raw),
        bytes: raw.len() as u64,
    };
    Ok(FetchResult {
        document,
        manifest,
        raw,
    })
}

/// Write the fetched dataset and its manifest into `dir`, returning the data
/// path and the manifest path. The dataset is written byte-for-byte as
/// fetched so the manifest digest stays valid.
pub fn write_fetch(dir: &Path, result: &FetchResult) -> Result<(PathBuf, PathBuf), FetchError> {
    std::fs::create_dir_all(dir)?;
    let data_path = dir.join("models.json");
    std::fs::write(&data_path, &result.raw)?;
    let manifest_path = dir.join("manifest.json");
    std::fs::write(&manifest_path, serde_json::to_vec_pretty(&result.manifest)?)?;
    Ok((data_path, manifest_path))
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
