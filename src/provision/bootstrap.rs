//! Bootstrap archive retrieval and extraction
//!
//! The pinned virtualenv release is fetched once into the durable cache and
//! reused by every later provision.

use crate::config::Config;
use crate::error::{BootenvError, BootenvResult};
use crate::layout::ProjectLayout;
use crate::process::Invocation;
use crate::ui::DownloadProgress;
use async_trait::async_trait;
use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Retrieves a URL into a local file
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `url` to `dest`, returning the number of bytes written
    async fn fetch(&self, url: &str, dest: &Path) -> BootenvResult<u64>;
}

/// Plain HTTP(S) fetcher
pub struct HttpFetcher {
    show_progress: bool,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(show_progress: bool) -> Self {
        Self {
            show_progress,
            timeout: Duration::from_secs(300),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> BootenvResult<u64> {
        let url = url.to_string();
        let dest = dest.to_path_buf();
        let show_progress = self.show_progress;
        let timeout = self.timeout;

        tokio::task::spawn_blocking(move || download(&url, &dest, show_progress, timeout))
            .await
            .map_err(|e| BootenvError::Internal(format!("download task failed: {}", e)))?
    }
}

fn download(url: &str, dest: &Path, show_progress: bool, timeout: Duration) -> BootenvResult<u64> {
    let fetch_err = |reason: String| BootenvError::Fetch {
        url: url.to_string(),
        reason,
    };

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into();

    let mut response = agent.get(url).call().map_err(|e| fetch_err(e.to_string()))?;

    let total = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let mut file = File::create(dest)
        .map_err(|e| BootenvError::io(format!("creating {}", dest.display()), e))?;

    let progress = DownloadProgress::new(show_progress, total);
    let mut reader = progress.wrap(response.body_mut().as_reader());
    let written = io::copy(&mut reader, &mut file).map_err(|e| fetch_err(e.to_string()))?;
    progress.finish();

    debug!("Downloaded {} bytes from {}", written, url);
    Ok(written)
}

/// SHA-256 of a file (hex), hashed off the async runtime
pub async fn file_sha256(path: &Path) -> BootenvResult<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || hash_file(&path))
        .await
        .map_err(|e| BootenvError::Internal(format!("hash task failed: {}", e)))?
}

fn hash_file(path: &Path) -> BootenvResult<String> {
    let mut file = File::open(path)
        .map_err(|e| BootenvError::io(format!("opening {}", path.display()), e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .map_err(|e| BootenvError::io(format!("reading {}", path.display()), e))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Make sure the bootstrap archive is in the cache, fetching it if absent
pub async fn ensure_archive(
    fetcher: &dyn Fetcher,
    layout: &ProjectLayout,
    config: &Config,
) -> BootenvResult<PathBuf> {
    let archive = layout.archive_path(config);
    if tokio::fs::metadata(&archive).await.is_ok_and(|m| m.is_file()) {
        debug!("Using cached bootstrap archive {}", archive.display());
        return Ok(archive);
    }

    tokio::fs::create_dir_all(&layout.bootstrap_cache)
        .await
        .map_err(|e| {
            BootenvError::io(
                format!("creating directory {}", layout.bootstrap_cache.display()),
                e,
            )
        })?;

    let url = config.bootstrap.archive_url();
    let partial = layout
        .bootstrap_cache
        .join(format!("{}.part", config.bootstrap.archive_name()));

    info!("Fetching {}", url);
    if let Err(e) = fetch_verified(fetcher, &url, &partial, config.bootstrap.sha256.as_deref()).await
    {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e);
    }

    tokio::fs::rename(&partial, &archive)
        .await
        .map_err(|e| BootenvError::io(format!("moving archive to {}", archive.display()), e))?;

    Ok(archive)
}

async fn fetch_verified(
    fetcher: &dyn Fetcher,
    url: &str,
    dest: &Path,
    expected: Option<&str>,
) -> BootenvResult<()> {
    fetcher.fetch(url, dest).await?;

    if let Some(expected) = expected {
        let actual = file_sha256(dest).await?;
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(BootenvError::ChecksumMismatch {
                path: dest.to_path_buf(),
                expected: expected.to_string(),
                actual,
            });
        }
    }

    Ok(())
}

/// Extract the archive next to itself and return the bootstrap script path
pub async fn extract(layout: &ProjectLayout, config: &Config, archive: &Path) -> BootenvResult<PathBuf> {
    let archive = archive.to_path_buf();
    let into = layout.bootstrap_cache.clone();
    let source = layout.bootstrap_source(config);
    let script = source.join(&config.bootstrap.script);

    tokio::task::spawn_blocking(move || unpack(&archive, &into, &source, &script))
        .await
        .map_err(|e| BootenvError::Internal(format!("extract task failed: {}", e)))?
}

fn unpack(archive: &Path, into: &Path, source: &Path, script: &Path) -> BootenvResult<PathBuf> {
    let extract_err = |reason: String| BootenvError::Extract {
        archive: archive.to_path_buf(),
        reason,
    };

    if source.exists() {
        fs::remove_dir_all(source)
            .map_err(|e| BootenvError::io(format!("removing {}", source.display()), e))?;
    }

    let file = File::open(archive)
        .map_err(|e| BootenvError::io(format!("opening {}", archive.display()), e))?;
    tar::Archive::new(GzDecoder::new(file))
        .unpack(into)
        .map_err(|e| extract_err(e.to_string()))?;

    if !script.is_file() {
        return Err(extract_err(format!(
            "archive does not contain {}",
            script.strip_prefix(into).unwrap_or(script).display()
        )));
    }

    debug!("Extracted {} into {}", archive.display(), into.display());
    Ok(script.to_path_buf())
}

/// Invocation that creates the package root from the bootstrap script
pub fn create_invocation(layout: &ProjectLayout, config: &Config, script: &Path) -> Invocation {
    Invocation::new(&config.bootstrap.python, &layout.root)
        .arg(script)
        .args(&config.bootstrap.args)
        .arg(&layout.package_root)
}
