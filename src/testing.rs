//! Test doubles for the tool and fetch seams

use crate::config::Config;
use crate::error::{BootenvError, BootenvResult};
use crate::process::{Invocation, ToolRunner};
use crate::provision::Fetcher;
use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::path::Path;
use std::sync::Mutex;

type Handler = Box<dyn Fn(&Invocation) -> i32 + Send + Sync>;

/// Records every invocation and answers with a scripted exit code
pub struct RecordingRunner {
    handler: Handler,
    calls: Mutex<Vec<Invocation>>,
}

impl RecordingRunner {
    pub fn new(handler: impl Fn(&Invocation) -> i32 + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every tool succeeds
    pub fn succeeding() -> Self {
        Self::new(|_| 0)
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Tool names in call order
    pub fn tools(&self) -> Vec<String> {
        self.invocations().iter().map(Invocation::tool_name).collect()
    }
}

#[async_trait]
impl ToolRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> BootenvResult<i32> {
        self.calls.lock().unwrap().push(invocation.clone());
        Ok((self.handler)(invocation))
    }
}

/// Serves fixed bytes for every URL, or fails
pub struct StubFetcher {
    body: Option<Vec<u8>>,
    urls: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body: Some(body),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            body: None,
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> BootenvResult<u64> {
        self.urls.lock().unwrap().push(url.to_string());
        match &self.body {
            Some(body) => {
                std::fs::write(dest, body).map_err(|e| BootenvError::io("writing stub", e))?;
                Ok(body.len() as u64)
            }
            None => Err(BootenvError::Fetch {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

/// A gzipped tarball shaped like a virtualenv source release
pub fn bootstrap_archive(config: &Config) -> Vec<u8> {
    let script = b"import sys\nsys.exit(0)\n";
    let path = format!(
        "{}/{}",
        config.bootstrap.source_dir_name(),
        config.bootstrap.script
    );

    let mut header = tar::Header::new_gnu();
    header.set_size(script.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();

    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    builder
        .append_data(&mut header, path, &script[..])
        .unwrap();
    builder.into_inner().unwrap().finish().unwrap()
}
