use crate::error::{CrawlError, Result};
use reqwest::{Client, Response, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// HTTP access for pages and images: one GET per call, never retried.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let timeout = Duration::from_secs(timeout_secs.max(1));
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(timeout / 2)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    /// Fetch a page body. Any non-2xx status is an error; the body is always
    /// decoded as UTF-8.
    pub async fn fetch_page(&self, url: &Url) -> Result<String> {
        debug!("Fetching {}", url);

        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Stream a resource to `dest`. Only `200 OK` counts as success. The body
    /// lands in a `.part` sibling first so a broken transfer leaves no file at
    /// `dest`.
    pub async fn download(&self, url: &Url, dest: &Path) -> Result<u64> {
        debug!("Downloading {} -> {}", url, dest.display());

        let mut response = self.client.get(url.as_str()).send().await?;
        if response.status() != StatusCode::OK {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let partial = dest.with_extension(partial_extension(dest));
        let mut file = File::create(&partial).await?;

        match stream_to_file(&mut response, &mut file).await {
            Ok(written) => {
                drop(file);
                fs::rename(&partial, dest).await?;
                Ok(written)
            }
            Err(e) => {
                drop(file);
                let _ = fs::remove_file(&partial).await;
                Err(e)
            }
        }
    }
}

async fn stream_to_file(response: &mut Response, file: &mut File) -> Result<u64> {
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

fn partial_extension(dest: &Path) -> String {
    match dest.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.part", ext),
        None => "part".to_string(),
    }
}
