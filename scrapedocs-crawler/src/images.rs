use crate::fetcher::Fetcher;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_IMAGE_EXTENSION: &str = ".png";

/// Outcome of making one image available locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    /// The hash-named file was already on disk; nothing was fetched.
    Cached,
    /// Fetched and written, with the number of bytes.
    Downloaded(u64),
    /// Fetch failed; the reference points at a file that does not exist.
    Failed(String),
    /// Already handled earlier in this run.
    Seen,
}

/// Extension of the last path segment, the way `name.ext` splits: leading dots
/// belong to the name.
fn path_extension(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next()?;
    let dot = name.rfind('.')?;
    if name[..dot].chars().all(|c| c == '.') {
        return None;
    }
    Some(&name[dot..])
}

fn sanitize_extension(ext: &str) -> String {
    ext.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
        .collect()
}

/// `md5(url)` in hex plus the sanitized original extension.
pub fn cache_file_name(url: &Url) -> String {
    let hash = format!("{:x}", md5::compute(url.as_str().as_bytes()));
    let ext = path_extension(url.path())
        .map(sanitize_extension)
        .filter(|ext| ext.len() > 1)
        .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string());

    format!("{}{}", hash, ext)
}

/// Content-addressed store of downloaded images. Files are never evicted.
#[derive(Debug)]
pub struct ImageCache {
    dir: PathBuf,
    relative_dir: String,
    seen: HashSet<String>,
}

impl ImageCache {
    /// `dir` is where files are written; `relative_dir` is how the Markdown
    /// document refers to that directory.
    pub fn new(dir: impl Into<PathBuf>, relative_dir: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            relative_dir: relative_dir.into(),
            seen: HashSet::new(),
        }
    }

    pub fn ensure_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    pub fn local_path(&self, url: &Url) -> PathBuf {
        self.dir.join(cache_file_name(url))
    }

    /// Path written into the document, always `/`-separated.
    pub fn relative_path(&self, url: &Url) -> String {
        let file_name = cache_file_name(url);
        let prefix = self.relative_dir.trim_end_matches(['/', '\\']);
        if prefix.is_empty() {
            file_name
        } else {
            format!("{}/{}", prefix, file_name)
        }
    }

    pub fn is_cached(&self, url: &Url) -> bool {
        self.local_path(url).exists()
    }

    /// Make `url` available at its cache path, fetching it at most once per run.
    pub async fn materialize(&mut self, fetcher: &Fetcher, url: &Url) -> ImageStatus {
        if !self.seen.insert(url.to_string()) {
            return ImageStatus::Seen;
        }

        let dest = self.local_path(url);
        if dest.exists() {
            debug!("Image already cached: {}", dest.display());
            return ImageStatus::Cached;
        }

        info!("Downloading image: {}", url);
        match fetcher.download(url, &dest).await {
            Ok(bytes) => ImageStatus::Downloaded(bytes),
            Err(e) => {
                warn!("Error downloading image {}: {}", url, e);
                ImageStatus::Failed(e.to_string())
            }
        }
    }
}
