// Run directory layout: <output-dir>/<run>/<file>.md and <output-dir>/<run>/<images>/

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_IMAGES_DIR: &str = "images";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Local time formatted for directory and file names.
pub fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Name of the per-run subdirectory.
pub fn run_dir_name(timestamp: &str, run_name: Option<&str>, append_to_timestamp: bool) -> String {
    match run_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) if append_to_timestamp => format!("{}_{}", timestamp, name),
        Some(name) => name.to_string(),
        None => timestamp.to_string(),
    }
}

pub fn default_output_file(timestamp: &str) -> String {
    format!("scrapedocs_{}.md", timestamp)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    pub run_dir: PathBuf,
    pub output_file: String,
    pub images_dir_name: String,
}

impl RunLayout {
    pub fn new(
        output_dir: impl AsRef<Path>,
        run_dir_name: &str,
        output_file: impl Into<String>,
        images_dir_name: impl Into<String>,
    ) -> Self {
        Self {
            run_dir: output_dir.as_ref().join(run_dir_name),
            output_file: output_file.into(),
            images_dir_name: images_dir_name.into(),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.run_dir.join(&self.output_file)
    }

    pub fn images_path(&self) -> PathBuf {
        self.run_dir.join(&self.images_dir_name)
    }

    /// Create the run and images directories.
    pub fn prepare(&self) -> io::Result<()> {
        fs::create_dir_all(&self.run_dir)?;
        fs::create_dir_all(self.images_path())
    }
}
