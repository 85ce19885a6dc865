use crate::document::Document;
use crate::output::RunLayout;
use indicatif::{ProgressBar, ProgressStyle};
use scrapedocs_crawler::crawler::DEFAULT_DELAY;
use scrapedocs_crawler::fetcher::DEFAULT_TIMEOUT_SECS;
use scrapedocs_crawler::{
    ContentConverter, Crawler, FailedPage, Fetcher, ImageCache, ImageStats, ProgressCallback,
    Result,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub url: String,
    pub selector: String,
    pub layout: RunLayout,
    pub timeout_secs: u64,
    pub delay: Duration,
    pub max_pages: Option<usize>,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(url: impl Into<String>, layout: RunLayout) -> Self {
        Self {
            url: url.into(),
            selector: scrapedocs_crawler::convert::DEFAULT_CONTENT_SELECTOR.to_string(),
            layout,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            delay: DEFAULT_DELAY,
            max_pages: None,
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub output_path: PathBuf,
    pub titles: Vec<String>,
    pub failures: Vec<FailedPage>,
    pub images: ImageStats,
    pub visited: usize,
}

impl CrawlSummary {
    pub fn pages_written(&self) -> usize {
        self.titles.len()
    }
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Crawl the site, then write the combined document once at the end.
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlSummary> {
    let CrawlOptions {
        url,
        selector,
        layout,
        timeout_secs,
        delay,
        max_pages,
        show_progress_bars,
    } = options;

    let converter = ContentConverter::new(&selector)?;
    let images = ImageCache::new(layout.images_path(), layout.images_dir_name.clone());
    let fetcher = Fetcher::with_timeout(timeout_secs)?;

    // Set up single progress bar for overall crawl progress (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let internal_progress_callback: ProgressCallback = {
        let pb_clone = progress_bar.clone();
        let callback_clone = progress_callback.clone();
        Arc::new(move |count: usize, url: String| {
            if let Some(ref pb) = pb_clone {
                pb.set_message(format!("[{}] {}", count, extract_url_path(&url)));
            }
            if let Some(ref callback) = callback_clone {
                callback(format!("Processing link: {}", url));
            }
        })
    };

    let crawler = Crawler::with_fetcher(&url, images, fetcher)?
        .with_converter(converter)
        .with_delay(delay)
        .with_max_pages(max_pages)
        .with_progress_callback(internal_progress_callback);

    layout.prepare()?;
    info!("Output directory: {}", layout.run_dir.display());
    info!("Output file: {}", layout.output_file);

    let report = crawler.crawl().await?;

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!(
            "Crawl complete! {} pages converted",
            report.pages.len()
        ));
    }

    let titles = report.titles().into_iter().map(str::to_string).collect();
    let document: Document = report.pages.into_iter().collect();
    let output_path = layout.output_path();
    document.write_to(&output_path)?;
    info!("Documentation saved to '{}'", output_path.display());

    Ok(CrawlSummary {
        output_path,
        titles,
        failures: report.failures,
        images: report.images,
        visited: report.visited,
    })
}
