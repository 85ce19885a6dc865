/// One converted page, kept in memory until the combined document is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    /// Full Markdown block: heading, original URL line, rule and body.
    pub markdown: String,
}

/// A page that was visited but produced no Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPage {
    pub url: String,
    pub error: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageStats {
    pub downloaded: usize,
    pub cached: usize,
    pub failed: usize,
}

impl ImageStats {
    pub fn total(&self) -> usize {
        self.downloaded + self.cached + self.failed
    }
}

/// Everything a finished crawl hands back, in visit order.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub pages: Vec<PageRecord>,
    pub failures: Vec<FailedPage>,
    pub images: ImageStats,
    pub visited: usize,
}

impl CrawlReport {
    pub fn titles(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.title.as_str()).collect()
    }
}
