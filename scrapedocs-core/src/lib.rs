pub mod crawl;
pub mod document;
pub mod output;
pub mod report;

pub use crawl::{CrawlOptions, CrawlProgressCallback, CrawlSummary, execute_crawl};
pub use document::{Document, slugify};
pub use output::RunLayout;
