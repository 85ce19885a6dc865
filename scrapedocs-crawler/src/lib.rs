pub mod convert;
pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod frontier;
pub mod images;
pub mod links;
pub mod result;

pub use convert::ContentConverter;
pub use crawler::{Crawler, ProgressCallback};
pub use error::{CrawlError, Result};
pub use fetcher::Fetcher;
pub use images::ImageCache;
pub use result::{CrawlReport, FailedPage, ImageStats, PageRecord};
