pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{options_from_matches, parse_root_url, parse_url_line};

// Re-export crawl functionality from scrapedocs-core
pub use scrapedocs_core::crawl::{CrawlOptions, CrawlSummary, execute_crawl};
pub use scrapedocs_core::report::generate_crawl_report;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
