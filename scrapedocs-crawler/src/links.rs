use crate::frontier::canonicalize;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

/// Path suffixes that are assets rather than documentation pages.
pub const DENYLISTED_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".css", ".js", ".xml", ".rss", ".pdf", ".zip",
];

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static link selector"));

/// Resolve an href against the page it was found on, dropping the fragment.
pub fn resolve_link(page_url: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let resolved = page_url.join(href).ok()?;
    Some(canonicalize(&resolved))
}

pub fn has_denylisted_extension(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    DENYLISTED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn same_site(url: &Url, root: &Url) -> bool {
    match (url.host_str(), root.host_str()) {
        (Some(host), Some(root_host)) => {
            host == root_host && url.port_or_known_default() == root.port_or_known_default()
        }
        _ => false,
    }
}

/// A URL is worth crawling when it is on the root's host and is not an asset.
pub fn is_crawlable(url: &Url, root: &Url) -> bool {
    if url.scheme().is_empty() || !url.has_host() {
        return false;
    }
    same_site(url, root) && !has_denylisted_extension(url)
}

/// Collect crawlable links from a whole page, in document order, without duplicates.
pub fn extract_links(html: &str, page_url: &Url, root: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&LINK_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(absolute_url) = resolve_link(page_url, href) else {
            continue;
        };

        if !is_crawlable(&absolute_url, root) {
            debug!("  -> Skipping {}", absolute_url);
            continue;
        }

        if seen.insert(absolute_url.to_string()) {
            debug!("Found link: {}", absolute_url);
            links.push(absolute_url);
        }
    }

    links
}
