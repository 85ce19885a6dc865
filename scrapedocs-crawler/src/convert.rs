use crate::error::{CrawlError, Result};
use crate::images::ImageCache;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;
use tracing::{error, warn};
use url::Url;

pub const DEFAULT_CONTENT_SELECTOR: &str = "main";
pub const DEFAULT_TITLE: &str = "index";

/// Sites append their name after this, e.g. `Install | Acme Docs`.
const TITLE_SEPARATOR: char = '|';

/// Zero-width space, raw and as its UTF-8 bytes misread as Latin-1.
const ARTIFACTS: &[&str] = &["\u{200b}", "\u{e2}\u{80}\u{8b}"];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const DROPPED_ELEMENTS: &[&str] = &["script", "style"];

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("static body selector"));
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("static title selector"));

/// The content region of a page, ready for Markdown conversion.
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    pub title: String,
    /// Region markup with absolute links and local image paths.
    pub html: String,
    /// Absolute image URLs in document order.
    pub images: Vec<Url>,
}

pub struct ContentConverter {
    selector: Selector,
    selector_source: String,
}

impl ContentConverter {
    pub fn new(selector: &str) -> Result<Self> {
        let parsed = Selector::parse(selector)
            .map_err(|e| CrawlError::Selector(format!("'{}': {}", selector, e)))?;

        Ok(Self {
            selector: parsed,
            selector_source: selector.to_string(),
        })
    }

    /// Select the content region, falling back to `<body>`, and rewrite its
    /// references. `None` when the page has neither.
    pub fn extract(&self, html: &str, page_url: &Url, cache: &ImageCache) -> Option<ExtractedPage> {
        let document = Html::parse_document(html);

        let region = match document.select(&self.selector).next() {
            Some(region) => region,
            None => {
                warn!(
                    "Selector '{}' not found for {}. Falling back to 'body'.",
                    self.selector_source, page_url
                );
                match document.select(&BODY_SELECTOR).next() {
                    Some(body) => body,
                    None => {
                        error!("Could not find any content element for {}.", page_url);
                        return None;
                    }
                }
            }
        };

        let mut rewriter = Rewriter {
            page_url,
            cache,
            images: Vec::new(),
            out: String::with_capacity(html.len()),
        };
        rewriter.write_element(region);

        Some(ExtractedPage {
            title: page_title(&document),
            html: rewriter.out,
            images: rewriter.images,
        })
    }

    /// Extract and render in one step.
    pub fn convert(
        &self,
        html: &str,
        page_url: &Url,
        cache: &ImageCache,
    ) -> Result<(ExtractedPage, String)> {
        let page = self
            .extract(html, page_url, cache)
            .ok_or_else(|| CrawlError::NoContent(page_url.to_string()))?;
        let markdown = render_markdown(&page.title, page_url, &page.html);
        Ok((page, markdown))
    }
}

impl Default for ContentConverter {
    fn default() -> Self {
        Self {
            selector: Selector::parse(DEFAULT_CONTENT_SELECTOR).expect("static content selector"),
            selector_source: DEFAULT_CONTENT_SELECTOR.to_string(),
        }
    }
}

/// `<title>` text up to the site-name separator, or `index`.
pub fn page_title(document: &Html) -> String {
    let raw: String = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|title| title.text().collect())
        .unwrap_or_default();

    let title = raw
        .split(TITLE_SEPARATOR)
        .next()
        .unwrap_or_default()
        .trim();

    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title.to_string()
    }
}

pub fn clean_artifacts(html: &str) -> String {
    ARTIFACTS
        .iter()
        .fold(html.to_string(), |acc, artifact| acc.replace(artifact, ""))
}

/// One page block: heading, source URL, rule, then the converted region.
pub fn render_markdown(title: &str, page_url: &Url, region_html: &str) -> String {
    let body = html2md::parse_html(&clean_artifacts(region_html));
    format!(
        "# {}\n\n[Original URL: {}]\n\n---\n\n{}\n\n",
        title, page_url, body
    )
}

struct Rewriter<'a> {
    page_url: &'a Url,
    cache: &'a ImageCache,
    images: Vec<Url>,
    out: String,
}

impl Rewriter<'_> {
    fn write_element(&mut self, el: ElementRef<'_>) {
        let element = el.value();
        let name = element.name();
        if DROPPED_ELEMENTS.contains(&name) {
            return;
        }

        self.out.push('<');
        self.out.push_str(name);
        for (attr, value) in element.attrs() {
            let value = match (name, attr) {
                ("a", "href") => self.absolute_link(value),
                ("img", "src") => self.local_image(value),
                _ => value.to_string(),
            };
            self.out.push(' ');
            self.out.push_str(attr);
            self.out.push_str("=\"");
            self.out.push_str(&escape_attr(&value));
            self.out.push('"');
        }
        self.out.push('>');

        if VOID_ELEMENTS.contains(&name) {
            return;
        }

        for child in el.children() {
            match child.value() {
                Node::Text(text) => self.out.push_str(&escape_text(&text.text)),
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        self.write_element(child_el);
                    }
                }
                _ => {}
            }
        }

        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn absolute_link(&self, href: &str) -> String {
        self.page_url
            .join(href.trim())
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string())
    }

    fn local_image(&mut self, src: &str) -> String {
        match self.page_url.join(src.trim()) {
            Ok(image_url) if matches!(image_url.scheme(), "http" | "https") => {
                let local = self.cache.relative_path(&image_url);
                self.images.push(image_url);
                local
            }
            // data: URIs and unparseable sources stay as they are
            _ => src.to_string(),
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
