// Combined offline document: table of contents followed by every page block

use scrapedocs_crawler::PageRecord;
use std::fs;
use std::io;
use std::path::Path;

pub const TOC_HEADER: &str = "# Table of Contents\n";
const SEPARATOR: &str = "\n\n---\n\n";

/// Anchor for a title: lowercase, keep word characters, whitespace and `-`,
/// then each space becomes `-`. Duplicate titles give duplicate slugs.
pub fn slugify(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    kept.trim().replace(' ', "-")
}

/// Pages in crawl-visit order.
#[derive(Debug, Default)]
pub struct Document {
    pages: Vec<PageRecord>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, page: PageRecord) {
        self.pages.push(page);
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn table_of_contents(&self) -> String {
        let mut lines = vec![TOC_HEADER.to_string()];
        for page in &self.pages {
            lines.push(format!("* [{}](#{})", page.title, slugify(&page.title)));
        }
        lines.join("\n")
    }

    pub fn render(&self) -> String {
        let blocks: Vec<&str> = self.pages.iter().map(|p| p.markdown.as_str()).collect();
        format!("{}{}{}", self.table_of_contents(), SEPARATOR, blocks.join("\n"))
    }

    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.render())
    }
}

impl FromIterator<PageRecord> for Document {
    fn from_iter<I: IntoIterator<Item = PageRecord>>(iter: I) -> Self {
        Self {
            pages: iter.into_iter().collect(),
        }
    }
}
