use crate::convert::ContentConverter;
use crate::error::{CrawlError, Result};
use crate::fetcher::Fetcher;
use crate::frontier::{Frontier, canonicalize};
use crate::images::{ImageCache, ImageStatus};
use crate::links::extract_links;
use crate::result::{CrawlReport, FailedPage, ImageStats, PageRecord};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Called with the number of pages visited so far and the URL being processed.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// State of one crawl run. Built per run and consumed by [`Crawler::crawl`].
pub struct Crawler {
    root: Url,
    fetcher: Fetcher,
    frontier: Frontier,
    converter: ContentConverter,
    images: ImageCache,
    delay: Duration,
    max_pages: Option<usize>,
    progress_callback: Option<ProgressCallback>,
    report: CrawlReport,
}

impl Crawler {
    pub fn new(start_url: &str, images: ImageCache) -> Result<Self> {
        Self::with_fetcher(start_url, images, Fetcher::new()?)
    }

    pub fn with_fetcher(start_url: &str, images: ImageCache, fetcher: Fetcher) -> Result<Self> {
        let parsed = Url::parse(start_url)?;
        if !parsed.has_host() {
            return Err(CrawlError::InvalidUrl(format!("{}: missing host", start_url)));
        }
        let root = canonicalize(&parsed);

        Ok(Self {
            frontier: Frontier::new(&root),
            root,
            fetcher,
            converter: ContentConverter::default(),
            images,
            delay: DEFAULT_DELAY,
            max_pages: None,
            progress_callback: None,
            report: CrawlReport::default(),
        })
    }

    pub fn with_converter(mut self, converter: ContentConverter) -> Self {
        self.converter = converter;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Run the breadth-first crawl to completion. Pages that fail are logged
    /// and recorded; only image directory setup can fail the whole run.
    pub async fn crawl(mut self) -> Result<CrawlReport> {
        info!("Starting crawl of {}", self.root);
        self.images.ensure_dir()?;

        loop {
            if let Some(limit) = self.max_pages
                && self.frontier.visited_count() >= limit
            {
                info!("Reached page limit of {}", limit);
                break;
            }

            let Some(url) = self.frontier.next() else {
                break;
            };

            info!("Processing link: {}", url);
            if let Some(ref callback) = self.progress_callback {
                callback(self.frontier.visited_count(), url.to_string());
            }

            let html = match self.fetcher.fetch_page(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Error fetching {}: {}", url, e);
                    self.report.failures.push(FailedPage {
                        url: url.to_string(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            self.process_page(&url, &html).await;
            self.enqueue_links(&url, &html);

            tokio::time::sleep(self.delay).await;
        }

        self.report.visited = self.frontier.visited_count();
        info!(
            "Crawl complete. Converted {} of {} pages",
            self.report.pages.len(),
            self.report.visited
        );
        Ok(self.report)
    }

    async fn process_page(&mut self, url: &Url, html: &str) {
        let (page, markdown) = match self.converter.convert(html, url, &self.images) {
            Ok(converted) => converted,
            Err(e) => {
                warn!("An error occurred while processing {}: {}", url, e);
                self.report.failures.push(FailedPage {
                    url: url.to_string(),
                    error: e.to_string(),
                });
                return;
            }
        };

        for image in &page.images {
            let status = self.images.materialize(&self.fetcher, image).await;
            record_image(&mut self.report.images, &status);
        }

        self.report.pages.push(PageRecord {
            url: url.to_string(),
            title: page.title,
            markdown,
        });
    }

    fn enqueue_links(&mut self, url: &Url, html: &str) {
        let mut queued = 0;
        for link in extract_links(html, url, &self.root) {
            if self.frontier.push(&link) {
                queued += 1;
            }
        }
        debug!(
            "Queued {} new links from {} ({} pending)",
            queued,
            url,
            self.frontier.pending()
        );
    }
}

fn record_image(stats: &mut ImageStats, status: &ImageStatus) {
    match status {
        ImageStatus::Cached => stats.cached += 1,
        ImageStatus::Downloaded(_) => stats.downloaded += 1,
        ImageStatus::Failed(_) => stats.failed += 1,
        ImageStatus::Seen => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::cache_file_name;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn html_response(body: String) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/html")
            .set_body_bytes(body.into_bytes())
    }

    async fn mount_page(server: &MockServer, route: &str, body: String, calls: u64) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(html_response(body))
            .expect(calls)
            .mount(server)
            .await;
    }

    fn crawler(server: &MockServer, dir: &TempDir) -> Crawler {
        let images = ImageCache::new(dir.path().join("images"), "images");
        Crawler::new(&server.uri(), images)
            .unwrap()
            .with_delay(Duration::ZERO)
    }

    /// Root links to one in-domain page and one external page.
    #[tokio::test]
    async fn test_two_page_site() {
        let mock_server = MockServer::start().await;
        let root_html = format!(
            r#"<html><head><title>Home | Site</title></head><body><main>
                <a href="{}/guide">Guide</a>
                <a href="https://external.invalid/page">Elsewhere</a>
            </main></body></html>"#,
            mock_server.uri()
        );
        mount_page(&mock_server, "/", root_html, 1).await;
        mount_page(
            &mock_server,
            "/guide",
            "<html><head><title>Guide</title></head><body><main><p>Read me</p></main></body></html>"
                .to_string(),
            1,
        )
        .await;

        let dir = TempDir::new().unwrap();
        let report = crawler(&mock_server, &dir).crawl().await.unwrap();

        assert_eq!(report.titles(), vec!["Home", "Guide"]);
        assert_eq!(report.visited, 2);
        assert!(report.failures.is_empty());
        assert!(report.pages[1].markdown.contains("Read me"));
    }

    #[tokio::test]
    async fn test_fragment_variants_fetched_once() {
        let mock_server = MockServer::start().await;
        let uri = mock_server.uri();
        let root_html = format!(
            r#"<html><body><main>
                <a href="{uri}/page#intro">Intro</a>
                <a href="{uri}/page#usage">Usage</a>
                <a href="/page">Page</a>
            </main></body></html>"#
        );
        let page_html =
            format!(r#"<html><body><main><a href="{uri}/#top">Back</a></main></body></html>"#);
        mount_page(&mock_server, "/", root_html, 1).await;
        mount_page(&mock_server, "/page", page_html, 1).await;

        let dir = TempDir::new().unwrap();
        let report = crawler(&mock_server, &dir).crawl().await.unwrap();

        assert_eq!(report.pages.len(), 2);
        assert_eq!(report.visited, 2);
    }

    #[tokio::test]
    async fn test_pages_are_visited_breadth_first() {
        let mock_server = MockServer::start().await;
        let uri = mock_server.uri();
        mount_page(
            &mock_server,
            "/",
            format!(
                r#"<title>Root</title><main><a href="{uri}/a">A</a><a href="{uri}/b">B</a></main>"#
            ),
            1,
        )
        .await;
        mount_page(
            &mock_server,
            "/a",
            format!(r#"<title>A</title><main><a href="{uri}/a/deep">Deep</a></main>"#),
            1,
        )
        .await;
        mount_page(&mock_server, "/b", "<title>B</title><main>b</main>".to_string(), 1).await;
        mount_page(&mock_server, "/a/deep", "<title>Deep</title><main>d</main>".to_string(), 1)
            .await;

        let dir = TempDir::new().unwrap();
        let report = crawler(&mock_server, &dir).crawl().await.unwrap();

        assert_eq!(report.titles(), vec!["Root", "A", "B", "Deep"]);
    }

    #[tokio::test]
    async fn test_failed_page_is_skipped() {
        let mock_server = MockServer::start().await;
        mount_page(
            &mock_server,
            "/",
            r#"<title>Root</title><main><a href="/gone">Gone</a><a href="/ok">Ok</a></main>"#
                .to_string(),
            1,
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;
        mount_page(&mock_server, "/ok", "<title>Ok</title><main>fine</main>".to_string(), 1).await;

        let dir = TempDir::new().unwrap();
        let report = crawler(&mock_server, &dir).crawl().await.unwrap();

        assert_eq!(report.titles(), vec!["Root", "Ok"]);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].url.ends_with("/gone"));
        assert_eq!(report.visited, 3);
    }

    #[tokio::test]
    async fn test_asset_links_are_not_crawled() {
        let mock_server = MockServer::start().await;
        mount_page(
            &mock_server,
            "/",
            r#"<main><a href="/style.css">css</a><a href="/manual.pdf">pdf</a></main>"#.to_string(),
            1,
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/style.css"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/manual.pdf"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let dir = TempDir::new().unwrap();
        let report = crawler(&mock_server, &dir).crawl().await.unwrap();

        assert_eq!(report.visited, 1);
    }

    #[tokio::test]
    async fn test_image_downloaded_and_rewritten() {
        let mock_server = MockServer::start().await;
        let uri = mock_server.uri();
        mount_page(
            &mock_server,
            "/",
            format!(r#"<title>Pics</title><main><img src="{uri}/a.png" alt="A"></main>"#),
            1,
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/a.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = TempDir::new().unwrap();
        let report = crawler(&mock_server, &dir).crawl().await.unwrap();

        let image_url = Url::parse(&format!("{uri}/a.png")).unwrap();
        let file_name = cache_file_name(&image_url);
        assert_eq!(
            file_name,
            format!("{:x}.png", md5::compute(image_url.as_str().as_bytes()))
        );
        assert!(dir.path().join("images").join(&file_name).exists());
        assert!(report.pages[0].markdown.contains(&format!("images/{}", file_name)));
        assert_eq!(report.images.downloaded, 1);
    }

    #[tokio::test]
    async fn test_cached_images_are_not_redownloaded() {
        let mock_server = MockServer::start().await;
        let uri = mock_server.uri();
        mount_page(
            &mock_server,
            "/",
            r#"<main><img src="/a.png"><img src="/a.png"></main>"#.to_string(),
            1,
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/a.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8]))
            .expect(0)
            .mount(&mock_server)
            .await;

        let dir = TempDir::new().unwrap();
        let images_dir = dir.path().join("images");
        std::fs::create_dir_all(&images_dir).unwrap();
        let image_url = Url::parse(&format!("{uri}/a.png")).unwrap();
        std::fs::write(images_dir.join(cache_file_name(&image_url)), b"old").unwrap();

        let report = crawler(&mock_server, &dir).crawl().await.unwrap();

        assert_eq!(report.images.cached, 1);
        assert_eq!(report.images.downloaded, 0);
    }

    #[tokio::test]
    async fn test_image_failure_keeps_page() {
        let mock_server = MockServer::start().await;
        mount_page(
            &mock_server,
            "/",
            r#"<title>Broken</title><main><img src="/missing.jpg"></main>"#.to_string(),
            1,
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/missing.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = TempDir::new().unwrap();
        let report = crawler(&mock_server, &dir).crawl().await.unwrap();

        assert_eq!(report.titles(), vec!["Broken"]);
        assert_eq!(report.images.failed, 1);
        assert!(report.pages[0].markdown.contains("images/"));
    }

    #[tokio::test]
    async fn test_max_pages_bounds_the_crawl() {
        let mock_server = MockServer::start().await;
        let uri = mock_server.uri();
        mount_page(
            &mock_server,
            "/",
            format!(r#"<main><a href="{uri}/one">1</a><a href="{uri}/two">2</a></main>"#),
            1,
        )
        .await;
        mount_page(&mock_server, "/one", "<main>one</main>".to_string(), 1).await;
        mount_page(&mock_server, "/two", "<main>two</main>".to_string(), 0).await;

        let dir = TempDir::new().unwrap();
        let report = crawler(&mock_server, &dir)
            .with_max_pages(Some(2))
            .crawl()
            .await
            .unwrap();

        assert_eq!(report.visited, 2);
    }

    #[tokio::test]
    async fn test_progress_callback_sees_each_page() {
        let mock_server = MockServer::start().await;
        let uri = mock_server.uri();
        mount_page(
            &mock_server,
            "/",
            format!(r#"<main><a href="{uri}/next">next</a></main>"#),
            1,
        )
        .await;
        mount_page(&mock_server, "/next", "<main>end</main>".to_string(), 1).await;

        let seen: Arc<Mutex<Vec<(usize, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let dir = TempDir::new().unwrap();
        crawler(&mock_server, &dir)
            .with_progress_callback(Arc::new(move |count, url| {
                seen_clone.lock().unwrap().push((count, url));
            }))
            .crawl()
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, 1);
        assert!(seen[1].1.ends_with("/next"));
    }

    #[test]
    fn test_invalid_start_url() {
        let images = ImageCache::new("images", "images");
        assert!(matches!(
            Crawler::new("not a url", images),
            Err(CrawlError::UrlParse(url::ParseError::RelativeUrlWithoutBase))
        ));
    }

    #[test]
    fn test_start_url_without_host() {
        let images = ImageCache::new("images", "images");
        assert!(matches!(
            Crawler::new("mailto:docs@example.com", images),
            Err(CrawlError::InvalidUrl(_))
        ));
    }
}
