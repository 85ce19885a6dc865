// End-of-run summary text

use crate::crawl::{CrawlSummary, extract_url_path};

/// Generate a crawl report from a finished run
pub fn generate_crawl_report(summary: &CrawlSummary) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Pages visited: {}\n", summary.visited));
    report.push_str(&format!("  Pages written: {}\n", summary.pages_written()));
    report.push_str(&format!("  Pages failed: {}\n", summary.failures.len()));
    report.push_str(&format!(
        "  Images: {} downloaded, {} cached, {} failed\n",
        summary.images.downloaded, summary.images.cached, summary.images.failed
    ));
    report.push_str(&format!("  Output: {}\n", summary.output_path.display()));

    if !summary.failures.is_empty() {
        report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
        report.push_str("## Failed pages\n");
        for failure in &summary.failures {
            report.push_str(&format!(
                "  {}: {}\n",
                extract_url_path(&failure.url),
                failure.error
            ));
        }
    }

    report
}
