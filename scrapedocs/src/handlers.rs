use clap::ArgMatches;
use colored::Colorize;
use scrapedocs_core::crawl::{CrawlOptions, execute_crawl};
use scrapedocs_core::output::{RunLayout, default_output_file, run_dir_name, timestamp};
use scrapedocs_core::report::generate_crawl_report;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    // Try to parse as-is
    if let Ok(url) = Url::parse(line)
        && url.has_host()
    {
        return Some(line.to_string());
    }

    // Try adding http://
    let with_scheme = format!("http://{}", line);
    if let Ok(url) = Url::parse(&with_scheme)
        && url.has_host()
    {
        return Some(with_scheme);
    }

    None
}

/// clap value parser for the root URL
pub fn parse_root_url(value: &str) -> Result<Url, String> {
    parse_url_line(value)
        .and_then(|line| Url::parse(&line).ok())
        .ok_or_else(|| format!("'{}' is not a valid URL", value))
}

/// Build crawl options from parsed arguments. `now` names the run when no
/// run name or output file is given.
pub fn options_from_matches(matches: &ArgMatches, now: &str) -> anyhow::Result<CrawlOptions> {
    let url = matches
        .get_one::<Url>("url")
        .ok_or_else(|| anyhow::anyhow!("--url is required"))?;

    let output_dir = matches
        .get_one::<PathBuf>("output-dir")
        .map(|dir| PathBuf::from(shellexpand::tilde(&dir.to_string_lossy()).as_ref()))
        .unwrap_or_else(|| PathBuf::from(scrapedocs_core::output::DEFAULT_OUTPUT_DIR));

    let run_dir = run_dir_name(
        now,
        matches.get_one::<String>("run-name").map(String::as_str),
        matches.get_flag("append-to-timestamp"),
    );

    let output_file = matches
        .get_one::<String>("output")
        .cloned()
        .unwrap_or_else(|| default_output_file(now));

    let images_dir = matches
        .get_one::<String>("images-dir")
        .cloned()
        .unwrap_or_else(|| scrapedocs_core::output::DEFAULT_IMAGES_DIR.to_string());

    let mut options = CrawlOptions::new(
        url.as_str(),
        RunLayout::new(output_dir, &run_dir, output_file, images_dir),
    );
    if let Some(selector) = matches.get_one::<String>("selector") {
        options.selector = selector.clone();
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        options.timeout_secs = *timeout;
    }
    if let Some(delay) = matches.get_one::<Duration>("delay") {
        options.delay = *delay;
    }
    options.max_pages = matches.get_one::<usize>("max-pages").copied();
    options.show_progress_bars = !matches.get_flag("quiet");

    Ok(options)
}

pub async fn handle_crawl(matches: &ArgMatches) -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let quiet = matches.get_flag("quiet");
    let options = options_from_matches(matches, &timestamp())?;

    if !quiet {
        println!("\n{} Crawling {}", "→".blue(), options.url.bright_white());
        println!("Selector: {}", options.selector);
        println!("Output directory: {}", options.layout.run_dir.display());
        println!("Output file: {}\n", options.layout.output_file);
    }

    let summary = execute_crawl(options, None)
        .await
        .map_err(|e| anyhow::anyhow!("Crawl failed: {}", e))?;

    if !quiet {
        println!("\n{} Download complete!\n", "✓".green().bold());
        print!("{}", generate_crawl_report(&summary));
        println!(
            "\nDocumentation saved to '{}'.",
            summary.output_path.display().to_string().bright_white()
        );
    }

    Ok(())
}
