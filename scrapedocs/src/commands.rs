use crate::CLAP_STYLING;
use crate::handlers::parse_root_url;
use clap::arg;
use scrapedocs_core::output::{DEFAULT_IMAGES_DIR, DEFAULT_OUTPUT_DIR};
use std::path::PathBuf;
use std::time::Duration;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("scrapedocs")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("scrapedocs")
        .about("Crawl a documentation site and save it as a single offline Markdown file")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress the progress spinner and summary").required(false))
        .arg(
            arg!(-u --"url" <URL>)
                .required(true)
                .help("Root URL of the documentation site; only pages on its host are crawled")
                .value_parser(parse_root_url),
        )
        .arg(
            arg!(-s --"selector" <SELECTOR>)
                .required(false)
                .help(
                    "CSS selector for the main content of each page. Falls back to <body> when \
                it matches nothing. Common alternatives: article, div.doc-content",
                )
                .default_value("main"),
        )
        .arg(
            arg!(-d --"output-dir" <PATH>)
                .required(false)
                .help("Directory that receives one subdirectory per run")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value(DEFAULT_OUTPUT_DIR),
        )
        .arg(
            arg!(-o --"output" <FILE>)
                .required(false)
                .help("Output Markdown filename (default: scrapedocs_<timestamp>.md)"),
        )
        .arg(
            arg!(--"images-dir" <NAME>)
                .required(false)
                .help("Images subdirectory name inside the run directory")
                .default_value(DEFAULT_IMAGES_DIR),
        )
        .arg(
            arg!(--"run-name" <NAME>)
                .required(false)
                .help("Name for the run subdirectory (replaces the timestamp)"),
        )
        .arg(
            arg!(--"append-to-timestamp")
                .required(false)
                .help("Append --run-name to the timestamp instead of replacing it")
                .action(clap::ArgAction::SetTrue)
                .requires("run-name"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("15"),
        )
        .arg(
            arg!(--"delay" <SECONDS>)
                .required(false)
                .help("Delay between page requests in seconds")
                .value_parser(parse_delay)
                .default_value("0.5"),
        )
        .arg(
            arg!(--"max-pages" <COUNT>)
                .required(false)
                .help(
                    "Stop after visiting this many pages (default: crawl until the queue is empty)",
                )
                .value_parser(clap::value_parser!(usize)),
        )
}

fn parse_delay(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    Duration::try_from_secs_f64(seconds).map_err(|_| {
        format!("delay must be a non-negative number of seconds in range, got {}", value)
    })
}
