use colored::Colorize;
use scrapedocs::commands::command_argument_builder;
use scrapedocs::handlers::handle_crawl;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let matches = cmd.get_matches();

    if let Err(e) = handle_crawl(&matches).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
