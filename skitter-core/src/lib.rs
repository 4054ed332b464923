pub mod crawl;
pub mod fixture;
pub mod report;

use colored::Colorize;

pub use crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl};
pub use fixture::{DEMO_DEPTH, DEMO_ROOT, FixtureError, demo_fetcher, load_fixture};
pub use report::{ReportFormat, generate_crawl_report, render_report};

const BANNER: &str = r#"
     _    _ _   _
 ___| | _(_) |_| |_ ___ _ __
/ __| |/ / | __| __/ _ \ '__|
\__ \   <| | |_| ||  __/ |
|___/_|\_\_|\__|\__\___|_|
"#;

pub fn print_banner() {
    eprintln!("{}", BANNER.bright_cyan().bold());
    eprintln!(
        "  {} v{}\n",
        "depth-bounded concurrent link crawler".bright_black(),
        env!("CARGO_PKG_VERSION")
    );
}
