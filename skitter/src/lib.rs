// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{load_urls_from_file, load_urls_from_source, parse_url_line};

// Re-export crawl functionality from skitter-core
pub use skitter_core::crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl, extract_url_path};
pub use skitter_core::report::{ReportFormat, generate_crawl_report, render_report};
