// Report generation from crawl outcomes

use colored::Colorize;
use serde::{Deserialize, Serialize};
use skitter_scanner::{CrawlEvent, CrawlOutcome};
use std::collections::BTreeMap;

const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const BODY_PREVIEW_CHARS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

pub fn render_report(
    outcomes: &[CrawlOutcome],
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_crawl_report(outcomes)),
        ReportFormat::Json => serde_json::to_string_pretty(outcomes),
    }
}

/// Single-line, length-capped rendering of a page body
pub fn body_preview(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > BODY_PREVIEW_CHARS {
        let cut: String = flat.chars().take(BODY_PREVIEW_CHARS).collect();
        format!("{}…", cut)
    } else {
        flat
    }
}

/// Generate a text report from crawl outcomes
pub fn generate_crawl_report(outcomes: &[CrawlOutcome]) -> String {
    let found: usize = outcomes.iter().map(|o| o.found().count()).sum();
    let tasks: usize = outcomes.iter().map(|o| o.stats.registered).sum();

    let mut failures_by_kind: BTreeMap<&str, usize> = BTreeMap::new();
    for event in outcomes.iter().flat_map(|o| o.failed()) {
        if let Some(error) = event.error() {
            *failures_by_kind.entry(error.kind()).or_default() += 1;
        }
    }
    let failed: usize = failures_by_kind.values().sum();

    let mut report = String::new();
    report.push_str(DIVIDER);
    report.push_str("\n\n# Summary:\n");
    report.push_str(&format!("  Roots crawled: {}\n", outcomes.len()));
    report.push_str(&format!("  Pages found: {}\n", found));
    report.push_str(&format!("  Failures: {}\n", failed));
    for (kind, count) in &failures_by_kind {
        report.push_str(&format!("    {}: {}\n", kind, count));
    }
    report.push_str(&format!("  Tasks run: {}\n", tasks));
    report.push('\n');
    report.push_str(DIVIDER);
    report.push_str("\n\n");

    for outcome in outcomes {
        report.push_str(&format!(
            "## {} (max depth {}, {:.2?})\n",
            outcome.root, outcome.max_depth, outcome.elapsed
        ));
        report.push_str(&format!(
            "  {} pages found, {} failures\n\n",
            outcome.found().count(),
            outcome.failed().count()
        ));

        for event in &outcome.events {
            let line = match event {
                CrawlEvent::Found {
                    id,
                    body,
                    depth,
                    links_found,
                    ..
                } => format!(
                    "  {} {} {:?} {}",
                    "✓".green(),
                    id,
                    body_preview(body),
                    format!("(depth {}, {} links)", depth, links_found).bright_black()
                ),
                CrawlEvent::Failed { id, error, .. } => {
                    format!("  {} {} {}", "✗".red(), id, error.to_string().yellow())
                }
            };
            report.push_str(&line);
            report.push('\n');
        }
        report.push('\n');
    }

    report
}
