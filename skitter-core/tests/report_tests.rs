// Tests for report generation functionality

use skitter_core::report::{ReportFormat, generate_crawl_report, render_report};
use skitter_scanner::{CrawlEvent, CrawlOutcome, FetchError, TrackerStats};
use std::time::Duration;

fn sample_outcome() -> CrawlOutcome {
    CrawlOutcome {
        root: "http://golang.org/".to_string(),
        max_depth: 4,
        events: vec![
            CrawlEvent::Found {
                id: "http://golang.org/".to_string(),
                body: "The Go Programming Language".to_string(),
                depth: 4,
                links_found: 2,
                response_time: Duration::from_millis(3),
            },
            CrawlEvent::Failed {
                id: "http://golang.org/cmd/".to_string(),
                depth: 3,
                error: FetchError::NotFound("http://golang.org/cmd/".to_string()),
            },
            CrawlEvent::Failed {
                id: "http://golang.org/".to_string(),
                depth: 2,
                error: FetchError::AlreadyVisited("http://golang.org/".to_string()),
            },
        ],
        stats: TrackerStats {
            registered: 4,
            deregistered: 4,
        },
        elapsed: Duration::from_millis(12),
    }
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert!(matches!(ReportFormat::from_str("text"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("JSON"), Some(ReportFormat::Json)));
    assert!(ReportFormat::from_str("csv").is_none());
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_summary() {
    colored::control::set_override(false);
    let report = generate_crawl_report(&[sample_outcome()]);

    assert!(report.contains("Roots crawled: 1"));
    assert!(report.contains("Pages found: 1"));
    assert!(report.contains("Failures: 2"));
    assert!(report.contains("not found: 1"));
    assert!(report.contains("already visited: 1"));
    assert!(report.contains("Tasks run: 4"));
}

#[test]
fn test_text_report_lists_pages_and_failures() {
    colored::control::set_override(false);
    let report = generate_crawl_report(&[sample_outcome()]);

    assert!(report.contains("## http://golang.org/ (max depth 4"));
    assert!(report.contains("✓ http://golang.org/ \"The Go Programming Language\""));
    assert!(report.contains("(depth 4, 2 links)"));
    assert!(report.contains("✗ http://golang.org/cmd/ not found: http://golang.org/cmd/"));
}

#[test]
fn test_text_report_empty() {
    let report = generate_crawl_report(&[]);
    assert!(report.contains("Roots crawled: 0"));
    assert!(report.contains("Pages found: 0"));
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_shape() {
    let json = render_report(&[sample_outcome()], ReportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let outcome = &value[0];
    assert_eq!(outcome["root"], "http://golang.org/");
    assert_eq!(outcome["stats"]["registered"], 4);

    let events = outcome["events"].as_array().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["event"], "found");
    assert_eq!(events[0]["body"], "The Go Programming Language");
    assert_eq!(events[1]["event"], "failed");
    assert_eq!(events[1]["error"]["kind"], "not_found");
    assert_eq!(events[2]["error"]["kind"], "already_visited");
}
