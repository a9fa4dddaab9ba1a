//! CLI output formatting.
//!
//! Each command has a `format_*` function returning lines (pure, testable)
//! and a `print_*` wrapper that writes them to stdout. Diagnostics go through
//! `tracing`; this module only renders results.
//!
//! # Output Format
//!
//! ## Plan
//!
//! ```text
//! Site homepage (section: homepage)
//! 001 index.html → index.html
//!     home page, text/html
//! 002 assets/css/main.css → assets/homepage/css/main.css
//!     file, text/css
//!
//! Skipped
//!     snippets/album.html
//! ```
//!
//! ## Publish
//!
//! ```text
//! Published 4 files to s3://my-bucket
//! Skipped: 2 (snippets)
//! ```
//!
//! or, when something failed:
//!
//! ```text
//! Published 3 of 4 files to s3://my-bucket
//! Failed: 1
//! First error: Upload failed: S3 error for error.html: AccessDenied
//! Skipped: 2 (snippets)
//! ```
//!
//! The `Skipped` line is left out when no snippet files were found.

use crate::publish::{Plan, PublishReport};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

pub fn format_plan(plan: &Plan, root: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Site {} (section: {})",
        root.display(),
        plan.section
    )];

    for (i, task) in plan.tasks.iter().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            task.relative,
            task.key
        ));
        lines.push(format!(
            "{}{}, {}",
            indent(1),
            task.kind.label(),
            task.content_type
        ));
    }

    if !plan.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for path in &plan.skipped {
            lines.push(format!("{}{}", indent(1), path));
        }
    }
    lines
}

pub fn print_plan(plan: &Plan, root: &Path) {
    for line in format_plan(plan, root) {
        println!("{}", line);
    }
}

pub fn format_publish_report(report: &PublishReport) -> Vec<String> {
    let total = report.uploaded.len() + report.failed;
    let noun = if total == 1 { "file" } else { "files" };

    let mut lines = match &report.first_error {
        None => vec![format!(
            "Published {} {} to {}",
            report.uploaded.len(),
            noun,
            report.target
        )],
        Some(err) => vec![
            format!(
                "Published {} of {} {} to {}",
                report.uploaded.len(),
                total,
                noun,
                report.target
            ),
            format!("Failed: {}", report.failed),
            format!("First error: {}", err),
        ],
    };
    if !report.skipped.is_empty() {
        lines.push(format!("Skipped: {} (snippets)", report.skipped.len()));
    }
    lines
}

pub fn print_publish_report(report: &PublishReport) {
    for line in format_publish_report(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::PageKind;
    use crate::publish::{FileTask, PublishError};
    use crate::store::StoreError;
    use std::path::PathBuf;

    fn task(relative: &str, key: &str, kind: PageKind, content_type: &str) -> FileTask {
        FileTask {
            source: PathBuf::from("homepage").join(relative),
            relative: relative.to_string(),
            key: key.to_string(),
            content_type: content_type.to_string(),
            kind,
        }
    }

    #[test]
    fn plan_lists_tasks_and_skipped() {
        let plan = Plan {
            section: "homepage".to_string(),
            tasks: vec![
                task("index.html", "index.html", PageKind::HomePage, "text/html"),
                task(
                    "assets/css/main.css",
                    "assets/homepage/css/main.css",
                    PageKind::Passthrough,
                    "text/css",
                ),
            ],
            skipped: vec!["snippets/album.html".to_string()],
        };
        let lines = format_plan(&plan, Path::new("homepage"));
        assert_eq!(
            lines,
            vec![
                "Site homepage (section: homepage)",
                "001 index.html → index.html",
                "    home page, text/html",
                "002 assets/css/main.css → assets/homepage/css/main.css",
                "    file, text/css",
                "",
                "Skipped",
                "    snippets/album.html",
            ]
        );
    }

    #[test]
    fn plan_without_skipped_has_no_section() {
        let plan = Plan {
            section: "homepage".to_string(),
            ..Plan::default()
        };
        let lines = format_plan(&plan, Path::new("homepage"));
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn report_success() {
        let report = PublishReport {
            target: "s3://bucket".to_string(),
            uploaded: vec!["index.html".to_string(), "error.html".to_string()],
            skipped: vec![],
            failed: 0,
            first_error: None,
        };
        assert_eq!(
            format_publish_report(&report),
            vec!["Published 2 files to s3://bucket"]
        );
    }

    #[test]
    fn report_failure_shows_first_error() {
        let report = PublishReport {
            target: "s3://bucket".to_string(),
            uploaded: vec!["index.html".to_string()],
            skipped: vec![],
            failed: 1,
            first_error: Some(PublishError::Upload(StoreError::S3 {
                key: "error.html".to_string(),
                message: "AccessDenied".to_string(),
            })),
        };
        let lines = format_publish_report(&report);
        assert_eq!(lines[0], "Published 1 of 2 files to s3://bucket");
        assert_eq!(lines[1], "Failed: 1");
        assert_eq!(
            lines[2],
            "First error: Upload failed: S3 error for error.html: AccessDenied"
        );
    }

    #[test]
    fn report_counts_skipped_snippets() {
        let report = PublishReport {
            target: "dist".to_string(),
            uploaded: vec!["index.html".to_string()],
            skipped: vec![
                "snippets/album.html".to_string(),
                "snippets/backto.html".to_string(),
            ],
            failed: 0,
            first_error: None,
        };
        assert_eq!(
            format_publish_report(&report),
            vec!["Published 1 file to dist", "Skipped: 2 (snippets)"]
        );
    }
}
