use crate::diagnostics::{LineSource, PageReport};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Result of one page within a batch.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PageOutcome {
    Segmented {
        outputs: Vec<PathBuf>,
        report: Box<PageReport>,
    },
    /// All column files already existed.
    Skipped,
    Failed {
        error: String,
    },
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEntry {
    pub page: u32,
    pub path: PathBuf,
    pub outcome: PageOutcome,
}

/// Summary of a batch run, serialized to the report JSON.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub start_page: u32,
    pub end_page: u32,
    pub total_ms: f64,
    pub pages: Vec<PageEntry>,
}

impl BatchReport {
    pub fn segmented(&self) -> usize {
        self.count(|o| matches!(o, PageOutcome::Segmented { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, PageOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, PageOutcome::Failed { .. }))
    }

    /// Segmented pages whose columns came from the equal-width split.
    pub fn fallbacks(&self) -> usize {
        self.count(|o| match o {
            PageOutcome::Segmented { report, .. } => report.line_source == LineSource::Fallback,
            _ => false,
        })
    }

    fn count(&self, pred: impl Fn(&PageOutcome) -> bool) -> usize {
        self.pages.iter().filter(|p| pred(&p.outcome)).count()
    }

    /// Human-readable multi-line summary.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "pages {}-{}: segmented={} skipped={} failed={} fallback_columns={} ({:.1} ms)",
            self.start_page,
            self.end_page,
            self.segmented(),
            self.skipped(),
            self.failed(),
            self.fallbacks(),
            self.total_ms
        );
        for entry in &self.pages {
            match &entry.outcome {
                PageOutcome::Segmented { report, .. } => {
                    let lines = report
                        .lines
                        .map(|l| format!("{:?}", l.as_slice()))
                        .unwrap_or_else(|| "-".to_string());
                    let _ = writeln!(
                        out,
                        "  page {:>4}: rows {}..{} top={:?} lines={} ({:?})",
                        entry.page,
                        report.region_top,
                        report.region_bottom,
                        report.content_top.source,
                        lines,
                        report.line_source
                    );
                }
                PageOutcome::Skipped => {
                    let _ = writeln!(out, "  page {:>4}: skipped", entry.page);
                }
                PageOutcome::Failed { error } => {
                    let _ = writeln!(out, "  page {:>4}: FAILED {}", entry.page, error);
                }
            }
        }
        out
    }
}
