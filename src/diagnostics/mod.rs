//! Serializable diagnostics produced by the segmenter and the batch runner.
//!
//! `PageReport` records every geometric decision made for one page together
//! with stage timings. `BatchReport` collects per-page outcomes (segmented,
//! skipped, failed) and is what the batch tool writes as JSON.

pub mod batch;
pub mod page;
pub mod timing;

pub use batch::{BatchReport, PageEntry, PageOutcome};
pub use page::{LineSource, PageReport, RowSummary};
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
