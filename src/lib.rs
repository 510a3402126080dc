#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod batch;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod segmenter;

// Stage modules – public so tools and tests can run a single stage.
pub mod columns;
pub mod header;
pub mod mask;
pub mod profile;
pub mod resample;
pub mod rows;
pub mod separators;
pub mod trim;

// --- High-level re-exports -------------------------------------------------

pub use crate::batch::segment_pages;
pub use crate::config::BatchConfig;
pub use crate::error::{PageError, SegmentError};
pub use crate::segmenter::{PageSegmentation, PageSegmenter, SegmentParams};

pub use crate::diagnostics::{BatchReport, LineSource, PageOutcome, PageReport};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use page_columns::prelude::*;
///
/// # fn main() {
/// let (w, h) = (1000usize, 1400usize);
/// let gray = vec![255u8; w * h];
/// let img = ImageU8 { w, h, stride: w, data: &gray };
///
/// let segmenter = PageSegmenter::new(SegmentParams::default());
/// let seg = segmenter.segment(img);
/// println!("columns={:?} source={:?}", seg.columns, seg.report.line_source);
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{GrayImageU8, ImageU8, ImageView};
    pub use crate::{PageSegmentation, PageSegmenter, SegmentParams};
}
