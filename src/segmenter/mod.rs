//! Page segmenter turning one scanned page into five column crops.
//!
//! Overview
//! - Binarizes the page and locates the content top (header rule, density
//!   rule, or the headerless heuristic).
//! - Profiles row bands below the top to find the content bottom and pads the
//!   vertical crop by a share of the row pitch.
//! - Re-binarizes the cropped region and searches for the four vertical
//!   separator rules; validates them by spacing and edge distance.
//! - Trims scan-bed margins left and right (never closer than one column
//!   width to validated lines), re-masks the narrower region, and re-detects
//!   lines for up to `redetect_passes` passes when they did not validate.
//! - Composes five contiguous column intervals, from the lines or from equal
//!   slices when none survived.
//!
//! Modules
//! - [`params`] – tunables for every stage, loadable from JSON.
//! - `pipeline` – the [`PageSegmenter`] orchestrator and its result types.

pub mod params;
mod pipeline;

pub use params::{
    HeaderOptions, LineValidationOptions, MaskOptions, RowOptions, SegmentParams,
    SeparatorOptions, TrimOptions,
};
pub use pipeline::{ColumnRect, CropRegion, PageSegmentation, PageSegmenter};
