//! Left/right margin trimming.
//!
//! Scans often carry scan-bed bleed or binding shadow at the sides. The
//! column-coverage profile of the region mask is smoothed and scanned inward
//! from each edge for the first sustained run of content; asymmetric margins
//! are then added back and the cut is limited to a maximum share per side.
use crate::image::{ImageU8, ImageView};
use crate::profile::{
    column_coverage, first_run_from_end, first_run_from_start, odd_window, percentile,
    smooth_densities,
};
use crate::resample::{downscale, AnalysisScale, Resample};
use crate::segmenter::params::{SegmentParams, TrimOptions};
use log::debug;
use serde::Serialize;

/// Horizontal extent `[left, right)` kept after trimming (source px).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HorizontalTrim {
    pub left: usize,
    pub right: usize,
}

impl HorizontalTrim {
    pub fn full(width: usize) -> Self {
        Self {
            left: 0,
            right: width,
        }
    }

    pub fn width(&self) -> usize {
        self.right - self.left
    }

    /// True when the trim removes nothing from a region `width` wide.
    pub fn is_full(&self, width: usize) -> bool {
        self.left == 0 && self.right >= width
    }

    /// Limits a trim of an already trimmed region so the total cut stays
    /// within the per-side maxima of the original `full_width`.
    ///
    /// The region is `width` px wide and starts `offset` px into the original.
    pub fn within_budget(
        self,
        offset: usize,
        width: usize,
        full_width: usize,
        opts: &TrimOptions,
    ) -> Self {
        let mut left = self.left;
        let mut right = self.right.min(width);
        if opts.max_trim_left_ratio > 0.0 {
            let budget = round_share(full_width, opts.max_trim_left_ratio);
            left = left.min(budget.saturating_sub(offset));
        }
        if opts.max_trim_right_ratio > 0.0 {
            let cut = full_width.saturating_sub(offset + width);
            let budget = round_share(full_width, opts.max_trim_right_ratio);
            right = right.max(width.saturating_sub(budget.saturating_sub(cut)));
        }
        if right <= left {
            return Self::full(width);
        }
        Self { left, right }
    }
}

/// Detects the content edges of `mask`; the full width when none are found.
pub fn detect_horizontal_trim(mask: &ImageU8<'_>, params: &SegmentParams) -> HorizontalTrim {
    let w = mask.w;
    if mask.is_empty() {
        return HorizontalTrim::full(w);
    }
    let opts = &params.trim;
    let scale = AnalysisScale::for_width(w, mask.h, params.analysis_width);
    let small = downscale(mask, &scale, Resample::Box);
    let coverage = column_coverage(&small);
    let window = odd_window(opts.min_smooth_window.max(params.row_window));
    let smoothed = smooth_densities(&coverage, window);
    let threshold = opts
        .density_floor
        .max(percentile(&smoothed, 0.5) * opts.threshold_factor);

    let min_run = opts.min_run.max(2);
    let (Some(left), Some(right)) = (
        first_run_from_start(&smoothed, threshold, min_run),
        first_run_from_end(&smoothed, threshold, min_run),
    ) else {
        return HorizontalTrim::full(w);
    };
    if right <= left {
        return HorizontalTrim::full(w);
    }

    let margin_left = params.pad.max(round_share(w, opts.margin_left_ratio));
    let margin_right = params.pad.max(round_share(w, opts.margin_right_ratio));
    let mut left_px = scale.x_to_source(left as f32).saturating_sub(margin_left);
    let mut right_px = (scale.x_to_source((right + 1) as f32) + margin_right).min(w);
    if opts.max_trim_left_ratio > 0.0 {
        left_px = left_px.min(round_share(w, opts.max_trim_left_ratio));
    }
    if opts.max_trim_right_ratio > 0.0 {
        right_px = right_px.max(w.saturating_sub(round_share(w, opts.max_trim_right_ratio)));
    }
    debug!(
        "trim: threshold={:.4} edges=({}, {}) analysis, kept [{}, {}) of {}",
        threshold, left, right, left_px, right_px, w
    );
    if right_px <= left_px {
        return HorizontalTrim::full(w);
    }
    HorizontalTrim {
        left: left_px,
        right: right_px,
    }
}

fn round_share(width: usize, ratio: f32) -> usize {
    (width as f32 * ratio).round().max(0.0) as usize
}
