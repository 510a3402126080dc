//! Row-band analysis on the ink mask.
//!
//! Data rows of the word list are profiled through a narrow strip on the
//! left of the page (the first column is populated on every row). Bands of
//! rows above a dynamic density threshold are text lines; their centres give
//! the row pitch used by the header heuristic and the bottom pad. The bottom
//! of the content is found separately from a full-width profile.
//!
//! All profiling happens at analysis resolution; returned coordinates are in
//! source pixels of the mask passed in.
use crate::image::{ImageU8, ImageView};
use crate::profile::{
    first_run_from_end, odd_window, row_ink_fractions, runs_above, smooth_densities,
    spread_threshold, INK,
};
use crate::resample::{downscale, AnalysisScale, Resample};
use crate::segmenter::params::SegmentParams;
use log::debug;

/// Row centres (source y, page coordinates) and median row pitch (source px).
#[derive(Clone, Debug, PartialEq)]
pub struct RowBands {
    pub centers: Vec<usize>,
    pub spacing: f32,
}

impl RowBands {
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }
}

/// Finds text-row centres below `top` from the ink density of the left strip
/// covering `strip_ratio` of the width.
///
/// When fewer than two bands are found the spacing falls back to
/// `rows.default_spacing` analysis pixels, rescaled (unscaled for an empty region).
pub fn detect_row_centers(
    mask: &ImageU8<'_>,
    top: usize,
    strip_ratio: f32,
    params: &SegmentParams,
) -> RowBands {
    let crop = mask.rows_between(top, mask.h);
    let opts = &params.rows;
    if crop.is_empty() {
        return RowBands {
            centers: Vec::new(),
            spacing: opts.default_spacing,
        };
    }
    let scale = AnalysisScale::for_width(crop.w, crop.h, params.analysis_width);
    let small = downscale(&crop, &scale, Resample::Nearest);
    let strip = ((scale.width as f32 * strip_ratio) as usize).max(1);
    let densities = row_ink_fractions(&small, strip);
    let smoothed = smooth_densities(&densities, odd_window(params.row_window));
    let threshold = params
        .row_threshold
        .max(spread_threshold(&smoothed, opts.threshold_factor));

    let height_floor = ((scale.height as f32 * opts.min_run_height_ratio) as usize).max(2);
    let min_run = params.min_run.max(height_floor);
    let centers: Vec<usize> = runs_above(&smoothed, threshold)
        .into_iter()
        .filter(|&(s, e)| e - s + 1 >= min_run)
        .map(|(s, e)| (s + e) / 2)
        .collect();

    let mut spacings: Vec<usize> = centers.windows(2).map(|w| w[1] - w[0]).collect();
    spacings.sort_unstable();
    let spacing = spacings
        .get(spacings.len() / 2)
        .map(|&s| s as f32)
        .unwrap_or(opts.default_spacing);

    debug!(
        "row bands: top={} strip={} threshold={:.4} bands={} spacing={:.1} (analysis px)",
        top,
        strip,
        threshold,
        centers.len(),
        spacing
    );

    RowBands {
        centers: centers
            .into_iter()
            .map(|c| top + scale.y_to_source(c as f32))
            .collect(),
        spacing: spacing * scale.scale_y(),
    }
}

/// Distance from `top` down to the end of the last dense row run (source px).
///
/// Scans a full-width smoothed profile upwards from the bottom; a page with
/// no qualifying run keeps everything below `top`.
pub fn detect_bottom(mask: &ImageU8<'_>, top: usize, params: &SegmentParams) -> usize {
    let crop = mask.rows_between(top, mask.h);
    if crop.is_empty() {
        return 0;
    }
    let opts = &params.rows;
    let scale = AnalysisScale::for_width(crop.w, crop.h, params.analysis_width);
    let small = downscale(&crop, &scale, Resample::Nearest);
    let densities = row_ink_fractions(&small, scale.width);
    let smoothed = smooth_densities(&densities, odd_window(params.row_window));
    let threshold = spread_threshold(&smoothed, opts.bottom_threshold_factor);
    let min_run = opts.bottom_min_run.max(params.min_run);
    let end_idx = first_run_from_end(&smoothed, threshold, min_run).unwrap_or(scale.height - 1);
    let offset = scale.y_to_source((end_idx + 1) as f32);
    debug!(
        "bottom: top={} threshold={:.4} end_row={} offset={}",
        top, threshold, end_idx, offset
    );
    offset.min(crop.h)
}

/// Ink fraction of the full-width rows within `window` analysis rows of each
/// centre (`centers` in source y of `mask`).
pub fn center_densities(
    mask: &ImageU8<'_>,
    centers: &[usize],
    analysis_width: usize,
    window: usize,
) -> Vec<f32> {
    if centers.is_empty() || mask.is_empty() {
        return Vec::new();
    }
    let scale = AnalysisScale::for_width(mask.w, mask.h, analysis_width);
    let small = downscale(mask, &scale, Resample::Nearest);
    let row_sums: Vec<usize> = small
        .rows()
        .map(|row| row.iter().filter(|&&v| v == INK).count())
        .collect();
    centers
        .iter()
        .map(|&c| {
            let y = scale.y_from_source(c);
            let lo = y.saturating_sub(window);
            let hi = (y + window + 1).min(scale.height);
            let total: usize = row_sums[lo..hi].iter().sum();
            total as f32 / (scale.width * (hi - lo)) as f32
        })
        .collect()
}
