//! Top-of-content detection.
//!
//! Most pages print a horizontal rule under the running header. Three
//! strategies are tried in order:
//!
//! 1. **Run-length rule search**: every analysis row in the configured band
//!    is scored by the longest near-continuous ink run across the page,
//!    OR-ing `±band` rows so a slightly skewed rule still reads as one
//!    stroke. The best row wins if its run covers `min_run_ratio` of the width.
//! 2. **Density sweep**: contiguous rows whose ink fraction exceeds
//!    `density_min`; the first such segment starting inside the band (or the
//!    first anywhere) is taken as the rule.
//! 3. **Headerless pages**: row bands are found across most of the page
//!    width, rows denser than `header_density_factor × median` are dropped as
//!    header text, and content starts just above the first run of evenly
//!    spaced survivors.
use crate::image::{ImageU8, ImageView};
use crate::profile::{median, row_ink_fractions, runs_above, TolerantRun};
use crate::resample::{downscale, AnalysisScale, Resample};
use crate::rows::{center_densities, detect_row_centers};
use crate::segmenter::params::{HeaderOptions, SegmentParams};
use log::debug;
use serde::Serialize;

/// Which strategy produced the content top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TopSource {
    RunLengthRule,
    DensityRule,
    Headerless,
}

/// Top of the content region in source pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTop {
    pub y: usize,
    pub source: TopSource,
}

/// Runs the rule detectors, then the headerless heuristic.
pub fn locate_content_top(mask: &ImageU8<'_>, params: &SegmentParams) -> ContentTop {
    let opts = &params.header;
    let analysis_width = opts.rule_analysis_width.min(params.analysis_width);
    let last_row = mask.h.saturating_sub(1);
    if let Some(rule_y) = detect_rule_runlength(mask, analysis_width, opts) {
        return ContentTop {
            y: (rule_y + opts.rule_offset).min(last_row),
            source: TopSource::RunLengthRule,
        };
    }
    if let Some(rule_y) = detect_rule_density(mask, opts) {
        return ContentTop {
            y: (rule_y + opts.rule_offset).min(last_row),
            source: TopSource::DensityRule,
        };
    }
    ContentTop {
        y: detect_headerless_top(mask, params),
        source: TopSource::Headerless,
    }
}

/// y just below the strongest horizontal rule in the search band, if any row
/// reaches `min_run_ratio`.
pub fn detect_rule_runlength(
    mask: &ImageU8<'_>,
    analysis_width: usize,
    opts: &HeaderOptions,
) -> Option<usize> {
    if mask.is_empty() {
        return None;
    }
    let scale = AnalysisScale::for_width(mask.w, mask.h, analysis_width);
    let small = downscale(mask, &scale, Resample::Box);
    let (aw, ah) = (scale.width, scale.height);
    let start_y = (ah as f32 * opts.min_y_ratio).max(0.0) as usize;
    let end_y = ((ah as f32 * opts.max_y_ratio) as usize).min(ah);
    if end_y <= start_y {
        return None;
    }

    let ink_rows: Vec<Vec<bool>> = small
        .rows()
        .map(|row| row.iter().map(|&v| v > opts.ink_threshold).collect())
        .collect();

    let mut best: Option<(usize, f32)> = None;
    for y in start_y..end_y {
        let y0 = y.saturating_sub(opts.band);
        let y1 = (y + opts.band).min(ah - 1);
        let mut run = TolerantRun::new(opts.gap_allow);
        for x in 0..aw {
            run.step((y0..=y1).any(|yy| ink_rows[yy][x]));
        }
        let ratio = run.longest() as f32 / aw as f32;
        if best.map_or(ratio > 0.0, |(_, r)| ratio > r) {
            best = Some((y, ratio));
        }
    }

    let (best_y, ratio) = best?;
    debug!("rule search: best_row={} ratio={:.3}", best_y, ratio);
    if ratio < opts.min_run_ratio {
        return None;
    }
    Some(scale.y_to_source((best_y + 1) as f32))
}

/// y just below the first dense row segment, preferring one that starts in
/// the search band.
pub fn detect_rule_density(mask: &ImageU8<'_>, opts: &HeaderOptions) -> Option<usize> {
    if mask.is_empty() {
        return None;
    }
    let scale = AnalysisScale::for_width(mask.w, mask.h, opts.rule_analysis_width);
    let small = downscale(mask, &scale, Resample::Nearest);
    let densities = row_ink_fractions(&small, scale.width);
    let segments = runs_above(&densities, opts.density_min);
    let min_y = (scale.height as f32 * opts.min_y_ratio) as usize;
    let max_y = (scale.height as f32 * opts.max_y_ratio) as usize;
    let (_, end) = segments
        .iter()
        .find(|(s, _)| (min_y..=max_y).contains(s))
        .or_else(|| segments.first())
        .copied()?;
    Some(scale.y_to_source((end + 1) as f32))
}

/// Content top for pages without a header rule.
///
/// Returns 0 when no row structure is visible at all.
pub fn detect_headerless_top(mask: &ImageU8<'_>, params: &SegmentParams) -> usize {
    let opts = &params.header;
    let bands = detect_row_centers(mask, 0, opts.headerless_strip_ratio, params);
    if bands.is_empty() {
        return 0;
    }
    let densities = center_densities(
        mask,
        &bands.centers,
        params.analysis_width,
        opts.density_window,
    );
    if densities.is_empty() {
        return 0;
    }
    let limit = median(&densities) * opts.header_density_factor;
    let mut body: Vec<usize> = bands
        .centers
        .iter()
        .zip(&densities)
        .filter(|&(_, &d)| d <= limit)
        .map(|(&c, _)| c)
        .collect();
    if body.is_empty() {
        body = bands.centers.clone();
    }
    let start = pick_stable_start(
        &body,
        bands.spacing,
        opts.stable_run_len,
        opts.stable_tolerance,
    );
    let top = (start as f32 - bands.spacing * opts.start_offset_factor).max(0.0) as usize;
    debug!(
        "headerless top: rows={} body={} spacing={:.1} start={} top={}",
        bands.centers.len(),
        body.len(),
        bands.spacing,
        start,
        top
    );
    top
}

/// First centre starting `min_len` consecutive centres whose deltas stay
/// within `spacing × (1 ± tol)`; the first centre if no such run exists.
pub fn pick_stable_start(centers: &[usize], spacing: f32, min_len: usize, tol: f32) -> usize {
    let Some(&first) = centers.first() else {
        return 0;
    };
    let min_len = min_len.max(1);
    if centers.len() < min_len {
        return first;
    }
    let lo = spacing * (1.0 - tol);
    let hi = spacing * (1.0 + tol);
    centers
        .windows(min_len)
        .find(|w| {
            w.windows(2).all(|pair| {
                let delta = (pair[1] - pair[0]) as f32;
                delta >= lo && delta <= hi
            })
        })
        .map_or(first, |w| w[0])
}
