//! Vertical separator rule detection.
//!
//! Overview
//! - The region mask is box-downscaled so a 1–2 px rule stays visible as a
//!   faint column. Each analysis column gets the longest near-continuous run
//!   of ink samples down the page ([`RunLengthProfile`]); a sample is ink when
//!   any column within `±band` is ink, which keeps slightly skewed rules intact.
//!   Long thin strokes score high, dense but broken text scores low.
//! - A quantile sweep (strict to loose) turns the profile into candidate
//!   centres: columns above the threshold merge into segments, wide segments
//!   (text blocks) are dropped, and nearby centres are averaged.
//! - [`pick_best_lines`] searches every 4-combination of candidates for the
//!   most evenly spaced set that also fits inside the page.
//! - [`validate_separator_lines`] accepts or rejects a set before it is used
//!   for cropping.
use crate::image::{ImageU8, ImageView};
use crate::profile::{contiguous_runs, TolerantRun};
use crate::resample::{downscale, AnalysisScale, Resample};
use crate::segmenter::params::{LineValidationOptions, SegmentParams, SeparatorOptions};
use log::debug;
use serde::Serialize;

/// Number of rules separating the five printed columns.
pub const LINE_COUNT: usize = 4;

/// Four strictly increasing separator x-coordinates (source px).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SeparatorLineSet([usize; LINE_COUNT]);

impl SeparatorLineSet {
    /// Returns `None` unless `lines` holds exactly four strictly increasing values.
    pub fn new(lines: &[usize]) -> Option<Self> {
        let arr: [usize; LINE_COUNT] = lines.try_into().ok()?;
        if arr.windows(2).all(|w| w[0] < w[1]) {
            Some(Self(arr))
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn as_array(&self) -> [usize; LINE_COUNT] {
        self.0
    }

    pub fn first(&self) -> usize {
        self.0[0]
    }

    pub fn last(&self) -> usize {
        self.0[LINE_COUNT - 1]
    }

    /// The three inner column widths.
    pub fn gaps(&self) -> [usize; LINE_COUNT - 1] {
        [
            self.0[1] - self.0[0],
            self.0[2] - self.0[1],
            self.0[3] - self.0[2],
        ]
    }

    pub fn mean_gap(&self) -> f32 {
        self.gaps().iter().sum::<usize>() as f32 / (LINE_COUNT - 1) as f32
    }

    /// Lines moved left by `dx`; `None` if any would leave the region.
    pub fn shifted_left(&self, dx: usize) -> Option<Self> {
        if self.0[0] < dx {
            return None;
        }
        Some(Self(self.0.map(|x| x - dx)))
    }
}

/// Longest tolerant-gap run per analysis column.
#[derive(Clone, Debug)]
pub struct RunLengthProfile {
    pub runs: Vec<usize>,
    pub scale: AnalysisScale,
}

/// Builds the run-length profile of `mask` at `analysis_width`.
pub fn run_length_profile(
    mask: &ImageU8<'_>,
    analysis_width: usize,
    opts: &SeparatorOptions,
) -> RunLengthProfile {
    let scale = AnalysisScale::for_width(mask.w, mask.h, analysis_width);
    let small = downscale(mask, &scale, Resample::Box);
    let aw = scale.width;
    let mut counters = vec![TolerantRun::new(opts.gap_allow); aw];
    let mut prefix = vec![0usize; aw + 1];
    for row in small.rows() {
        for (i, &v) in row.iter().enumerate() {
            prefix[i + 1] = prefix[i] + usize::from(v > opts.ink_threshold);
        }
        for (x, counter) in counters.iter_mut().enumerate() {
            let lo = x.saturating_sub(opts.band);
            let hi = (x + opts.band).min(aw - 1);
            counter.step(prefix[hi + 1] > prefix[lo]);
        }
    }
    RunLengthProfile {
        runs: counters.iter().map(TolerantRun::longest).collect(),
        scale,
    }
}

/// Candidate separator centres (source px) for one run-length quantile.
pub fn line_candidates(
    profile: &RunLengthProfile,
    quantile: f32,
    max_line_width: usize,
    opts: &SeparatorOptions,
) -> Vec<usize> {
    let runs = &profile.runs;
    if runs.is_empty() {
        return Vec::new();
    }
    let mut sorted = runs.clone();
    sorted.sort_unstable();
    let idx = ((sorted.len() - 1) as f32 * quantile.clamp(0.0, 1.0)).round() as usize;
    let floor = (opts.min_run_ratio * profile.scale.height as f32) as usize;
    let threshold = sorted[idx.min(sorted.len() - 1)].max(floor);

    let mut columns: Vec<usize> = (0..runs.len()).filter(|&x| runs[x] >= threshold).collect();
    if columns.is_empty() {
        // Stable sort: equal runs keep ascending column order.
        let mut by_run: Vec<usize> = (0..runs.len()).collect();
        by_run.sort_by(|&a, &b| runs[b].cmp(&runs[a]));
        by_run.truncate(opts.fallback_candidates.min(runs.len()));
        by_run.sort_unstable();
        columns = by_run;
    }

    let max_width = (max_line_width + 2 * opts.band).max(1);
    let merge_dist = ((opts.merge_dist_ratio * profile.scale.width as f32).round() as usize).max(2);
    let mut merged: Vec<usize> = Vec::new();
    for (s, e) in contiguous_runs(&columns) {
        if e - s + 1 > max_width {
            continue;
        }
        let c = (s + e) / 2;
        match merged.last_mut() {
            Some(prev) if c - *prev <= merge_dist => *prev = (*prev + c) / 2,
            _ => merged.push(c),
        }
    }
    merged
        .into_iter()
        .map(|c| profile.scale.x_to_source_round(c as f32))
        .collect()
}

/// Sweeps the configured quantiles and returns the best-fitting four lines
/// from the first quantile that yields enough candidates.
pub fn detect_separator_lines(
    mask: &ImageU8<'_>,
    params: &SegmentParams,
) -> Option<SeparatorLineSet> {
    if mask.is_empty() {
        return None;
    }
    let opts = &params.separators;
    let profile = run_length_profile(mask, params.analysis_width, opts);
    for &q in &params.quantiles {
        let centers = line_candidates(&profile, q, params.max_line_width, opts);
        debug!("separators: quantile={} candidates={:?}", q, centers);
        if centers.len() < LINE_COUNT {
            continue;
        }
        if let Some(lines) =
            pick_best_lines(&centers, mask.w, LINE_COUNT, opts.out_of_bounds_weight)
        {
            return SeparatorLineSet::new(&lines);
        }
    }
    None
}

/// Exhaustive search for the `count`-subset of `centers` with the most even
/// spacing, penalising sets whose extrapolated outer columns leave `[0, width]`.
///
/// Score = population variance of the gaps + `oob_weight` × overflow (px).
/// Ties keep the lexicographically first combination.
pub fn pick_best_lines(
    centers: &[usize],
    width: usize,
    count: usize,
    oob_weight: f32,
) -> Option<Vec<usize>> {
    if count < 2 || centers.len() < count {
        return None;
    }
    let mut sorted = centers.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();

    let mut best: Option<(f64, Vec<usize>)> = None;
    let mut idx: Vec<usize> = (0..count).collect();
    let mut gaps = vec![0i64; count - 1];
    let mut ordered = vec![0i64; count - 1];
    loop {
        for (g, pair) in gaps.iter_mut().zip(idx.windows(2)) {
            *g = sorted[pair[1]] as i64 - sorted[pair[0]] as i64;
        }
        if gaps.iter().all(|&g| g > 0) {
            let score = combination_score(&sorted, &idx, &gaps, &mut ordered, width, oob_weight);
            if best.as_ref().map_or(true, |(s, _)| score < *s) {
                best = Some((score, idx.iter().map(|&i| sorted[i]).collect()));
            }
        }
        if !next_combination(&mut idx, n) {
            break;
        }
    }
    best.map(|(_, lines)| lines)
}

fn combination_score(
    sorted: &[usize],
    idx: &[usize],
    gaps: &[i64],
    ordered: &mut [i64],
    width: usize,
    oob_weight: f32,
) -> f64 {
    ordered.copy_from_slice(gaps);
    ordered.sort_unstable();
    let spacing = ordered[ordered.len() / 2];
    let left = sorted[idx[0]] as i64 - spacing;
    let right = sorted[idx[idx.len() - 1]] as i64 + spacing;
    let mut penalty = 0i64;
    if left < 0 {
        penalty += -left;
    }
    if right > width as i64 {
        penalty += right - width as i64;
    }
    let mean = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;
    let variance = gaps
        .iter()
        .map(|&g| (g as f64 - mean).powi(2))
        .sum::<f64>()
        / gaps.len() as f64;
    variance + penalty as f64 * oob_weight as f64
}

/// Advances `idx` to the next k-combination of `0..n` in lexicographic order.
fn next_combination(idx: &mut [usize], n: usize) -> bool {
    let k = idx.len();
    let Some(i) = (0..k).rev().find(|&i| idx[i] < n - k + i) else {
        return false;
    };
    idx[i] += 1;
    for j in i + 1..k {
        idx[j] = idx[j - 1] + 1;
    }
    true
}

/// Checks a line set against the page width.
///
/// Returns the median gap as a share of `width` when the set has exactly four
/// lines, both outer lines sit at least `min_edge_ratio × width` inside the
/// edges, `min(gap) / max(gap) >= min_spacing_ratio`, and the median share
/// falls in `spacing_ratio_range` when one is configured.
pub fn validate_separator_lines(
    lines: &[usize],
    width: usize,
    opts: &LineValidationOptions,
) -> Option<f32> {
    if lines.len() != LINE_COUNT || width == 0 {
        return None;
    }
    let mut lines = lines.to_vec();
    lines.sort_unstable();
    let w = width as f32;
    if (lines[0] as f32) < w * opts.min_edge_ratio
        || (lines[LINE_COUNT - 1] as f32) > w * (1.0 - opts.min_edge_ratio)
    {
        return None;
    }
    let mut gaps: Vec<usize> = lines.windows(2).map(|p| p[1] - p[0]).collect();
    gaps.sort_unstable();
    let (min_gap, max_gap) = (gaps[0], gaps[gaps.len() - 1]);
    if min_gap == 0 || (min_gap as f32 / max_gap as f32) < opts.min_spacing_ratio {
        return None;
    }
    let ratio = gaps[gaps.len() / 2] as f32 / w;
    if let Some((lo, hi)) = opts.spacing_ratio_range {
        if ratio < lo || ratio > hi {
            return None;
        }
    }
    Some(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::GrayImageU8;

    fn vertical_lines(w: usize, h: usize, xs: &[usize], thickness: usize) -> GrayImageU8 {
        let mut img = GrayImageU8::filled(w, h, 0);
        for &x0 in xs {
            for y in 0..h {
                for x in x0..(x0 + thickness).min(w) {
                    img.set(x, y, 255);
                }
            }
        }
        img
    }

    #[test]
    fn even_candidates_are_returned_unchanged() {
        let centers = [200, 400, 600, 800];
        assert_eq!(
            pick_best_lines(&centers, 1000, 4, 2.0),
            Some(centers.to_vec())
        );
        assert_eq!(pick_best_lines(&centers[..3], 1000, 4, 2.0), None);
    }

    #[test]
    fn best_fit_ignores_stray_candidates() {
        let centers = [35, 200, 410, 600, 640, 800];
        assert_eq!(
            pick_best_lines(&centers, 1000, 4, 2.0),
            Some(vec![200, 410, 600, 800])
        );
    }

    #[test]
    fn duplicate_centres_never_form_a_set() {
        assert_eq!(pick_best_lines(&[100, 100, 100, 100], 1000, 4, 2.0), None);
        let picked = pick_best_lines(&[100, 100, 300, 500, 700], 1000, 4, 2.0);
        assert_eq!(picked, Some(vec![100, 300, 500, 700]));
    }

    #[test]
    fn noisy_candidate_lists_still_yield_an_even_set() {
        let mut state = 17u64;
        let mut centers = vec![200, 400, 600, 800];
        for _ in 0..60 {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            centers.push(((state >> 33) % 1000) as usize);
        }
        let lines = pick_best_lines(&centers, 1000, 4, 2.0).expect("lines");
        // The planted set scores zero, so the winner must too.
        let gaps: Vec<usize> = lines.windows(2).map(|p| p[1] - p[0]).collect();
        assert!(gaps.iter().all(|&g| g == gaps[0]), "lines={:?}", lines);
        assert!(lines[0] >= gaps[0], "lines={:?}", lines);
        assert!(lines[3] + gaps[0] <= 1000, "lines={:?}", lines);
    }

    #[test]
    fn combinations_are_enumerated_in_order() {
        let mut idx = vec![0, 1, 2];
        let mut seen = vec![idx.clone()];
        while next_combination(&mut idx, 5) {
            seen.push(idx.clone());
        }
        assert_eq!(seen.len(), 10);
        assert_eq!(seen[1], vec![0, 1, 3]);
        assert_eq!(seen[9], vec![2, 3, 4]);
    }

    #[test]
    fn thin_rules_are_detected() {
        let mask = vertical_lines(1000, 1200, &[200, 400, 600, 800], 2);
        let params = SegmentParams::default();
        let lines = detect_separator_lines(&mask.as_view(), &params).expect("lines");
        for (got, want) in lines.as_slice().iter().zip([200, 400, 600, 800]) {
            assert!(got.abs_diff(want) <= 2, "lines={:?}", lines);
        }
    }

    #[test]
    fn wide_blocks_are_not_rules() {
        let mask = vertical_lines(1000, 1200, &[100, 300, 500, 700], 40);
        let params = SegmentParams::default();
        assert_eq!(detect_separator_lines(&mask.as_view(), &params), None);
    }

    #[test]
    fn nearby_centres_are_merged() {
        let profile = RunLengthProfile {
            runs: {
                let mut runs = vec![0; 200];
                runs[50] = 100;
                runs[52] = 100;
                runs[120] = 100;
                runs
            },
            scale: AnalysisScale::for_width(200, 100, 200),
        };
        let opts = SeparatorOptions {
            band: 0,
            ..Default::default()
        };
        assert_eq!(line_candidates(&profile, 0.99, 3, &opts), vec![51, 120]);
    }

    #[test]
    fn uneven_spacing_is_rejected() {
        let opts = LineValidationOptions::default();
        // Gaps 50, 52, 400.
        assert_eq!(validate_separator_lines(&[100, 150, 202, 602], 1000, &opts), None);
        let ratio = validate_separator_lines(&[200, 400, 600, 800], 1000, &opts);
        assert_eq!(ratio, Some(0.2));
        // Outer line too close to the edge.
        assert_eq!(validate_separator_lines(&[20, 300, 600, 900], 1000, &opts), None);
        assert_eq!(validate_separator_lines(&[200, 400, 600], 1000, &opts), None);

        let ranged = LineValidationOptions {
            spacing_ratio_range: Some((0.05, 0.15)),
            ..Default::default()
        };
        assert_eq!(validate_separator_lines(&[200, 400, 600, 800], 1000, &ranged), None);
    }

    #[test]
    fn line_set_requires_strict_order() {
        assert!(SeparatorLineSet::new(&[1, 2, 3, 4]).is_some());
        assert!(SeparatorLineSet::new(&[1, 2, 2, 4]).is_none());
        assert!(SeparatorLineSet::new(&[1, 2, 3]).is_none());
        let set = SeparatorLineSet::new(&[100, 300, 500, 700]).expect("set");
        assert_eq!(set.gaps(), [200, 200, 200]);
        assert_eq!(set.shifted_left(50).map(|s| s.first()), Some(50));
        assert!(set.shifted_left(150).is_none());
    }
}
