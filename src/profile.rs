//! Density profiles and the small numeric kernels shared by every stage.
//!
//! A density profile is one `f32` per row (or column) of a mask holding the
//! fraction of ink pixels in that band. Stages smooth it with a centred box
//! filter, derive a dynamic threshold from its percentiles, and then look for
//! contiguous runs above that threshold.
use crate::image::ImageView;

/// Pixel value marking ink in a binary mask.
pub const INK: u8 = 255;

/// Nearest-rank percentile of `values` (`p` clamped to `[0, 1]`).
///
/// Sorts a copy and picks index `round((n - 1) * p)`. Empty input yields 0.
pub fn percentile(values: &[f32], p: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let p = p.clamp(0.0, 1.0);
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let idx = ((sorted.len() - 1) as f32 * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Arithmetic median (mean of the two middle values for even lengths).
pub fn median(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

/// Centred moving average with a box of `window` samples, truncated at the
/// ends. Linear time via prefix sums; `window <= 1` returns the input.
pub fn smooth_densities(values: &[f32], window: usize) -> Vec<f32> {
    if window <= 1 {
        return values.to_vec();
    }
    let half = window / 2;
    let mut prefix = Vec::with_capacity(values.len() + 1);
    prefix.push(0.0f64);
    for &v in values {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + v as f64);
    }
    let n = values.len();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(n);
            ((prefix[hi] - prefix[lo]) / (hi - lo) as f64) as f32
        })
        .collect()
}

/// Smoothing windows are centred, so even sizes are bumped to the next odd.
pub fn odd_window(window: usize) -> usize {
    let w = window.max(1);
    if w % 2 == 0 {
        w + 1
    } else {
        w
    }
}

/// `median + factor * (p90 - median)`: sits between body and peak density.
pub fn spread_threshold(smoothed: &[f32], factor: f32) -> f32 {
    let q50 = percentile(smoothed, 0.5);
    let q90 = percentile(smoothed, 0.9);
    q50 + (q90 - q50) * factor
}

/// Fraction of exact-ink pixels per row, restricted to columns `[0, strip)`.
pub fn row_ink_fractions<V: ImageView>(mask: &V, strip: usize) -> Vec<f32> {
    let strip = strip.clamp(1, mask.width().max(1));
    mask.rows()
        .map(|row| {
            let ink = row.iter().take(strip).filter(|&&v| v == INK).count();
            ink as f32 / strip as f32
        })
        .collect()
}

/// Fraction of non-zero pixels per column.
pub fn column_coverage<V: ImageView>(mask: &V) -> Vec<f32> {
    let w = mask.width();
    let h = mask.height();
    let mut counts = vec![0usize; w];
    for row in mask.rows() {
        for (c, &v) in counts.iter_mut().zip(row) {
            if v != 0 {
                *c += 1;
            }
        }
    }
    let h = h.max(1) as f32;
    counts.into_iter().map(|c| c as f32 / h).collect()
}

/// Groups ascending indices into inclusive `(start, end)` runs of consecutive values.
pub fn contiguous_runs(indices: &[usize]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut iter = indices.iter().copied();
    let Some(first) = iter.next() else {
        return runs;
    };
    let (mut start, mut prev) = (first, first);
    for idx in iter {
        if idx == prev + 1 {
            prev = idx;
            continue;
        }
        runs.push((start, prev));
        start = idx;
        prev = idx;
    }
    runs.push((start, prev));
    runs
}

/// Inclusive runs of samples at or above `threshold`.
pub fn runs_above(values: &[f32], threshold: f32) -> Vec<(usize, usize)> {
    let indices: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v >= threshold)
        .map(|(i, _)| i)
        .collect();
    contiguous_runs(&indices)
}

/// Start index of the first run of `min_run` samples `>= threshold`, scanning forward.
pub fn first_run_from_start(values: &[f32], threshold: f32, min_run: usize) -> Option<usize> {
    let min_run = min_run.max(1);
    let mut run = 0usize;
    for (i, &v) in values.iter().enumerate() {
        if v >= threshold {
            run += 1;
            if run >= min_run {
                return Some(i + 1 - min_run);
            }
        } else {
            run = 0;
        }
    }
    None
}

/// End index of the first run of `min_run` samples `>= threshold`, scanning backward.
pub fn first_run_from_end(values: &[f32], threshold: f32, min_run: usize) -> Option<usize> {
    let min_run = min_run.max(1);
    let mut run = 0usize;
    for (i, &v) in values.iter().enumerate().rev() {
        if v >= threshold {
            run += 1;
            if run >= min_run {
                return Some(i + min_run - 1);
            }
        } else {
            run = 0;
        }
    }
    None
}

/// Longest run counter that bridges up to `gap_allow` consecutive misses.
///
/// Bridged misses count towards the run length, so a dashed or broken rule
/// scores close to its full extent.
#[derive(Clone, Copy, Debug, Default)]
pub struct TolerantRun {
    gap_allow: usize,
    run: usize,
    gap: usize,
    best: usize,
}

impl TolerantRun {
    pub fn new(gap_allow: usize) -> Self {
        Self {
            gap_allow,
            ..Default::default()
        }
    }

    #[inline]
    pub fn step(&mut self, ink: bool) {
        if ink {
            self.run += 1;
            self.gap = 0;
        } else if self.run > 0 && self.gap < self.gap_allow {
            self.gap += 1;
            self.run += 1;
        } else {
            self.best = self.best.max(self.run);
            self.run = 0;
            self.gap = 0;
        }
    }

    /// Longest run seen, including one still open.
    pub fn longest(&self) -> usize {
        self.best.max(self.run)
    }
}
