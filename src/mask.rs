//! Ink/background binarization.
//!
//! The threshold is Otsu's over the 256-bin histogram, nudged upwards when
//! the scan has a distinct bright paper peak: faint print on bright paper
//! otherwise ends up split across both Otsu classes. The estimate is then
//! clamped, capped by the caller, and clamped again into a final safe range.
//!
//! The mask must be rebuilt whenever the analysed region changes, because
//! the histogram (and so the threshold) depends on what the region contains.
use crate::image::{GrayImageU8, ImageU8, ImageView, ImageViewMut};
use crate::profile::INK;
use crate::segmenter::params::MaskOptions;

/// Binary mask (ink = 255, background = 0) plus the threshold that made it.
#[derive(Clone, Debug)]
pub struct InkMask {
    image: GrayImageU8,
    threshold: u8,
}

impl InkMask {
    pub fn width(&self) -> usize {
        self.image.width()
    }

    pub fn height(&self) -> usize {
        self.image.height()
    }

    /// Threshold applied: pixels strictly darker became ink.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn as_view(&self) -> ImageU8<'_> {
        self.image.as_view()
    }

    pub fn image(&self) -> &GrayImageU8 {
        &self.image
    }

    /// Share of pixels marked as ink.
    pub fn ink_fraction(&self) -> f32 {
        let total = self.width() * self.height();
        if total == 0 {
            return 0.0;
        }
        let ink = self.image.data().iter().filter(|&&v| v == INK).count();
        ink as f32 / total as f32
    }
}

/// Otsu's threshold: the bin maximising between-class variance.
///
/// Returns 128 for an empty histogram.
pub fn otsu_threshold(hist: &[u64; 256]) -> u8 {
    let total: u64 = hist.iter().sum();
    if total == 0 {
        return 128;
    }
    let sum_total: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();
    let mut sum_b = 0.0f64;
    let mut weight_b = 0.0f64;
    let mut max_var = -1.0f64;
    let mut threshold = 128u8;
    for (i, &count) in hist.iter().enumerate() {
        weight_b += count as f64;
        if weight_b == 0.0 {
            continue;
        }
        let weight_f = total as f64 - weight_b;
        if weight_f == 0.0 {
            break;
        }
        sum_b += i as f64 * count as f64;
        let mean_b = sum_b / weight_b;
        let mean_f = (sum_total - sum_b) / weight_f;
        let var_between = weight_b * weight_f * (mean_b - mean_f).powi(2);
        if var_between > max_var {
            max_var = var_between;
            threshold = i as u8;
        }
    }
    threshold
}

/// Otsu with the bright-paper bias, clamped to `[estimate_min, estimate_max]`.
pub fn estimate_ink_threshold(hist: &[u64; 256], opts: &MaskOptions) -> u8 {
    let total: u64 = hist.iter().sum();
    if total == 0 {
        return 128;
    }
    let otsu = otsu_threshold(hist);
    // Lowest index wins among equal peaks.
    let lo = opts.peak_search_min as usize;
    let (peak_idx, peak_count) = (lo..256).fold((lo, 0u64), |best, i| {
        if hist[i] > best.1 {
            (i, hist[i])
        } else {
            best
        }
    });
    let peak_share = peak_count as f32 / total as f32;
    let threshold = if peak_share >= opts.peak_min_share {
        otsu.max(peak_idx.saturating_sub(opts.peak_offset as usize) as u8)
    } else {
        otsu
    };
    threshold.clamp(opts.estimate_min, opts.estimate_max.max(opts.estimate_min))
}

/// Final threshold for a region: manual or estimated, capped, then clamped.
pub fn resolve_threshold(gray: &ImageU8<'_>, manual: Option<u8>, opts: &MaskOptions) -> u8 {
    let threshold = match manual {
        Some(t) => t,
        None => estimate_ink_threshold(&gray.histogram(), opts),
    };
    threshold
        .min(opts.max_threshold)
        .clamp(opts.final_min, opts.final_max.max(opts.final_min))
}

/// Binarize `gray`: 255 where the pixel is darker than the threshold, else 0.
pub fn build_ink_mask(gray: &ImageU8<'_>, manual: Option<u8>, opts: &MaskOptions) -> InkMask {
    let threshold = resolve_threshold(gray, manual, opts);
    let mut image = GrayImageU8::filled(gray.w, gray.h, 0);
    for y in 0..gray.h {
        let src = gray.row(y);
        let dst = image.row_mut(y);
        for (d, &s) in dst.iter_mut().zip(src) {
            *d = if s < threshold { INK } else { 0 };
        }
    }
    InkMask { image, threshold }
}
