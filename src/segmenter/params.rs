//! Parameter types configuring the segmentation stages.
//!
//! Every multiplicative factor the stages use lives here under a name, so a
//! scan corpus with different typography can be tuned from a JSON config
//! without touching the algorithms. Top-level fields are the knobs exposed
//! to operators; the nested option groups hold the per-stage constants.
//!
//! Units: "analysis px" means pixels at the downscaled analysis width,
//! "px" means source pixels, ratios are fractions of the relevant extent.

use serde::{Deserialize, Serialize};

/// Pipeline-wide parameters.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SegmentParams {
    /// Width of the downscaled copy used for density work (px).
    pub analysis_width: usize,
    /// Floor for the row-density threshold (ink fraction).
    pub row_threshold: f32,
    /// Row smoothing window (analysis px, bumped to odd).
    pub row_window: usize,
    /// Minimum run of above-threshold rows forming a band (analysis px).
    pub min_run: usize,
    /// Padding added around crop boxes (px).
    pub pad: usize,
    /// Manual binarization threshold; `None` estimates one per region.
    pub threshold: Option<u8>,
    /// Candidate run-length quantiles for separator detection, strict to loose.
    pub quantiles: Vec<f32>,
    /// Widest separator rule accepted (analysis px, before band widening).
    pub max_line_width: usize,
    /// Outer columns extend past the outer rules by this share of the inner gap.
    pub edge_margin_ratio: f32,
    /// Re-mask/re-detect passes allowed after margin trimming.
    pub redetect_passes: usize,
    pub mask: MaskOptions,
    pub header: HeaderOptions,
    pub rows: RowOptions,
    pub separators: SeparatorOptions,
    pub validation: LineValidationOptions,
    pub trim: TrimOptions,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            analysis_width: 800,
            row_threshold: 0.01,
            row_window: 5,
            min_run: 5,
            pad: 6,
            threshold: None,
            quantiles: vec![0.999, 0.995, 0.99, 0.985],
            max_line_width: 3,
            edge_margin_ratio: 0.2,
            redetect_passes: 1,
            mask: MaskOptions::default(),
            header: HeaderOptions::default(),
            rows: RowOptions::default(),
            separators: SeparatorOptions::default(),
            validation: LineValidationOptions::default(),
            trim: TrimOptions::default(),
        }
    }
}

/// Binarization threshold estimation.
///
/// The Otsu estimate is biased towards `peak - peak_offset` when a bright
/// paper peak in `[peak_search_min, 255]` holds at least `peak_min_share` of
/// all pixels.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct MaskOptions {
    pub peak_search_min: u8,
    pub peak_min_share: f32,
    pub peak_offset: u8,
    pub estimate_min: u8,
    pub estimate_max: u8,
    /// Caller cap applied to both estimated and manual thresholds.
    pub max_threshold: u8,
    pub final_min: u8,
    pub final_max: u8,
}

impl Default for MaskOptions {
    fn default() -> Self {
        Self {
            peak_search_min: 200,
            peak_min_share: 0.05,
            peak_offset: 12,
            estimate_min: 120,
            estimate_max: 245,
            max_threshold: 220,
            final_min: 90,
            final_max: 250,
        }
    }
}

/// Header rule search and the headerless-page heuristic.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderOptions {
    /// Upper bound on the analysis width used for rule detection (px).
    pub rule_analysis_width: usize,
    /// Vertical band searched for the rule, as fractions of page height.
    pub min_y_ratio: f32,
    pub max_y_ratio: f32,
    /// Rows either side of the candidate row OR-ed into one sample.
    pub band: usize,
    pub gap_allow: usize,
    /// Required longest-run / width ratio to accept a rule.
    pub min_run_ratio: f32,
    /// Box-resampled values above this count as ink.
    pub ink_threshold: u8,
    /// Row ink fraction for the density-sweep fallback.
    pub density_min: f32,
    /// Content starts this far below the rule (px).
    pub rule_offset: usize,
    /// Left strip (share of width) profiled on headerless pages.
    pub headerless_strip_ratio: f32,
    /// Rows denser than `median * header_density_factor` count as header text.
    pub header_density_factor: f32,
    /// Evenly spaced rows required to mark the start of content.
    pub stable_run_len: usize,
    /// Allowed relative deviation from the row spacing inside that run.
    pub stable_tolerance: f32,
    /// Content top sits this many row spacings above the first stable row.
    pub start_offset_factor: f32,
    /// Rows either side of a row centre sampled for its density (analysis px).
    pub density_window: usize,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            rule_analysis_width: 1200,
            min_y_ratio: 0.03,
            max_y_ratio: 0.45,
            band: 1,
            gap_allow: 2,
            min_run_ratio: 0.6,
            ink_threshold: 10,
            density_min: 0.5,
            rule_offset: 8,
            headerless_strip_ratio: 0.9,
            header_density_factor: 1.6,
            stable_run_len: 6,
            stable_tolerance: 0.35,
            start_offset_factor: 0.6,
            density_window: 2,
        }
    }
}

/// Row-band profiling and bottom-of-content detection.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct RowOptions {
    /// Left strip (share of width) used as the per-row proxy column.
    pub strip_ratio: f32,
    /// Position of the band threshold between median and p90.
    pub threshold_factor: f32,
    /// Band minimum length as a share of analysis height.
    pub min_run_height_ratio: f32,
    /// Row spacing assumed when fewer than two bands are found (analysis px).
    pub default_spacing: f32,
    pub bottom_threshold_factor: f32,
    pub bottom_min_run: usize,
    /// Extra space below the last row, as a share of row spacing.
    pub bottom_pad_factor: f32,
}

impl Default for RowOptions {
    fn default() -> Self {
        Self {
            strip_ratio: 0.2,
            threshold_factor: 0.5,
            min_run_height_ratio: 0.004,
            default_spacing: 20.0,
            bottom_threshold_factor: 0.4,
            bottom_min_run: 3,
            bottom_pad_factor: 0.2,
        }
    }
}

/// Vertical separator candidate extraction.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SeparatorOptions {
    /// Columns either side OR-ed into one sample (analysis px).
    pub band: usize,
    pub gap_allow: usize,
    /// Absolute run-length floor as a share of analysis height.
    pub min_run_ratio: f32,
    /// Centres closer than this share of analysis width are averaged.
    pub merge_dist_ratio: f32,
    /// Box-resampled values above this count as ink.
    pub ink_threshold: u8,
    /// Columns kept by run length when no column reaches the threshold.
    pub fallback_candidates: usize,
    /// Weight of the out-of-page penalty against spacing variance.
    pub out_of_bounds_weight: f32,
}

impl Default for SeparatorOptions {
    fn default() -> Self {
        Self {
            band: 2,
            gap_allow: 2,
            min_run_ratio: 0.3,
            merge_dist_ratio: 0.006,
            ink_threshold: 10,
            fallback_candidates: 40,
            out_of_bounds_weight: 2.0,
        }
    }
}

/// Acceptance rules for a detected separator line set.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LineValidationOptions {
    /// Outer lines must sit at least this share of width inside each edge.
    pub min_edge_ratio: f32,
    /// Required min(gap) / max(gap).
    pub min_spacing_ratio: f32,
    /// Optional accepted range for median gap / width.
    pub spacing_ratio_range: Option<(f32, f32)>,
}

impl Default for LineValidationOptions {
    fn default() -> Self {
        Self {
            min_edge_ratio: 0.04,
            min_spacing_ratio: 0.6,
            spacing_ratio_range: None,
        }
    }
}

/// Left/right margin trimming.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct TrimOptions {
    /// Lower bound for the column smoothing window (analysis px).
    pub min_smooth_window: usize,
    /// Absolute floor for the column-density threshold.
    pub density_floor: f32,
    /// Threshold as a multiple of the median column density.
    pub threshold_factor: f32,
    pub min_run: usize,
    pub margin_left_ratio: f32,
    pub margin_right_ratio: f32,
    /// Most that may be trimmed from each side, as a share of width.
    pub max_trim_left_ratio: f32,
    pub max_trim_right_ratio: f32,
}

impl Default for TrimOptions {
    fn default() -> Self {
        Self {
            min_smooth_window: 5,
            density_floor: 0.002,
            threshold_factor: 0.2,
            min_run: 3,
            margin_left_ratio: 0.015,
            margin_right_ratio: 0.04,
            max_trim_left_ratio: 0.08,
            max_trim_right_ratio: 0.04,
        }
    }
}
