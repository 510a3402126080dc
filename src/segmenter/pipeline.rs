//! Per-page segmentation pipeline.
//!
//! [`PageSegmenter`] is a pure function of the page bitmap and its
//! [`SegmentParams`]: it holds no mutable state and can be shared across
//! worker threads.
//!
//! Typical usage:
//! ```no_run
//! use page_columns::image::ImageU8;
//! use page_columns::{PageSegmenter, SegmentParams};
//!
//! # fn example(page: ImageU8) {
//! let segmenter = PageSegmenter::new(SegmentParams::default());
//! let seg = segmenter.segment(page);
//! for col in segmenter.crop_columns(page, &seg) {
//!     println!("{}x{}", col.width(), col.height());
//! }
//! # }
//! ```
use super::params::SegmentParams;
use crate::columns::{compose_column_bounds, ColumnBounds};
use crate::diagnostics::{elapsed_ms, LineSource, PageReport, RowSummary, TimingBreakdown};
use crate::header::{locate_content_top, ContentTop, TopSource};
use crate::image::{GrayImageU8, ImageU8};
use crate::mask::{build_ink_mask, InkMask};
use crate::rows::{detect_bottom, detect_row_centers};
use crate::separators::{detect_separator_lines, validate_separator_lines, SeparatorLineSet};
use crate::trim::{detect_horizontal_trim, HorizontalTrim};
use log::debug;
use serde::Serialize;
use std::time::Instant;

/// Vertical extent `[top, bottom)` of the content on the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CropRegion {
    pub top: usize,
    pub bottom: usize,
}

impl CropRegion {
    pub fn height(&self) -> usize {
        self.bottom.saturating_sub(self.top)
    }
}

/// Column rectangle in page coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Geometry decided for one page.
#[derive(Clone, Debug)]
pub struct PageSegmentation {
    pub region: CropRegion,
    /// Horizontal extent kept inside the region.
    pub trim: HorizontalTrim,
    /// Validated lines relative to `trim.left`; `None` means equal slices.
    pub lines: Option<SeparatorLineSet>,
    /// Column intervals relative to `trim.left`.
    pub columns: ColumnBounds,
    /// Ink mask of the final (trimmed) region.
    pub region_mask: InkMask,
    pub report: PageReport,
}

impl PageSegmentation {
    /// The five column rectangles in page coordinates.
    pub fn column_rects(&self) -> Vec<ColumnRect> {
        self.columns
            .iter()
            .map(|(l, r)| ColumnRect {
                x: self.trim.left + l,
                y: self.region.top,
                width: r - l,
                height: self.region.height(),
            })
            .collect()
    }
}

/// Region under analysis: a view of the page plus its mask.
struct WorkingRegion<'a> {
    view: ImageU8<'a>,
    mask: InkMask,
    left: usize,
}

impl<'a> WorkingRegion<'a> {
    fn new(view: ImageU8<'a>, params: &SegmentParams) -> Self {
        let mask = build_ink_mask(&view, params.threshold, &params.mask);
        Self {
            view,
            mask,
            left: 0,
        }
    }

    fn width(&self) -> usize {
        self.view.w
    }

    /// Crops to `trim` and rebuilds the mask for the narrower content.
    fn trimmed(self, trim: HorizontalTrim, params: &SegmentParams) -> Self {
        let view = self.view.sub_view(trim.left, 0, trim.right, self.view.h);
        let mask = build_ink_mask(&view, params.threshold, &params.mask);
        Self {
            view,
            mask,
            left: self.left + trim.left,
        }
    }
}

pub struct PageSegmenter {
    params: SegmentParams,
}

impl PageSegmenter {
    pub fn new(params: SegmentParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SegmentParams {
        &self.params
    }

    /// Runs every stage on `page`. Never fails: missing structure resolves
    /// to fallbacks and always yields five columns.
    pub fn segment(&self, page: ImageU8<'_>) -> PageSegmentation {
        let params = &self.params;
        let total_start = Instant::now();
        let mut timings = TimingBreakdown::default();
        let (w, h) = (page.w, page.h);

        let page_mask = timings.time("mask", || {
            build_ink_mask(&page, params.threshold, &params.mask)
        });
        let page_view = page_mask.as_view();

        let content_top = if h == 0 || w == 0 {
            ContentTop {
                y: 0,
                source: TopSource::Headerless,
            }
        } else {
            timings.time("header", || locate_content_top(&page_view, params))
        };

        let rows_start = Instant::now();
        let bands = detect_row_centers(&page_view, content_top.y, params.rows.strip_ratio, params);
        let bottom_pad = if bands.is_empty() {
            params.pad
        } else {
            params
                .pad
                .max((bands.spacing * params.rows.bottom_pad_factor) as usize)
        };
        let bottom_offset = detect_bottom(&page_view, content_top.y, params);
        let region = {
            let top = content_top.y.saturating_sub(params.pad);
            let bottom = (content_top.y + bottom_offset + bottom_pad).min(h);
            CropRegion {
                top,
                bottom: bottom.max(top.min(h)),
            }
        };
        timings.push("rows", elapsed_ms(rows_start));
        debug!(
            "PageSegmenter::segment {}x{} top={} ({:?}) rows={} spacing={:.1} region={}..{}",
            w,
            h,
            content_top.y,
            content_top.source,
            bands.centers.len(),
            bands.spacing,
            region.top,
            region.bottom
        );

        let mut state = timings.time("region_mask", || {
            WorkingRegion::new(page.sub_view(0, region.top, w, region.bottom), params)
        });
        let region_threshold = state.mask.threshold();

        let sep_start = Instant::now();
        let initial_lines = detect_separator_lines(&state.mask.as_view(), params);
        let mut lines = initial_lines;
        let mut quality = self.validate(lines.as_ref(), state.width());
        timings.push("separators", elapsed_ms(sep_start));
        let mut source = if quality.is_some() {
            LineSource::Detected
        } else {
            LineSource::Fallback
        };

        let trim_start = Instant::now();
        let mut pending = detect_horizontal_trim(&state.mask.as_view(), params);
        if let (Some(set), Some(_)) = (lines.as_ref(), quality) {
            pending = guard_trim(pending, set, state.width());
        }
        timings.push("trim", elapsed_ms(trim_start));

        let full_width = state.width();
        let mut passes = 0;
        loop {
            let changed = !pending.is_full(state.width());
            if changed {
                let remask_start = Instant::now();
                state = state.trimmed(pending, params);
                lines = lines.and_then(|set| set.shifted_left(pending.left));
                quality = self.validate(lines.as_ref(), state.width());
                timings.push("remask", elapsed_ms(remask_start));
            }
            if quality.is_some() || !changed || passes >= params.redetect_passes {
                break;
            }
            passes += 1;
            let redetect_start = Instant::now();
            lines = detect_separator_lines(&state.mask.as_view(), params);
            quality = self.validate(lines.as_ref(), state.width());
            timings.push("redetect", elapsed_ms(redetect_start));
            debug!(
                "PageSegmenter::segment redetect pass {} width={} lines={:?} valid={}",
                passes,
                state.width(),
                lines,
                quality.is_some()
            );
            if quality.is_some() {
                source = LineSource::Redetected;
                break;
            }
            if passes >= params.redetect_passes {
                break;
            }
            pending = detect_horizontal_trim(&state.mask.as_view(), params).within_budget(
                state.left,
                state.width(),
                full_width,
                &params.trim,
            );
        }

        if quality.is_none() {
            lines = None;
            source = LineSource::Fallback;
        }
        let trim = HorizontalTrim {
            left: state.left,
            right: state.left + state.width(),
        };
        let columns = compose_column_bounds(
            state.width(),
            lines.as_ref(),
            params.pad,
            params.edge_margin_ratio,
        );

        timings.total_ms = elapsed_ms(total_start);
        debug!(
            "PageSegmenter::segment trim=[{}, {}) lines={:?} source={:?} latency_ms={:.3}",
            trim.left, trim.right, lines, source, timings.total_ms
        );

        let report = PageReport {
            width: w,
            height: h,
            page_threshold: page_mask.threshold(),
            region_threshold,
            final_threshold: state.mask.threshold(),
            content_top,
            rows: RowSummary {
                count: bands.centers.len(),
                spacing: bands.spacing,
                bottom_offset,
                bottom_pad,
            },
            region_top: region.top,
            region_bottom: region.bottom,
            initial_lines,
            trim,
            redetect_passes: passes,
            lines,
            line_quality: quality,
            line_source: source,
            columns,
            timings,
        };

        PageSegmentation {
            region,
            trim,
            lines,
            columns,
            region_mask: state.mask,
            report,
        }
    }

    /// Copies the five column crops out of `page`.
    pub fn crop_columns(&self, page: ImageU8<'_>, seg: &PageSegmentation) -> Vec<GrayImageU8> {
        seg.column_rects()
            .into_iter()
            .map(|r| {
                page.sub_view(r.x, r.y, r.x + r.width, r.y + r.height)
                    .to_owned_image()
            })
            .collect()
    }

    fn validate(&self, lines: Option<&SeparatorLineSet>, width: usize) -> Option<f32> {
        lines.and_then(|set| {
            validate_separator_lines(set.as_slice(), width, &self.params.validation)
        })
    }
}

/// Keeps at least one mean column width outside the outer lines.
fn guard_trim(trim: HorizontalTrim, lines: &SeparatorLineSet, width: usize) -> HorizontalTrim {
    let mean = lines.mean_gap();
    let left_limit = (lines.first() as f32 - mean).max(0.0) as usize;
    let right_limit = ((lines.last() as f32 + mean) as usize).min(width);
    HorizontalTrim {
        left: trim.left.min(left_limit),
        right: trim.right.max(right_limit),
    }
}
