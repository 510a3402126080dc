use crate::columns::ColumnBounds;
use crate::diagnostics::TimingBreakdown;
use crate::header::ContentTop;
use crate::separators::SeparatorLineSet;
use crate::trim::HorizontalTrim;
use serde::Serialize;

/// How the final separator lines were obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LineSource {
    /// First detection on the untrimmed region validated.
    Detected,
    /// Lines validated only after a trim and re-detection pass.
    Redetected,
    /// No valid lines; columns are equal slices of the trimmed width.
    Fallback,
}

/// Row-band summary below the content top.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSummary {
    pub count: usize,
    pub spacing: f32,
    pub bottom_offset: usize,
    pub bottom_pad: usize,
}

/// Everything the segmenter decided for one page, in source pixels.
///
/// `trim` and `columns` are relative to the cropped region; `columns` x
/// values are relative to `trim.left`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageReport {
    pub width: usize,
    pub height: usize,
    pub page_threshold: u8,
    pub region_threshold: u8,
    pub final_threshold: u8,
    pub content_top: ContentTop,
    pub rows: RowSummary,
    pub region_top: usize,
    pub region_bottom: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_lines: Option<SeparatorLineSet>,
    pub trim: HorizontalTrim,
    pub redetect_passes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<SeparatorLineSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_quality: Option<f32>,
    pub line_source: LineSource,
    pub columns: ColumnBounds,
    pub timings: TimingBreakdown,
}
