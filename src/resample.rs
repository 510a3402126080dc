//! Analysis-resolution geometry and downscaling.
//!
//! Every density and run-length stage works on a copy of its input scaled to
//! a fixed analysis width (800 px by default) so that thresholds expressed in
//! analysis pixels behave the same for 300 and 600 dpi scans. [`AnalysisScale`]
//! records the mapping and lifts analysis coordinates back to source pixels.
//!
//! Two resampling modes mirror what the stages need:
//! - [`Resample::Nearest`] keeps mask values binary (row/column ink counts
//!   compare against 255).
//! - [`Resample::Box`] area-averages, so a 1–2 px rule survives as a faint
//!   non-zero column even when the downscale factor exceeds its width.
use crate::image::{GrayImageU8, ImageU8, ImageView, ImageViewMut};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resample {
    Nearest,
    Box,
}

/// Mapping between a source raster and its analysis-resolution copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalysisScale {
    pub source_width: usize,
    pub source_height: usize,
    pub width: usize,
    pub height: usize,
}

impl AnalysisScale {
    /// Analysis geometry for `target_width`, never upscaling and never empty.
    ///
    /// Height keeps the aspect ratio, truncated, with a floor of one row.
    pub fn for_width(source_width: usize, source_height: usize, target_width: usize) -> Self {
        let width = target_width.min(source_width).max(1);
        let height = if source_width == 0 {
            1
        } else {
            (source_height * width / source_width).max(1)
        };
        Self {
            source_width,
            source_height,
            width,
            height,
        }
    }

    /// Source pixels per analysis column.
    pub fn scale_x(&self) -> f32 {
        self.source_width as f32 / self.width as f32
    }

    /// Source pixels per analysis row.
    pub fn scale_y(&self) -> f32 {
        self.source_height as f32 / self.height as f32
    }

    /// Analysis column → source x, truncated.
    pub fn x_to_source(&self, x: f32) -> usize {
        (x * self.scale_x()).max(0.0) as usize
    }

    /// Analysis column → source x, rounded to nearest.
    pub fn x_to_source_round(&self, x: f32) -> usize {
        (x * self.scale_x()).max(0.0).round() as usize
    }

    /// Analysis row → source y, truncated.
    pub fn y_to_source(&self, y: f32) -> usize {
        (y * self.scale_y()).max(0.0) as usize
    }

    /// Source y → analysis row, truncated and clamped to the analysis height.
    pub fn y_from_source(&self, y: usize) -> usize {
        if self.source_height == 0 {
            return 0;
        }
        (y * self.height / self.source_height).min(self.height - 1)
    }
}

/// Downscale `src` to the analysis geometry described by `scale`.
pub fn downscale(src: &ImageU8<'_>, scale: &AnalysisScale, mode: Resample) -> GrayImageU8 {
    let mut dst = GrayImageU8::filled(scale.width, scale.height, 0);
    if src.is_empty() {
        return dst;
    }
    match mode {
        Resample::Nearest => downscale_nearest(src, &mut dst),
        Resample::Box => downscale_box(src, &mut dst),
    }
    dst
}

fn downscale_nearest(src: &ImageU8<'_>, dst: &mut GrayImageU8) {
    let (sw, sh) = (src.w, src.h);
    let (dw, dh) = (dst.width(), dst.height());
    let map_x: Vec<usize> = (0..dw)
        .map(|x| nearest_index(x, sw, dw))
        .collect();
    for y in 0..dh {
        let src_row = src.row(nearest_index(y, sh, dh));
        let dst_row = dst.row_mut(y);
        for (dst_px, &sx) in dst_row.iter_mut().zip(&map_x) {
            *dst_px = src_row[sx];
        }
    }
}

fn nearest_index(dst_idx: usize, src_len: usize, dst_len: usize) -> usize {
    let pos = ((dst_idx as f64 + 0.5) * src_len as f64 / dst_len as f64) as usize;
    pos.min(src_len - 1)
}

fn downscale_box(src: &ImageU8<'_>, dst: &mut GrayImageU8) {
    let (dw, dh) = (dst.width(), dst.height());
    let x_bins = bin_edges(src.w, dw);
    let y_bins = bin_edges(src.h, dh);
    let mut acc = vec![0u64; dw];
    for y in 0..dh {
        acc.iter_mut().for_each(|a| *a = 0);
        let (sy0, sy1) = (y_bins[y], y_bins[y + 1]);
        for sy in sy0..sy1 {
            let src_row = src.row(sy);
            for (x, a) in acc.iter_mut().enumerate() {
                *a += src_row[x_bins[x]..x_bins[x + 1]]
                    .iter()
                    .map(|&v| v as u64)
                    .sum::<u64>();
            }
        }
        let rows = (sy1 - sy0) as u64;
        let dst_row = dst.row_mut(y);
        for (x, dst_px) in dst_row.iter_mut().enumerate() {
            let count = rows * (x_bins[x + 1] - x_bins[x]) as u64;
            *dst_px = if count == 0 {
                0
            } else {
                ((acc[x] + count / 2) / count).min(255) as u8
            };
        }
    }
}

/// `dst_len + 1` monotone source offsets; every bin holds at least one sample
/// when `dst_len <= src_len`.
fn bin_edges(src_len: usize, dst_len: usize) -> Vec<usize> {
    let mut edges: Vec<usize> = (0..=dst_len).map(|i| i * src_len / dst_len).collect();
    for i in 1..edges.len() {
        if edges[i] <= edges[i - 1] {
            edges[i] = (edges[i - 1] + 1).min(src_len);
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_geometry_never_upscales() {
        let s = AnalysisScale::for_width(400, 1000, 800);
        assert_eq!((s.width, s.height), (400, 1000));
        let s = AnalysisScale::for_width(1000, 2000, 800);
        assert_eq!((s.width, s.height), (800, 1600));
        assert_eq!(s.x_to_source_round(160.0), 200);
        assert_eq!(s.y_to_source(800.0), 1000);
        let flat = AnalysisScale::for_width(1000, 1, 800);
        assert_eq!(flat.height, 1);
    }

    #[test]
    fn box_downscale_keeps_thin_rule_visible() {
        let mut img = GrayImageU8::filled(100, 10, 0);
        for y in 0..10 {
            img.set(41, y, 255);
        }
        let scale = AnalysisScale::for_width(100, 10, 25);
        let boxed = downscale(&img.as_view(), &scale, Resample::Box);
        assert_eq!(boxed.width(), 25);
        let col: Vec<u8> = (0..boxed.width()).map(|x| boxed.get(x, 0)).collect();
        assert!(col[10] > 10, "rule column averaged away: {:?}", col);
        assert_eq!(col.iter().filter(|&&v| v > 0).count(), 1);
    }

    #[test]
    fn nearest_downscale_stays_binary() {
        let data = (0..64 * 32).map(|i| if i % 3 == 0 { 255 } else { 0 }).collect();
        let img = GrayImageU8::new(64, 32, data);
        let scale = AnalysisScale::for_width(64, 32, 20);
        let small = downscale(&img.as_view(), &scale, Resample::Nearest);
        assert!(small.data().iter().all(|&v| v == 0 || v == 255));
    }
}
