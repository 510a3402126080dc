//! Five contiguous column intervals from a separator line set.
use crate::separators::SeparatorLineSet;
use serde::Serialize;

pub const COLUMN_COUNT: usize = 5;

/// Five ascending `[left, right)` intervals with `right[i] == left[i + 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnBounds([(usize, usize); COLUMN_COUNT]);

impl ColumnBounds {
    pub fn as_slice(&self) -> &[(usize, usize)] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().copied()
    }

    pub fn left(&self) -> usize {
        self.0[0].0
    }

    pub fn right(&self) -> usize {
        self.0[COLUMN_COUNT - 1].1
    }
}

/// Composes column bounds for a region `width` px wide.
///
/// With lines, the outer columns mirror the neighbouring inner gap, widened
/// by `edge_margin_ratio` of that gap plus `pad`, and clipped to the region.
/// Without lines the padded width is cut into equal slices.
pub fn compose_column_bounds(
    width: usize,
    lines: Option<&SeparatorLineSet>,
    pad: usize,
    edge_margin_ratio: f32,
) -> ColumnBounds {
    match lines {
        Some(lines) => bounds_from_lines(width, lines, pad, edge_margin_ratio),
        None => equal_slices(width, pad),
    }
}

fn bounds_from_lines(
    width: usize,
    lines: &SeparatorLineSet,
    pad: usize,
    edge_margin_ratio: f32,
) -> ColumnBounds {
    let [l0, l1, l2, l3] = lines.as_array();
    let [left_gap, _, right_gap] = lines.gaps();
    let margin_left = (left_gap as f32 * edge_margin_ratio) as usize;
    let margin_right = (right_gap as f32 * edge_margin_ratio) as usize;
    let left = l0
        .saturating_sub(left_gap + margin_left)
        .saturating_sub(pad);
    let right = (l3 + right_gap + margin_right + pad).min(width);
    // Lines from a wider region may sit past a narrow width; keep order.
    let right = right.max(l3);
    ColumnBounds([(left, l0), (l0, l1), (l1, l2), (l2, l3), (l3, right)])
}

fn equal_slices(width: usize, pad: usize) -> ColumnBounds {
    let left = pad.min(width);
    let right = width.saturating_sub(pad).max(left);
    let step = (right - left) as f64 / COLUMN_COUNT as f64;
    let edge = |i: usize| (left as f64 + i as f64 * step).round() as usize;
    let mut bounds = [(0, 0); COLUMN_COUNT];
    for (i, b) in bounds.iter_mut().enumerate() {
        *b = (edge(i), edge(i + 1));
    }
    bounds[COLUMN_COUNT - 1].1 = right;
    ColumnBounds(bounds)
}
