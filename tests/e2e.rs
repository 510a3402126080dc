mod common;

use common::synthetic_page::{
    fill_rect, light_noise_page, text_block_page, vertical_line_mask, TableLayout,
};
use page_columns::columns::{compose_column_bounds, ColumnBounds};
use page_columns::header::TopSource;
use page_columns::segmenter::TrimOptions;
use page_columns::separators::{detect_separator_lines, validate_separator_lines};
use page_columns::{LineSource, PageSegmenter, SegmentParams};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn assert_contiguous(bounds: &ColumnBounds) {
    let b = bounds.as_slice();
    assert_eq!(b.len(), 5);
    for pair in b.windows(2) {
        assert_eq!(pair[0].1, pair[1].0, "bounds={:?}", b);
    }
    assert!(b.iter().all(|&(l, r)| l <= r), "bounds={:?}", b);
}

#[test]
fn ruled_page_is_split_at_separators() {
    init_logging();
    let layout = TableLayout::standard();
    let page = layout.render();
    let segmenter = PageSegmenter::new(SegmentParams::default());
    let seg = segmenter.segment(page.as_view());
    let report = &seg.report;

    assert_eq!(report.content_top.source, TopSource::RunLengthRule);
    assert!(
        (120..=135).contains(&report.content_top.y),
        "content top {}",
        report.content_top.y
    );
    assert!(
        seg.region.top < layout.first_row && seg.region.top >= 110,
        "region {:?}",
        seg.region
    );
    assert!(
        (layout.last_row_bottom()..=1250).contains(&seg.region.bottom),
        "region {:?}",
        seg.region
    );
    assert_eq!(report.rows.count, layout.rows);
    assert!((report.rows.spacing - 30.0).abs() <= 1.5);

    assert_eq!(report.line_source, LineSource::Detected);
    let lines = seg.lines.expect("validated lines");
    for (got, want) in lines.as_slice().iter().zip(layout.separators) {
        let got = seg.trim.left + got;
        assert!(got.abs_diff(want) <= 2, "lines={:?} trim={:?}", lines, seg.trim);
    }
    assert_contiguous(&seg.columns);

    let crops = segmenter.crop_columns(page.as_view(), &seg);
    assert_eq!(crops.len(), 5);
    for (crop, rect) in crops.iter().zip(seg.column_rects()) {
        assert_eq!(crop.width(), rect.width);
        assert_eq!(crop.height(), seg.region.height());
    }
}

#[test]
fn headerless_page_starts_above_first_regular_row() {
    init_logging();
    let layout = TableLayout {
        rule_y: None,
        max_word: 90,
        ..TableLayout::standard()
    };
    let page = layout.render();
    let segmenter = PageSegmenter::new(SegmentParams::default());
    let seg = segmenter.segment(page.as_view());

    assert_eq!(seg.report.content_top.source, TopSource::Headerless);
    let top = seg.report.content_top.y;
    assert!(
        top > 80 && top <= layout.first_row,
        "headerless top {} should fall between header words and first row",
        top
    );
    assert!(seg.lines.is_some(), "report={:?}", seg.report);
}

#[test]
fn thin_rules_and_bottom_band_give_four_lines() {
    init_logging();
    let mut mask = vertical_line_mask(1000, 2000, &[200, 400, 600, 800], 2);
    for y in 1950..1970 {
        for x in 0..1000 {
            mask.set(x, y, 255);
        }
    }
    let params = SegmentParams::default();
    let lines = detect_separator_lines(&mask.as_view(), &params).expect("four lines");
    for (got, want) in lines.as_slice().iter().zip([200, 400, 600, 800]) {
        assert!(got.abs_diff(want) <= 2, "lines={:?}", lines);
    }
    assert!(validate_separator_lines(lines.as_slice(), 1000, &params.validation).is_some());

    let bounds = compose_column_bounds(1000, Some(&lines), params.pad, params.edge_margin_ratio);
    assert_contiguous(&bounds);
    assert!(bounds.left() <= lines.first());
    assert!(bounds.right() >= lines.last() && bounds.right() <= 1000);
}

#[test]
fn featureless_page_falls_back_to_equal_columns() {
    init_logging();
    let page = light_noise_page(1000, 1400, 7);
    let params = SegmentParams::default();
    let segmenter = PageSegmenter::new(params.clone());
    let seg = segmenter.segment(page.as_view());

    assert!(seg.lines.is_none());
    assert_eq!(seg.report.line_source, LineSource::Fallback);
    assert_eq!(seg.trim.width(), 1000);
    assert_contiguous(&seg.columns);
    let expected = (seg.trim.width() - 2 * params.pad) as f64 / 5.0;
    for (l, r) in seg.columns.iter() {
        assert!(((r - l) as f64 - expected).abs() <= 1.0, "columns={:?}", seg.columns);
    }
    assert_eq!(seg.columns.left(), params.pad);
    assert_eq!(seg.columns.right(), 1000 - params.pad);
}

#[test]
fn uneven_line_spacing_forces_equal_split() {
    let params = SegmentParams::default();
    // Gaps 50, 52 and 400.
    let lines = [150, 200, 252, 652];
    assert!(validate_separator_lines(&lines, 1000, &params.validation).is_none());
    let bounds = compose_column_bounds(1000, None, params.pad, params.edge_margin_ratio);
    assert_contiguous(&bounds);
    assert_eq!(bounds.left(), 6);
    assert_eq!(bounds.right(), 994);
}

#[test]
fn manual_threshold_and_zero_redetect_passes_are_honoured() {
    let layout = TableLayout::standard();
    let page = layout.render();
    let params = SegmentParams {
        threshold: Some(100),
        redetect_passes: 0,
        ..Default::default()
    };
    let seg = PageSegmenter::new(params).segment(page.as_view());
    assert_eq!(seg.report.page_threshold, 100);
    assert_eq!(seg.report.redetect_passes, 0);
    assert!(seg.lines.is_some());
}

#[test]
fn edge_artifact_is_trimmed_and_lines_redetected() {
    init_logging();
    // Rules spaced 230/230/180 and a faint scan-bed line at x=30 that forms
    // an evenly spaced (but out-of-bounds) set with the first three rules.
    let layout = TableLayout {
        text_left: 120,
        separators: [260, 490, 720, 900],
        separator_span: (160, 600),
        first_word: 100,
        ..TableLayout::standard()
    };
    let mut page = layout.render();
    fill_rect(&mut page, 30, 160, 31, 600);
    let params = SegmentParams {
        trim: TrimOptions {
            density_floor: 0.1,
            ..Default::default()
        },
        ..Default::default()
    };
    let seg = PageSegmenter::new(params).segment(page.as_view());
    let report = &seg.report;

    let initial = report.initial_lines.expect("initial lines");
    assert!(initial.first() < 40, "initial={:?}", initial);
    assert_eq!(report.line_source, LineSource::Redetected);
    assert_eq!(report.redetect_passes, 1);
    assert_eq!(seg.trim.left, 80);
    assert_eq!(seg.trim.right, 1000);

    let lines = seg.lines.expect("redetected lines");
    for (got, want) in lines.as_slice().iter().zip(layout.separators) {
        let got = seg.trim.left + got;
        assert!(got.abs_diff(want) <= 2, "lines={:?} trim={:?}", lines, seg.trim);
    }
    assert_contiguous(&seg.columns);
}

#[test]
fn failed_redetect_keeps_a_single_trim() {
    init_logging();
    let page = text_block_page(1000, 1400, 150, 850);
    for redetect_passes in [1, 3] {
        let params = SegmentParams {
            redetect_passes,
            ..Default::default()
        };
        let seg = PageSegmenter::new(params.clone()).segment(page.as_view());
        assert_eq!(seg.report.line_source, LineSource::Fallback);
        assert!(seg.trim.left <= 80, "passes={} trim={:?}", redetect_passes, seg.trim);
        assert!(
            1000 - seg.trim.right <= 40,
            "passes={} trim={:?}",
            redetect_passes,
            seg.trim
        );
        assert!(!seg.trim.is_full(1000), "trim={:?}", seg.trim);
        assert_contiguous(&seg.columns);
        assert_eq!(seg.columns.right(), seg.trim.width() - params.pad);
    }
}
