mod common;

use common::synthetic_page::TableLayout;
use page_columns::batch::{column_output_path, list_page_images, mask_debug_path};
use page_columns::image::io::save_grayscale_u8;
use page_columns::{segment_pages, BatchConfig, PageOutcome, SegmentError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_pages(dir: &Path, pages: &[u32]) {
    let page = TableLayout::small().render();
    for &n in pages {
        save_grayscale_u8(&page, &dir.join(format!("page-{n}.png"))).expect("write page");
    }
}

#[test]
fn batch_writes_columns_and_reports_bad_pages() {
    let _ = env_logger::builder().is_test(true).try_init();
    let input = TempDir::new().expect("tempdir");
    let output = TempDir::new().expect("tempdir");
    let debug = TempDir::new().expect("tempdir");
    write_pages(input.path(), &[1, 2]);
    fs::write(input.path().join("page-3.png"), b"not a png").expect("write");
    fs::write(input.path().join("notes.txt"), b"ignored").expect("write");

    let report_path = output.path().join("report.json");
    let mut config = BatchConfig::new(input.path(), output.path());
    config.report_json = Some(report_path.clone());
    config.debug_dir = Some(debug.path().to_path_buf());

    let report = segment_pages(&config).expect("batch runs");
    assert_eq!(report.pages.len(), 3);
    assert_eq!(report.segmented(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!((report.start_page, report.end_page), (1, 3));
    let pages: Vec<u32> = report.pages.iter().map(|p| p.page).collect();
    assert_eq!(pages, vec![1, 2, 3]);
    assert!(matches!(report.pages[2].outcome, PageOutcome::Failed { .. }));

    for page in [1, 2] {
        for col in 1..=5 {
            let path = column_output_path(output.path(), page, col, "png");
            assert!(path.is_file(), "missing {}", path.display());
        }
        assert!(mask_debug_path(debug.path(), page).is_file());
    }
    assert!(!column_output_path(output.path(), 3, 1, "png").exists());

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).expect("report")).expect("json");
    assert_eq!(json["pages"].as_array().map(|p| p.len()), Some(3));
    assert_eq!(json["pages"][0]["outcome"]["status"], "segmented");
    assert_eq!(json["pages"][2]["outcome"]["status"], "failed");

    let summary = report.summary();
    assert!(summary.contains("segmented=2"), "{}", summary);
    assert!(summary.contains("FAILED"), "{}", summary);
}

#[test]
fn existing_outputs_are_skipped() {
    let input = TempDir::new().expect("tempdir");
    let output = TempDir::new().expect("tempdir");
    write_pages(input.path(), &[1, 2]);

    let mut config = BatchConfig::new(input.path(), output.path());
    config.parallel = false;
    let first = segment_pages(&config).expect("first run");
    assert_eq!(first.segmented(), 2);

    config.skip_existing = true;
    fs::remove_file(column_output_path(output.path(), 2, 4, "png")).expect("remove");
    let second = segment_pages(&config).expect("second run");
    assert!(matches!(second.pages[0].outcome, PageOutcome::Skipped));
    assert!(matches!(
        second.pages[1].outcome,
        PageOutcome::Segmented { .. }
    ));
    assert_eq!(second.skipped(), 1);
}

#[test]
fn page_range_selects_and_validates() {
    let input = TempDir::new().expect("tempdir");
    let output = TempDir::new().expect("tempdir");
    write_pages(input.path(), &[1, 2, 3, 10]);

    let listed = list_page_images(input.path()).expect("list");
    let numbers: Vec<u32> = listed.iter().map(|(n, _)| *n).collect();
    assert_eq!(numbers, vec![1, 2, 3, 10]);

    let mut config = BatchConfig::new(input.path(), output.path());
    config.start_page = 2;
    config.end_page = Some(3);
    let report = segment_pages(&config).expect("range run");
    let pages: Vec<u32> = report.pages.iter().map(|p| p.page).collect();
    assert_eq!(pages, vec![2, 3]);

    config.start_page = 4;
    config.end_page = Some(9);
    assert!(matches!(
        segment_pages(&config),
        Err(SegmentError::NoPagesInRange { start: 4, end: 9 })
    ));

    config.start_page = 11;
    config.end_page = None;
    assert!(matches!(
        segment_pages(&config),
        Err(SegmentError::StartPageOutOfRange { start: 11, last: 10 })
    ));

    config.start_page = 0;
    assert!(matches!(
        segment_pages(&config),
        Err(SegmentError::InvalidStartPage)
    ));
}

#[test]
fn missing_or_empty_input_is_fatal() {
    let empty = TempDir::new().expect("tempdir");
    let output = TempDir::new().expect("tempdir");

    let config = BatchConfig::new(empty.path().join("absent"), output.path());
    assert!(matches!(
        segment_pages(&config),
        Err(SegmentError::InputDirNotFound { .. })
    ));

    let config = BatchConfig::new(empty.path(), output.path());
    assert!(matches!(
        segment_pages(&config),
        Err(SegmentError::NoPages { .. })
    ));
}
