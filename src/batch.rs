//! Batch runner: page discovery, range selection, per-page output.
//!
//! Pages are independent. Each one is loaded, segmented, and written as five
//! column images; a page that fails to load or save is recorded in the
//! report and the run moves on. Only problems that make the whole run
//! meaningless (missing input, empty range, unwritable output directory)
//! abort with a [`SegmentError`].
use crate::config::BatchConfig;
use crate::diagnostics::{elapsed_ms, BatchReport, PageEntry, PageOutcome};
use crate::error::{PageError, SegmentError};
use crate::image::io::{load_grayscale_image, save_grayscale_u8, write_json_file};
use crate::segmenter::PageSegmenter;
use log::{debug, info, warn};
use rayon::prelude::*;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;

fn page_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^page-(\d+)\.(png|jpe?g|tiff?)$").expect("page name pattern is valid")
    })
}

/// Page number encoded in a file name like `page-0042.png`.
pub fn parse_page_number(file_name: &str) -> Option<u32> {
    page_name_pattern()
        .captures(file_name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Page rasters in `dir`, ascending by page number.
pub fn list_page_images(dir: &Path) -> Result<Vec<(u32, PathBuf)>, SegmentError> {
    if !dir.is_dir() {
        return Err(SegmentError::InputDirNotFound {
            path: dir.to_path_buf(),
        });
    }
    let entries = fs::read_dir(dir).map_err(|source| SegmentError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut pages = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SegmentError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(num) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_page_number)
        else {
            continue;
        };
        pages.push((num, path));
    }
    pages.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    Ok(pages)
}

/// Validates `[start, end]` against the highest page number and fills in
/// the default end.
pub fn resolve_page_range(
    last_page: u32,
    start: u32,
    end: Option<u32>,
) -> Result<(u32, u32), SegmentError> {
    if start < 1 {
        return Err(SegmentError::InvalidStartPage);
    }
    if start > last_page {
        return Err(SegmentError::StartPageOutOfRange {
            start,
            last: last_page,
        });
    }
    let end = end.unwrap_or(last_page);
    if end < start {
        return Err(SegmentError::EndBeforeStart { start, end });
    }
    if end > last_page {
        return Err(SegmentError::EndPageOutOfRange {
            end,
            last: last_page,
        });
    }
    Ok((start, end))
}

/// `page-NNNN-col-i.ext` inside `out_dir` (`column` is 1-based).
pub fn column_output_path(out_dir: &Path, page: u32, column: usize, ext: &str) -> PathBuf {
    out_dir.join(format!("page-{page:04}-col-{column}.{ext}"))
}

pub fn mask_debug_path(debug_dir: &Path, page: u32) -> PathBuf {
    debug_dir.join(format!("page-{page:04}-mask.png"))
}

/// True when all five column files of `page` exist.
pub fn outputs_exist(out_dir: &Path, page: u32, ext: &str) -> bool {
    (1..=5).all(|i| column_output_path(out_dir, page, i, ext).is_file())
}

/// Segments every selected page of `config` and writes the column crops.
pub fn segment_pages(config: &BatchConfig) -> Result<BatchReport, SegmentError> {
    let start = Instant::now();
    let items = list_page_images(&config.input_dir)?;
    let Some(last_page) = items.iter().map(|(n, _)| *n).max() else {
        return Err(SegmentError::NoPages {
            path: config.input_dir.clone(),
        });
    };
    let (start_page, end_page) = resolve_page_range(last_page, config.start_page, config.end_page)?;
    let selected: Vec<(u32, PathBuf)> = items
        .into_iter()
        .filter(|(n, _)| (start_page..=end_page).contains(n))
        .collect();
    if selected.is_empty() {
        return Err(SegmentError::NoPagesInRange {
            start: start_page,
            end: end_page,
        });
    }
    fs::create_dir_all(&config.output_dir).map_err(|source| SegmentError::Io {
        path: config.output_dir.clone(),
        source,
    })?;

    info!(
        "segmenting {} page(s) {}-{} from {}",
        selected.len(),
        start_page,
        end_page,
        config.input_dir.display()
    );
    let segmenter = PageSegmenter::new(config.params.clone());
    let run = |(page, path): &(u32, PathBuf)| PageEntry {
        page: *page,
        path: path.clone(),
        outcome: process_page(&segmenter, config, *page, path),
    };
    let pages: Vec<PageEntry> = if config.parallel {
        selected.par_iter().map(run).collect()
    } else {
        selected.iter().map(run).collect()
    };

    let report = BatchReport {
        input_dir: config.input_dir.clone(),
        output_dir: config.output_dir.clone(),
        start_page,
        end_page,
        total_ms: elapsed_ms(start),
        pages,
    };
    info!(
        "wrote columns for pages {}-{} to {} (segmented={} skipped={} failed={})",
        start_page,
        end_page,
        config.output_dir.display(),
        report.segmented(),
        report.skipped(),
        report.failed()
    );
    if let Some(path) = &config.report_json {
        write_json_file(path, &report)?;
    }
    Ok(report)
}

fn process_page(
    segmenter: &PageSegmenter,
    config: &BatchConfig,
    page: u32,
    path: &Path,
) -> PageOutcome {
    let ext = config.output_extension.as_str();
    if config.skip_existing && outputs_exist(&config.output_dir, page, ext) {
        info!("skip page {} (columns exist)", page);
        return PageOutcome::Skipped;
    }
    match segment_one(segmenter, config, page, path) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!("page {} failed: {}", page, err);
            PageOutcome::Failed {
                error: err.to_string(),
            }
        }
    }
}

fn segment_one(
    segmenter: &PageSegmenter,
    config: &BatchConfig,
    page: u32,
    path: &Path,
) -> Result<PageOutcome, PageError> {
    let gray = load_grayscale_image(path)?;
    let seg = segmenter.segment(gray.as_view());
    let crops = segmenter.crop_columns(gray.as_view(), &seg);
    let mut outputs = Vec::with_capacity(crops.len());
    for (i, crop) in crops.iter().enumerate() {
        let out = column_output_path(&config.output_dir, page, i + 1, &config.output_extension);
        save_grayscale_u8(crop, &out)?;
        outputs.push(out);
    }
    if let Some(dir) = &config.debug_dir {
        save_grayscale_u8(seg.region_mask.image(), &mask_debug_path(dir, page))?;
    }
    debug!(
        "page {}: region {}..{} trim [{}, {}) lines={:?}",
        page, seg.region.top, seg.region.bottom, seg.trim.left, seg.trim.right, seg.lines
    );
    info!(
        "segmented page {} -> cols 1-5 ({:?})",
        page, seg.report.line_source
    );
    Ok(PageOutcome::Segmented {
        outputs,
        report: Box::new(seg.report),
    })
}
