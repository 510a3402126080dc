use crate::error::SegmentError;
use crate::segmenter::SegmentParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime configuration of the `segment_pages` tool.
#[derive(Clone, Debug, Deserialize)]
pub struct BatchConfig {
    /// Directory holding `page-<N>.<ext>` rasters.
    pub input_dir: PathBuf,
    /// Receives `page-<NNNN>-col-<i>.<ext>` crops.
    pub output_dir: PathBuf,
    #[serde(default = "default_start_page")]
    pub start_page: u32,
    /// Last page to process; defaults to the highest page found.
    #[serde(default)]
    pub end_page: Option<u32>,
    /// Skip pages whose five column files already exist.
    #[serde(default)]
    pub skip_existing: bool,
    /// Process pages on the rayon thread pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default = "default_output_extension")]
    pub output_extension: String,
    /// Optional path for the batch report JSON.
    #[serde(default)]
    pub report_json: Option<PathBuf>,
    /// Optional directory for per-page region masks.
    #[serde(default)]
    pub debug_dir: Option<PathBuf>,
    #[serde(default)]
    pub params: SegmentParams,
}

impl BatchConfig {
    /// Config with defaults for everything but the two directories.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            start_page: default_start_page(),
            end_page: None,
            skip_existing: false,
            parallel: default_parallel(),
            output_extension: default_output_extension(),
            report_json: None,
            debug_dir: None,
            params: SegmentParams::default(),
        }
    }
}

fn default_start_page() -> u32 {
    1
}

fn default_parallel() -> bool {
    true
}

fn default_output_extension() -> String {
    "png".to_string()
}

pub fn load_config(path: &Path) -> Result<BatchConfig, SegmentError> {
    let data = fs::read_to_string(path).map_err(|e| SegmentError::Config {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    serde_json::from_str(&data).map_err(|e| SegmentError::Config {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}
