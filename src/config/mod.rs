//! JSON configuration for the command-line tools.

pub mod segment_pages;

pub use segment_pages::{load_config, BatchConfig};
