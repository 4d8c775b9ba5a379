//! Core measurement and collection components

pub mod detector;
pub mod excerptor;
pub mod watermark;

pub use detector::{detect, detect_from_file, extract_tps_series, OutageWindow, TpsSample};
pub use excerptor::{FileExcerpt, FileFailure, HostExcerpts, IncrementalLogExcerptor};
pub use watermark::{
    BaselineReport, HostFailure, WatermarkEntry, WatermarkTable, WatermarkTracker,
};
