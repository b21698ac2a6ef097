//! Readers for tide gauge archive files.
//!
//! This module parses the plain-text station data that the excluded network
//! layer has already fetched to disk (or holds in memory):
//!
//! - **Height records**: semicolon-separated rows of fractional year, height,
//!   interpolation flag, and quality flags, with a numeric sentinel for
//!   missing heights.
//! - **Station metadata blocks**: free text containing the datum correction
//!   sentences parsed by [`crate::datum`].
//!
//! # Record Format
//!
//! ```text
//! 1890.0417; 6956; N; 000
//! 1890.1250; -99999; N; 000
//! 1890.2083; 7012; N; 000
//! ```

mod rlr;

pub use rlr::{
    parse_height_records, read_height_file, read_metadata_file, records_to_series,
    ArchiveReadError, HeightRecord, MISSING_SENTINEL,
};
