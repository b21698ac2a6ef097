//! Semicolon-separated height record parsing.
//!
//! Archive data files carry one observation per line:
//! `year_fraction; height; interpolated_flag; quality_flags`. Heights equal
//! to the missing sentinel translate to `None` at parse time, before any
//! datum correction is applied, so a sentinel can never be mistaken for a
//! real reading.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::station::{ObservationPoint, ObservationSeries};
use crate::time::{decode_fractional_years, Cadence, FractionalYearError};

/// Archive sentinel for a missing height (mm).
pub const MISSING_SENTINEL: f64 = -99999.0;

/// Error type for archive file reading.
#[derive(Debug, Error)]
pub enum ArchiveReadError {
    /// IO error reading the file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A data line did not parse
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// The file contained no data rows
    #[error("no data records found")]
    Empty,

    /// Fractional-year decoding failed
    #[error("fractional year decode failed: {0}")]
    FractionalYear(#[from] FractionalYearError),
}

/// One parsed archive data row.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightRecord {
    /// Fractional-year timestamp
    pub year_fraction: f64,
    /// Height in mm, `None` when the row carried the missing sentinel
    pub height: Option<f64>,
    /// Whether the archive marked the value as interpolated
    pub interpolated: bool,
    /// Raw quality flags column
    pub quality_flags: String,
}

/// Parse semicolon-separated height records from in-memory text.
///
/// Blank lines are skipped. Rows need at least the year and height columns;
/// the interpolation flag (`Y`/`N` or `1`/`0`) and quality flags are
/// optional and default to not-interpolated / empty.
pub fn parse_height_records(
    text: &str,
    sentinel: f64,
) -> Result<Vec<HeightRecord>, ArchiveReadError> {
    let mut records = Vec::new();

    for (line_idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split(';').map(|s| s.trim()).collect();
        if parts.len() < 2 {
            return Err(ArchiveReadError::Parse {
                line: line_idx + 1,
                message: format!("expected at least 2 columns, got {}", parts.len()),
            });
        }

        let year_fraction: f64 = parts[0].parse().map_err(|e| ArchiveReadError::Parse {
            line: line_idx + 1,
            message: format!("year fraction: {}", e),
        })?;

        let raw_height: f64 = parts[1].parse().map_err(|e| ArchiveReadError::Parse {
            line: line_idx + 1,
            message: format!("height: {}", e),
        })?;
        // Sentinel translation happens here, never downstream.
        let height = if (raw_height - sentinel).abs() < 0.5 {
            None
        } else {
            Some(raw_height)
        };

        let interpolated = match parts.get(2).copied() {
            Some("Y") | Some("y") | Some("1") => true,
            _ => false,
        };

        let quality_flags = parts.get(3).copied().unwrap_or("").to_string();

        records.push(HeightRecord {
            year_fraction,
            height,
            interpolated,
            quality_flags,
        });
    }

    if records.is_empty() {
        return Err(ArchiveReadError::Empty);
    }

    Ok(records)
}

/// Read and parse a height record file.
pub fn read_height_file(path: &Path, sentinel: f64) -> Result<Vec<HeightRecord>, ArchiveReadError> {
    let text = fs::read_to_string(path)?;
    parse_height_records(&text, sentinel)
}

/// Read a station metadata text block (input to the datum parser).
pub fn read_metadata_file(path: &Path) -> Result<String, ArchiveReadError> {
    Ok(fs::read_to_string(path)?)
}

/// Convert parsed records into an observation series.
///
/// Decodes the fractional-year timestamps at the given cadence; row order is
/// preserved.
pub fn records_to_series(
    station_id: u64,
    records: &[HeightRecord],
    cadence: Cadence,
) -> Result<ObservationSeries, ArchiveReadError> {
    let years: Vec<f64> = records.iter().map(|r| r.year_fraction).collect();
    let dates = decode_fractional_years(&years, cadence)?;

    let points = dates
        .iter()
        .zip(records.iter())
        .map(|(&date, r)| ObservationPoint {
            date,
            year_fraction: r.year_fraction,
            height: r.height,
            interpolated: r.interpolated,
        })
        .collect();

    Ok(ObservationSeries::new(station_id, cadence, points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TOL: f64 = 1e-10;

    #[test]
    fn test_parse_basic_rows() {
        let text = "1890.0417; 6956; N; 000\n1890.1250; 6889; N; 000\n";
        let records = parse_height_records(text, MISSING_SENTINEL).unwrap();

        assert_eq!(records.len(), 2);
        assert!((records[0].year_fraction - 1890.0417).abs() < TOL);
        assert_eq!(records[0].height, Some(6956.0));
        assert!(!records[0].interpolated);
        assert_eq!(records[0].quality_flags, "000");
    }

    #[test]
    fn test_sentinel_becomes_missing() {
        let text = "1890.0417; 6956; N; 000\n1890.1250; -99999; N; 000\n";
        let records = parse_height_records(text, MISSING_SENTINEL).unwrap();

        assert_eq!(records[0].height, Some(6956.0));
        assert_eq!(records[1].height, None);
    }

    #[test]
    fn test_interpolated_flags() {
        let text = "1890.0417; 6956; Y; 000\n1890.1250; 6889; N; 000\n1890.2083; 6900; 1\n";
        let records = parse_height_records(text, MISSING_SENTINEL).unwrap();

        assert!(records[0].interpolated);
        assert!(!records[1].interpolated);
        assert!(records[2].interpolated);
    }

    #[test]
    fn test_short_row_is_parse_error() {
        let result = parse_height_records("1890.0417\n", MISSING_SENTINEL);
        assert!(matches!(
            result,
            Err(ArchiveReadError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_garbage_height_is_parse_error() {
        let result = parse_height_records("1890.0417; n/a; N; 000\n", MISSING_SENTINEL);
        assert!(matches!(result, Err(ArchiveReadError::Parse { .. })));
    }

    #[test]
    fn test_empty_input_is_error() {
        let result = parse_height_records("\n  \n", MISSING_SENTINEL);
        assert!(matches!(result, Err(ArchiveReadError::Empty)));
    }

    #[test]
    fn test_read_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1890.0417; 6956; N; 000").unwrap();
        writeln!(file, "1890.1250; -99999; N; 000").unwrap();

        let records = read_height_file(file.path(), MISSING_SENTINEL).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].height, None);
    }

    #[test]
    fn test_records_to_series() {
        let text = "1890.0417; 6956; N; 000\n1890.1250; -99999; Y; 000\n";
        let records = parse_height_records(text, MISSING_SENTINEL).unwrap();
        let series = records_to_series(20, &records, Cadence::Monthly).unwrap();

        assert_eq!(series.station_id, 20);
        assert_eq!(series.len(), 2);
        // 0.0417 lands in January, 0.1250 in February
        assert_eq!(series.points[0].date.month(), 1);
        assert_eq!(series.points[1].date.month(), 2);
        assert!(series.points[1].height.is_none());
        assert!(series.points[1].interpolated);
    }

    #[test]
    fn test_records_to_series_rejects_bad_year() {
        let records = vec![HeightRecord {
            year_fraction: -5.0,
            height: Some(100.0),
            interpolated: false,
            quality_flags: String::new(),
        }];
        let result = records_to_series(20, &records, Cadence::Monthly);
        assert!(matches!(result, Err(ArchiveReadError::FractionalYear(_))));
    }
}
