//! Datum correction parsing from station metadata text.
//!
//! The archive documents datum shifts as free-text sentences of the form
//! "Add `<value>` to data `<from>` onwards". A station's metadata block can
//! contain several such sentences, one per validity period. This module
//! extracts the correction offsets and builds the per-station correction
//! table used when converting raw heights to the revised local reference.
//!
//! When several sentences are present the *last* one in document order wins
//! by default (the sentence covering the most recent validity period); the
//! policy is configurable via [`MatchPolicy`].
//!
//! # Example
//!
//! ```
//! use sealevel_rs::datum::{datum_correction, MatchPolicy};
//!
//! let text = "RLR(1918) is 6.976m below MSL. Add 6.976m to data 1918 onwards.";
//! let correction = datum_correction(text, MatchPolicy::Last).unwrap();
//! assert!((correction.offset_mm - 6976.0).abs() < 1e-9);
//! ```

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Error type for datum correction text parsing.
#[derive(Debug, Error)]
pub enum DatumTextError {
    /// No correction sentence found in the metadata block.
    #[error("no datum correction sentence found in metadata text")]
    NoCorrectionSentence,

    /// A sentence matched but its numeric value did not parse.
    #[error("unparseable correction value: {value}")]
    BadValue {
        /// The raw matched value
        value: String,
    },
}

/// Which correction sentence applies when a metadata block contains several.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// First sentence in document order (earliest validity period)
    First,
    /// Last sentence in document order (most recent validity period)
    #[default]
    Last,
}

/// A datum correction extracted from metadata text.
#[derive(Clone, Debug, PartialEq)]
pub struct DatumCorrection {
    /// Offset in millimeters, subtracted from raw heights
    pub offset_mm: f64,
    /// The validity-period annotation following "to data"
    pub from: String,
}

impl DatumCorrection {
    /// Apply the correction to a raw height in millimeters.
    pub fn apply(&self, height_mm: f64) -> f64 {
        height_mm - self.offset_mm
    }
}

fn correction_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // "Add 6.976m to data 1918 onwards." / "Add 7000mm to data all onwards"
        Regex::new(r"Add\s+(?P<value>-?\d+(?:\.\d+)?)\s*(?P<unit>mm|m)?\s+to\s+data\s+(?P<from>\S+)\s+onwards")
            .expect("datum correction pattern is valid")
    })
}

/// Extract every correction sentence from a metadata block, in document order.
pub fn parse_datum_corrections(text: &str) -> Result<Vec<DatumCorrection>, DatumTextError> {
    let mut corrections = Vec::new();

    for caps in correction_regex().captures_iter(text) {
        let raw = &caps["value"];
        let value: f64 = raw.parse().map_err(|_| DatumTextError::BadValue {
            value: raw.to_string(),
        })?;

        // Bare values are meters, the archive convention; "mm" is explicit.
        let offset_mm = match caps.name("unit").map(|m| m.as_str()) {
            Some("mm") => value,
            _ => value * 1000.0,
        };

        corrections.push(DatumCorrection {
            offset_mm,
            from: caps["from"].to_string(),
        });
    }

    Ok(corrections)
}

/// Extract the applicable correction from a metadata block.
///
/// # Errors
///
/// Returns [`DatumTextError::NoCorrectionSentence`] when the text contains
/// no correction sentence.
pub fn datum_correction(
    text: &str,
    policy: MatchPolicy,
) -> Result<DatumCorrection, DatumTextError> {
    let corrections = parse_datum_corrections(text)?;
    let picked = match policy {
        MatchPolicy::First => corrections.into_iter().next(),
        MatchPolicy::Last => corrections.into_iter().next_back(),
    };
    picked.ok_or(DatumTextError::NoCorrectionSentence)
}

/// Table of datum correction offsets keyed by station id.
///
/// Replaces ad-hoc per-station correction closures with a single data table
/// and one application function.
#[derive(Clone, Debug, Default)]
pub struct CorrectionTable {
    offsets: HashMap<u64, f64>,
}

impl CorrectionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a correction offset (mm) for a station.
    pub fn insert(&mut self, station_id: u64, offset_mm: f64) {
        self.offsets.insert(station_id, offset_mm);
    }

    /// Look up the offset for a station.
    pub fn offset_mm(&self, station_id: u64) -> Option<f64> {
        self.offsets.get(&station_id).copied()
    }

    /// Apply the station's correction to a raw height (mm).
    ///
    /// Stations without a registered offset pass through unchanged.
    pub fn apply(&self, station_id: u64, height_mm: f64) -> f64 {
        height_mm - self.offset_mm(station_id).unwrap_or(0.0)
    }

    /// Number of registered stations.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_single_sentence_meters() {
        let text = "RLR(1918) is 6.976m below MSL. Add 6.976 to data 1918 onwards.";
        let c = datum_correction(text, MatchPolicy::Last).unwrap();
        assert!((c.offset_mm - 6976.0).abs() < TOL);
        assert_eq!(c.from, "1918");
    }

    #[test]
    fn test_unit_suffixes() {
        let c = datum_correction("Add 6.976m to data 1918 onwards", MatchPolicy::Last).unwrap();
        assert!((c.offset_mm - 6976.0).abs() < TOL);

        let c = datum_correction("Add 7000mm to data 1918 onwards", MatchPolicy::Last).unwrap();
        assert!((c.offset_mm - 7000.0).abs() < TOL);
    }

    #[test]
    fn test_multiple_sentences_last_wins() {
        let text = "Add 6.900 to data 1862 onwards. Station re-levelled in 1918. \
                    Add 6.976 to data 1918 onwards.";
        let c = datum_correction(text, MatchPolicy::Last).unwrap();
        assert!((c.offset_mm - 6976.0).abs() < TOL);
        assert_eq!(c.from, "1918");
    }

    #[test]
    fn test_multiple_sentences_first_policy() {
        let text = "Add 6.900 to data 1862 onwards. Add 6.976 to data 1918 onwards.";
        let c = datum_correction(text, MatchPolicy::First).unwrap();
        assert!((c.offset_mm - 6900.0).abs() < TOL);
        assert_eq!(c.from, "1862");
    }

    #[test]
    fn test_all_sentences_extracted_in_order() {
        let text = "Add 6.900 to data 1862 onwards. Add 6.976 to data 1918 onwards.";
        let all = parse_datum_corrections(text).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].offset_mm < all[1].offset_mm);
    }

    #[test]
    fn test_no_sentence_is_error() {
        let result = datum_correction("Station moved to new pier in 1921.", MatchPolicy::Last);
        assert!(matches!(
            result,
            Err(DatumTextError::NoCorrectionSentence)
        ));
    }

    #[test]
    fn test_apply_subtracts() {
        let c = DatumCorrection {
            offset_mm: 6976.0,
            from: "1918".to_string(),
        };
        assert!((c.apply(7076.0) - 100.0).abs() < TOL);
    }

    #[test]
    fn test_correction_table() {
        let mut table = CorrectionTable::new();
        table.insert(20, 6976.0);
        table.insert(22, 6900.0);

        assert_eq!(table.len(), 2);
        assert!((table.apply(20, 7076.0) - 100.0).abs() < TOL);
        // Unregistered station passes through
        assert!((table.apply(99, 500.0) - 500.0).abs() < TOL);
    }
}
