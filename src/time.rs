//! Fractional-year decoding for tide gauge archives.
//!
//! Tide gauge archives encode timestamps as fractional years (e.g. `1955.0417`
//! for January 1955 in a monthly record). This module converts those values
//! into calendar dates pinned to the first day of the month.
//!
//! # Decoding Rule
//!
//! The year is split into 12 equally spaced month-start boundaries in `[0, 1)`:
//! ```text
//! 0/12, 1/12, 2/12, ..., 11/12
//! ```
//!
//! For each input the fractional part selects the *last* boundary that is
//! less than or equal to it (nearest preceding month start). Values exactly on
//! a boundary round to that month, never the next one. Annual records carry no
//! sub-year component, so every row decodes to January.
//!
//! # Example
//!
//! ```
//! use sealevel_rs::time::{decode_fractional_years, Cadence};
//!
//! let dates = decode_fractional_years(&[1955.0417, 1955.125, 1955.9583], Cadence::Monthly).unwrap();
//! assert_eq!(dates[0].to_string(), "1955-01-01");
//! assert_eq!(dates[1].to_string(), "1955-02-01");
//! assert_eq!(dates[2].to_string(), "1955-12-01");
//! ```

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Error type for fractional-year decoding.
#[derive(Debug, Error)]
pub enum FractionalYearError {
    /// Input contains NaN or infinity.
    #[error("fractional year at index {index} is not finite")]
    NotFinite {
        /// Position of the offending value
        index: usize,
    },

    /// Input is negative (years before 0 are not valid archive data).
    #[error("fractional year {value} at index {index} is negative")]
    Negative {
        /// Position of the offending value
        index: usize,
        /// The offending value
        value: f64,
    },

    /// Decoded year/month pair does not form a valid calendar date.
    #[error("fractional year {value} produced an invalid calendar date")]
    InvalidDate {
        /// The offending value
        value: f64,
    },
}

/// Sampling cadence of an observation series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cadence {
    /// One observation per calendar month
    Monthly,
    /// One observation per calendar year
    Annual,
}

/// Decode fractional years into first-of-month calendar dates.
///
/// Each value `Y.f` maps to year `Y` and the calendar month whose
/// start-of-month fraction is the largest boundary `<= f`. The degenerate
/// all-zero-fraction case (pure annual input) maps every row to January,
/// which the boundary search produces naturally since the first boundary
/// is zero.
///
/// # Errors
///
/// Returns [`FractionalYearError`] on NaN, infinite, or negative input.
pub fn decode_fractional_years(
    years: &[f64],
    cadence: Cadence,
) -> Result<Vec<NaiveDate>, FractionalYearError> {
    // Month-start boundaries: k/12 for k = 0..12
    let boundaries: Vec<f64> = (0..12).map(|k| k as f64 / 12.0).collect();

    let mut dates = Vec::with_capacity(years.len());
    for (index, &y) in years.iter().enumerate() {
        if !y.is_finite() {
            return Err(FractionalYearError::NotFinite { index });
        }
        if y < 0.0 {
            return Err(FractionalYearError::Negative { index, value: y });
        }

        let year = y.trunc() as i32;
        let remainder = y - y.trunc();

        let month = match cadence {
            // Annual rows carry no sub-year information; pin to January.
            Cadence::Annual => 1,
            Cadence::Monthly => {
                // Last boundary <= remainder. remainder >= 0 guarantees at
                // least the first boundary (0.0) qualifies. The tolerance
                // absorbs representation noise in year arithmetic
                // (e.g. (1980 + 1/12) - 1980 landing a hair below 1/12).
                let idx = boundaries.partition_point(|&b| b <= remainder + 1e-9) - 1;
                idx as u32 + 1
            }
        };

        let date = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(FractionalYearError::InvalidDate { value: y })?;
        dates.push(date);
    }

    Ok(dates)
}

/// Start-of-month fraction of a date expressed as a fractional year.
///
/// Inverse of the decoder for first-of-month dates:
/// `1955-02-01` maps to `1955 + 1/12`.
pub fn fractional_year(date: NaiveDate) -> f64 {
    date.year() as f64 + (date.month() as f64 - 1.0) / 12.0
}
