//! # sealevel-rs
//!
//! Station-data alignment and linear-model fitting for sea-level research.
//!
//! This crate takes heterogeneous, irregularly-missing oceanographic time
//! series — tide gauge heights, reanalysis wind components, the lunar nodal
//! cycle — aligns them onto a common time axis, and fits an
//! ordinary-least-squares model explaining sea-level height as a function of
//! trend, nodal tide, wind stress, and seasonal terms.
//!
//! The building blocks:
//! - Fractional-year decoding of archive timestamps ([`time`])
//! - Station metadata and observation series ([`station`])
//! - Datum correction parsing from metadata text ([`datum`])
//! - Gridded wind fields and nearest-gridpoint extraction ([`wind`])
//! - Station/wind alignment and covariate construction ([`align`])
//! - The regression fit itself ([`fit`])
//! - Archive file readers ([`io`]) and dataset configuration ([`config`])
//!
//! Network retrieval and container formats (NetCDF, ZIP) are collaborator
//! concerns; this crate starts from in-memory series and gridded arrays.
//!
//! # Example
//!
//! ```
//! use sealevel_rs::{
//!     align_station_wind, fit_sea_level, records_to_series, Cadence, FitOptions,
//!     MISSING_SENTINEL, parse_height_records,
//! };
//!
//! let text = "\
//! 1950.0417; 6890; N; 000
//! 1950.1250; -99999; N; 000
//! 1950.2083; 6910; N; 000
//! 1950.2917; 6905; N; 000
//! 1950.3750; 6921; N; 000
//! 1950.4583; 6918; N; 000";
//!
//! let records = parse_height_records(text, MISSING_SENTINEL).unwrap();
//! let series = records_to_series(22, &records, Cadence::Monthly).unwrap();
//! let frame = align_station_wind(&series, None, 0.0);
//! let result = fit_sea_level(&frame, FitOptions::default()).unwrap();
//!
//! println!("trend: {:.3} mm/yr", result.trend());
//! ```

pub mod align;
pub mod config;
pub mod datum;
pub mod fit;
pub mod io;
pub mod station;
pub mod time;
pub mod wind;

// Re-export main types for convenience
pub use align::{
    align_station_wind, bearing_from_math_deg, resample_wind_annual, MergedFrame, MergedRow,
};
pub use config::{ArchiveConfig, DatasetVariant};
pub use datum::{
    datum_correction, parse_datum_corrections, CorrectionTable, DatumCorrection, DatumTextError,
    MatchPolicy,
};
pub use fit::{
    fit_design, fit_sea_level, DesignMatrix, FitError, FitOptions, FitResult, NODAL_PERIOD_YEARS,
    TREND_EPOCH_YEAR,
};
pub use io::{
    parse_height_records, read_height_file, read_metadata_file, records_to_series,
    ArchiveReadError, HeightRecord, MISSING_SENTINEL,
};
pub use station::{dutch_stations, ObservationPoint, ObservationSeries, Station};
pub use time::{decode_fractional_years, fractional_year, Cadence, FractionalYearError};
pub use wind::{
    extract_wind, nearest_grid_indices, GridError, GriddedField, WindRecord, WindSeries,
};
