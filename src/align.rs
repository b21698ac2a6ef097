//! Alignment of station observations with wind covariates.
//!
//! Builds the merged frame that the regression consumes: a left join of the
//! station height series against the wind series on the time axis, with the
//! wind-derived covariates projected onto the station's along-shore and
//! cross-shore directions.
//!
//! # Join and Imputation Policy
//!
//! Every station timestamp is preserved even when no wind sample exists for
//! it. Rows without a wind sample get their derived covariates (`u2`, `v2`,
//! `u2main`, `u2perp`) replaced by the unconditional column mean over the
//! whole merged frame. This is a global fallback computed after the join,
//! not a function of nearby valid samples, and it leaves each column's
//! overall mean unchanged.
//!
//! # Wind Projection
//!
//! Wind direction converts from mathematical convention (CCW from east) to
//! compass bearing, then squared wind speed projects onto the shore
//! orientation:
//!
//! ```text
//! bearing = (-direction_deg + 90) mod 360
//! u2main  = speed² · cos(bearing - shore_angle)
//! u2perp  = speed² · sin(bearing - shore_angle)
//! ```

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::station::ObservationSeries;
use crate::time::Cadence;
use crate::wind::{WindRecord, WindSeries};

/// Station and wind series merged onto the station's time axis.
///
/// Columns are parallel vectors; missing numeric values are carried as NaN.
#[derive(Clone, Debug)]
pub struct MergedFrame {
    /// Archive station identifier
    pub station_id: u64,
    /// Calendar dates (first of month)
    pub dates: Vec<NaiveDate>,
    /// Fractional-year encoding of each date
    pub year_fraction: Vec<f64>,
    /// Height in mm, NaN when the observation is missing
    pub height: Vec<f64>,
    /// Archive interpolation flags
    pub interpolated: Vec<bool>,
    /// Eastward wind component (m/s), NaN when no wind sample exists
    pub u: Vec<f64>,
    /// Northward wind component (m/s), NaN when no wind sample exists
    pub v: Vec<f64>,
    /// Sign-preserving squared eastward wind: u·|u|
    pub u2: Vec<f64>,
    /// Sign-preserving squared northward wind: v·|v|
    pub v2: Vec<f64>,
    /// Squared wind speed projected along shore
    pub u2main: Vec<f64>,
    /// Squared wind speed projected across shore
    pub u2perp: Vec<f64>,
}

/// One merged-frame row in serializable form.
///
/// NaN columns become `null`, so the rows are valid row-oriented JSON.
#[derive(Clone, Debug, Serialize)]
pub struct MergedRow {
    /// Calendar date
    pub date: NaiveDate,
    /// Fractional-year encoding
    pub year_fraction: f64,
    /// Height in mm
    pub height: Option<f64>,
    /// Archive station identifier
    pub station_id: u64,
    /// Archive interpolation flag
    pub interpolated: bool,
    /// Eastward wind component (m/s)
    pub u: Option<f64>,
    /// Northward wind component (m/s)
    pub v: Option<f64>,
    /// Sign-preserving squared eastward wind
    pub u2: Option<f64>,
    /// Sign-preserving squared northward wind
    pub v2: Option<f64>,
    /// Along-shore squared wind speed
    pub u2main: Option<f64>,
    /// Cross-shore squared wind speed
    pub u2perp: Option<f64>,
}

impl MergedFrame {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Check if the frame is empty.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of rows with a non-missing height.
    pub fn n_valid_heights(&self) -> usize {
        self.height.iter().filter(|h| h.is_finite()).count()
    }

    /// Rows in serializable form (NaN becomes `None`).
    pub fn rows(&self) -> Vec<MergedRow> {
        let opt = |x: f64| if x.is_finite() { Some(x) } else { None };
        (0..self.len())
            .map(|i| MergedRow {
                date: self.dates[i],
                year_fraction: self.year_fraction[i],
                height: opt(self.height[i]),
                station_id: self.station_id,
                interpolated: self.interpolated[i],
                u: opt(self.u[i]),
                v: opt(self.v[i]),
                u2: opt(self.u2[i]),
                v2: opt(self.v2[i]),
                u2main: opt(self.u2main[i]),
                u2perp: opt(self.u2perp[i]),
            })
            .collect()
    }
}

/// Convert mathematical wind direction (degrees CCW from east) to a compass
/// bearing in [0, 360).
pub fn bearing_from_math_deg(direction_deg: f64) -> f64 {
    (-direction_deg + 90.0).rem_euclid(360.0)
}

/// Resample a wind series to annual means over calendar-year buckets.
///
/// The u and v components are averaged per year; speed and direction of the
/// annual sample derive from the averaged components. Output timestamps are
/// January 1 of each year, matching decoded annual station dates.
pub fn resample_wind_annual(wind: &WindSeries) -> WindSeries {
    let mut buckets: BTreeMap<i32, (f64, f64, usize)> = BTreeMap::new();
    for r in &wind.records {
        let e = buckets.entry(r.date.year()).or_insert((0.0, 0.0, 0));
        e.0 += r.u;
        e.1 += r.v;
        e.2 += 1;
    }

    let records = buckets
        .into_iter()
        .filter_map(|(year, (su, sv, n))| {
            let date = NaiveDate::from_ymd_opt(year, 1, 1)?;
            Some(WindRecord {
                date,
                u: su / n as f64,
                v: sv / n as f64,
            })
        })
        .collect();

    WindSeries {
        grid_lat: wind.grid_lat,
        grid_lon: wind.grid_lon,
        records,
    }
}

/// Merge a station observation series with a wind series on the time axis.
///
/// * Left join: every station timestamp is kept; wind rows without a
///   matching station timestamp are dropped.
/// * Annual cadence first resamples the wind to calendar-year means.
/// * `shore_angle_deg` is the station's dominant shore orientation in
///   compass degrees; it is only consulted when `wind` is supplied.
/// * Rows without a wind sample get `u2`, `v2`, `u2main`, `u2perp` imputed
///   with the unconditional column mean of the merged frame.
pub fn align_station_wind(
    series: &ObservationSeries,
    wind: Option<&WindSeries>,
    shore_angle_deg: f64,
) -> MergedFrame {
    let n = series.len();
    let mut frame = MergedFrame {
        station_id: series.station_id,
        dates: Vec::with_capacity(n),
        year_fraction: Vec::with_capacity(n),
        height: Vec::with_capacity(n),
        interpolated: Vec::with_capacity(n),
        u: vec![f64::NAN; n],
        v: vec![f64::NAN; n],
        u2: vec![f64::NAN; n],
        v2: vec![f64::NAN; n],
        u2main: vec![f64::NAN; n],
        u2perp: vec![f64::NAN; n],
    };

    for point in &series.points {
        frame.dates.push(point.date);
        frame.year_fraction.push(point.year_fraction);
        frame.height.push(point.height.unwrap_or(f64::NAN));
        frame.interpolated.push(point.interpolated);
    }

    if let Some(wind) = wind {
        let resampled;
        let wind = match series.cadence {
            Cadence::Annual => {
                resampled = resample_wind_annual(wind);
                &resampled
            }
            Cadence::Monthly => wind,
        };

        let by_date: HashMap<NaiveDate, &WindRecord> =
            wind.records.iter().map(|r| (r.date, r)).collect();

        for (i, &date) in frame.dates.iter().enumerate() {
            if let Some(r) = by_date.get(&date) {
                let speed2 = r.u * r.u + r.v * r.v;
                let bearing = bearing_from_math_deg(r.direction().to_degrees());
                let rel = (bearing - shore_angle_deg).to_radians();

                frame.u[i] = r.u;
                frame.v[i] = r.v;
                frame.u2[i] = r.u * r.u.abs();
                frame.v2[i] = r.v * r.v.abs();
                frame.u2main[i] = speed2 * rel.cos();
                frame.u2perp[i] = speed2 * rel.sin();
            }
        }

        impute_column_means(&mut frame);
    }

    debug!(
        station_id = frame.station_id,
        rows = frame.len(),
        valid_heights = frame.n_valid_heights(),
        "merged station and wind series"
    );

    frame
}

/// Replace missing wind covariates with the column mean over the whole frame.
///
/// Only the derived covariates are imputed; `u` and `v` keep their gaps so
/// downstream consumers can still tell which rows had a real wind sample.
fn impute_column_means(frame: &mut MergedFrame) {
    let n_missing = frame.u2main.iter().filter(|x| !x.is_finite()).count();
    if n_missing == 0 {
        return;
    }
    warn!(
        station_id = frame.station_id,
        n_missing, "imputing missing wind covariates with column means"
    );

    let columns: [&mut Vec<f64>; 4] = [
        &mut frame.u2,
        &mut frame.v2,
        &mut frame.u2main,
        &mut frame.u2perp,
    ];
    for column in columns {
        if let Some(mean) = finite_mean(column) {
            for x in column.iter_mut() {
                if !x.is_finite() {
                    *x = mean;
                }
            }
        }
    }
}

fn finite_mean(xs: &[f64]) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for &x in xs {
        if x.is_finite() {
            sum += x;
            n += 1;
        }
    }
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}
