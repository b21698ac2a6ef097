//! Gridded wind fields and nearest-gridpoint extraction.
//!
//! Reanalysis winds arrive as gridded (time, lat, lon) fields of the u and v
//! velocity components. For a tide gauge station we sample the grid cell
//! nearest the station coordinate and derive per-timestamp wind speed and
//! direction.
//!
//! # Derived Quantities
//!
//! ```text
//! speed     = sqrt(u² + v²)
//! direction = atan2(v, u)          (mathematical, CCW from east, [0, 2π))
//! ```
//!
//! The compass-bearing conversion used by the feature builder lives in
//! [`crate::align`].

use std::f64::consts::PI;

use chrono::NaiveDate;
use thiserror::Error;

/// Error type for gridded field operations.
#[derive(Debug, Error)]
pub enum GridError {
    /// Axis arrays of two related fields differ.
    #[error("grid {axis} axes differ between fields '{left}' and '{right}'")]
    AxisMismatch {
        /// Which axis differs (latitude, longitude, or time)
        axis: &'static str,
        /// Name of the first field
        left: String,
        /// Name of the second field
        right: String,
    },

    /// Value array size does not match the axis cross product.
    #[error("field '{name}': expected {expected} values for (time, lat, lon) axes, got {actual}")]
    SizeMismatch {
        /// Field name
        name: String,
        /// time * lat * lon
        expected: usize,
        /// Actual value count
        actual: usize,
    },

    /// An axis is empty.
    #[error("field '{name}': {axis} axis is empty")]
    EmptyAxis {
        /// Field name
        name: String,
        /// Which axis is empty
        axis: &'static str,
    },

    /// Requested coordinate lies outside the grid coverage.
    #[error("coordinate ({lat}, {lon}) outside grid coverage (caller configuration error)")]
    OutOfCoverage {
        /// Requested latitude
        lat: f64,
        /// Requested longitude
        lon: f64,
    },
}

/// A gridded scalar field on 1-D lat/lon/time axes.
///
/// Values are stored flattened in (time, lat, lon) order, matching the
/// layout of the source variable arrays.
#[derive(Clone, Debug)]
pub struct GriddedField {
    /// Variable name (e.g. "u10", "v10")
    pub name: String,
    /// Grid latitudes (degrees North)
    pub lats: Vec<f64>,
    /// Grid longitudes (degrees East)
    pub lons: Vec<f64>,
    /// Time axis as calendar dates
    pub times: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl GriddedField {
    /// Create a field, validating the value array against the axes.
    pub fn new(
        name: impl Into<String>,
        lats: Vec<f64>,
        lons: Vec<f64>,
        times: Vec<NaiveDate>,
        values: Vec<f64>,
    ) -> Result<Self, GridError> {
        let name = name.into();
        if lats.is_empty() {
            return Err(GridError::EmptyAxis {
                name,
                axis: "latitude",
            });
        }
        if lons.is_empty() {
            return Err(GridError::EmptyAxis {
                name,
                axis: "longitude",
            });
        }
        if times.is_empty() {
            return Err(GridError::EmptyAxis { name, axis: "time" });
        }

        let expected = times.len() * lats.len() * lons.len();
        if values.len() != expected {
            return Err(GridError::SizeMismatch {
                name,
                expected,
                actual: values.len(),
            });
        }

        Ok(Self {
            name,
            lats,
            lons,
            times,
            values,
        })
    }

    /// Value at (time index, lat index, lon index).
    pub fn value(&self, t: usize, i: usize, j: usize) -> f64 {
        self.values[(t * self.lats.len() + i) * self.lons.len() + j]
    }

    /// Time series of the variable at one grid cell.
    pub fn series_at(&self, i: usize, j: usize) -> Vec<f64> {
        (0..self.times.len()).map(|t| self.value(t, i, j)).collect()
    }

    /// Whether a coordinate falls within the axis extents.
    pub fn covers(&self, lat: f64, lon: f64) -> bool {
        let (lat_min, lat_max) = axis_extent(&self.lats);
        let (lon_min, lon_max) = axis_extent(&self.lons);
        lat >= lat_min && lat <= lat_max && lon >= lon_min && lon <= lon_max
    }
}

fn axis_extent(axis: &[f64]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in axis {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    (min, max)
}

/// Find the grid indices nearest a target coordinate.
///
/// Minimizes squared Euclidean distance in (lat, lon) space over the full
/// grid cross product. Ties resolve to the first minimal cell in row-major
/// iteration order, which makes the lookup idempotent.
pub fn nearest_grid_indices(lats: &[f64], lons: &[f64], lat: f64, lon: f64) -> (usize, usize) {
    let mut best = (0, 0);
    let mut best_dist = f64::INFINITY;

    for (i, &glat) in lats.iter().enumerate() {
        for (j, &glon) in lons.iter().enumerate() {
            let dlat = glat - lat;
            let dlon = glon - lon;
            let dist = dlat * dlat + dlon * dlon;
            if dist < best_dist {
                best_dist = dist;
                best = (i, j);
            }
        }
    }

    best
}

/// Wind sample at one timestamp.
#[derive(Clone, Copy, Debug)]
pub struct WindRecord {
    /// Calendar date
    pub date: NaiveDate,
    /// Eastward component (m/s)
    pub u: f64,
    /// Northward component (m/s)
    pub v: f64,
}

impl WindRecord {
    /// Wind speed: sqrt(u² + v²).
    pub fn speed(&self) -> f64 {
        (self.u * self.u + self.v * self.v).sqrt()
    }

    /// Mathematical wind direction: atan2(v, u) wrapped to [0, 2π).
    pub fn direction(&self) -> f64 {
        let mut d = self.v.atan2(self.u);
        if d < 0.0 {
            d += 2.0 * PI;
        }
        d
    }
}

/// Wind time series extracted at one grid cell.
#[derive(Clone, Debug)]
pub struct WindSeries {
    /// Latitude of the sampled grid cell
    pub grid_lat: f64,
    /// Longitude of the sampled grid cell
    pub grid_lon: f64,
    /// Samples in time order
    pub records: Vec<WindRecord>,
}

impl WindSeries {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Extract the wind time series nearest a target coordinate.
///
/// Validates that the u and v fields share identical latitude, longitude,
/// and time axes, then samples both at the grid cell nearest
/// `(lat, lon)`.
///
/// # Errors
///
/// * [`GridError::AxisMismatch`] when the two fields disagree on any axis.
/// * [`GridError::OutOfCoverage`] when the target coordinate lies outside
///   the grid. This is a caller configuration error and is never retried.
pub fn extract_wind(
    u_field: &GriddedField,
    v_field: &GriddedField,
    lat: f64,
    lon: f64,
) -> Result<WindSeries, GridError> {
    check_axes_match(u_field, v_field)?;

    if !u_field.covers(lat, lon) {
        return Err(GridError::OutOfCoverage { lat, lon });
    }

    let (i, j) = nearest_grid_indices(&u_field.lats, &u_field.lons, lat, lon);

    let u_series = u_field.series_at(i, j);
    let v_series = v_field.series_at(i, j);

    let records = u_field
        .times
        .iter()
        .zip(u_series.iter())
        .zip(v_series.iter())
        .map(|((&date, &u), &v)| WindRecord { date, u, v })
        .collect();

    Ok(WindSeries {
        grid_lat: u_field.lats[i],
        grid_lon: u_field.lons[j],
        records,
    })
}

fn check_axes_match(left: &GriddedField, right: &GriddedField) -> Result<(), GridError> {
    let mismatch = |axis: &'static str| GridError::AxisMismatch {
        axis,
        left: left.name.clone(),
        right: right.name.clone(),
    };

    if left.lats != right.lats {
        return Err(mismatch("latitude"));
    }
    if left.lons != right.lons {
        return Err(mismatch("longitude"));
    }
    if left.times != right.times {
        return Err(mismatch("time"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    fn dates(n: usize) -> Vec<NaiveDate> {
        (0..n)
            .map(|i| NaiveDate::from_ymd_opt(2000, i as u32 + 1, 1).unwrap())
            .collect()
    }

    fn constant_field(name: &str, value: f64) -> GriddedField {
        let lats = vec![51.0, 52.0, 53.0];
        let lons = vec![3.0, 4.0, 5.0, 6.0];
        let times = dates(2);
        let values = vec![value; times.len() * lats.len() * lons.len()];
        GriddedField::new(name, lats, lons, times, values).unwrap()
    }

    #[test]
    fn test_field_size_validation() {
        let result = GriddedField::new(
            "u10",
            vec![51.0],
            vec![3.0, 4.0],
            dates(2),
            vec![0.0; 3], // expected 4
        );
        assert!(matches!(result, Err(GridError::SizeMismatch { .. })));
    }

    #[test]
    fn test_value_layout() {
        let lats = vec![51.0, 52.0];
        let lons = vec![3.0, 4.0];
        // (time, lat, lon) flattened: t0: [[0,1],[2,3]], t1: [[4,5],[6,7]]
        let values: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let field = GriddedField::new("u10", lats, lons, dates(2), values).unwrap();

        assert!((field.value(0, 0, 1) - 1.0).abs() < TOL);
        assert!((field.value(0, 1, 0) - 2.0).abs() < TOL);
        assert!((field.value(1, 1, 1) - 7.0).abs() < TOL);
        assert_eq!(field.series_at(1, 0), vec![2.0, 6.0]);
    }

    #[test]
    fn test_nearest_gridpoint() {
        let lats = vec![51.0, 52.0, 53.0];
        let lons = vec![3.0, 4.0, 5.0];

        assert_eq!(nearest_grid_indices(&lats, &lons, 52.1, 4.2), (1, 1));
        assert_eq!(nearest_grid_indices(&lats, &lons, 50.0, 2.0), (0, 0));
        assert_eq!(nearest_grid_indices(&lats, &lons, 60.0, 10.0), (2, 2));
    }

    #[test]
    fn test_nearest_gridpoint_tie_breaks_row_major() {
        // Target equidistant from all four cells; first in row-major order wins
        let lats = vec![51.0, 52.0];
        let lons = vec![3.0, 4.0];
        assert_eq!(nearest_grid_indices(&lats, &lons, 51.5, 3.5), (0, 0));
    }

    #[test]
    fn test_nearest_gridpoint_idempotent() {
        let lats = vec![51.0, 52.0, 53.0];
        let lons = vec![3.0, 4.0, 5.0];

        let (i, j) = nearest_grid_indices(&lats, &lons, 52.4, 4.6);
        let (i2, j2) = nearest_grid_indices(&lats, &lons, lats[i], lons[j]);
        assert_eq!((i, j), (i2, j2));
    }

    #[test]
    fn test_wind_record_derived() {
        let r = WindRecord {
            date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            u: 3.0,
            v: 4.0,
        };
        assert!((r.speed() - 5.0).abs() < TOL);

        // Pure northward wind: direction = π/2
        let r = WindRecord {
            date: r.date,
            u: 0.0,
            v: 2.0,
        };
        assert!((r.direction() - PI / 2.0).abs() < TOL);

        // Pure southward wind wraps into [0, 2π)
        let r = WindRecord {
            date: r.date,
            u: 0.0,
            v: -2.0,
        };
        assert!((r.direction() - 3.0 * PI / 2.0).abs() < TOL);
    }

    #[test]
    fn test_extract_wind() {
        let u = constant_field("u10", 3.0);
        let v = constant_field("v10", -4.0);

        let series = extract_wind(&u, &v, 52.1, 4.2).unwrap();
        assert_eq!(series.len(), 2);
        assert!((series.grid_lat - 52.0).abs() < TOL);
        assert!((series.grid_lon - 4.0).abs() < TOL);
        assert!((series.records[0].speed() - 5.0).abs() < TOL);
    }

    #[test]
    fn test_extract_wind_axis_mismatch() {
        let u = constant_field("u10", 1.0);
        let mut v = constant_field("v10", 1.0);
        v.lats[0] += 0.5;
        // Rebuild with the shifted axis to keep sizes consistent
        let v = GriddedField::new("v10", v.lats, v.lons, v.times, vec![1.0; 24]).unwrap();

        let result = extract_wind(&u, &v, 52.0, 4.0);
        assert!(matches!(
            result,
            Err(GridError::AxisMismatch {
                axis: "latitude",
                ..
            })
        ));
    }

    #[test]
    fn test_extract_wind_out_of_coverage() {
        let u = constant_field("u10", 1.0);
        let v = constant_field("v10", 1.0);

        let result = extract_wind(&u, &v, 70.0, 4.0);
        assert!(matches!(result, Err(GridError::OutOfCoverage { .. })));
    }
}
