//! Tide gauge station metadata and observation series.
//!
//! A [`Station`] carries the archive identity and location of a tide gauge;
//! an [`ObservationSeries`] is the ordered sequence of height observations
//! for one station at one cadence (monthly or annual). Heights are stored in
//! millimeters relative to the archive datum; missing readings are `None`
//! (the archive sentinel is translated by the reader, see [`crate::io`]).
//!
//! # Example
//!
//! ```
//! use sealevel_rs::station::Station;
//!
//! let station = Station::new(22, "HOEK VAN HOLLAND", 51.9775, 4.12)
//!     .with_coastline_code(150)
//!     .with_datum_offset_mm(6976.0);
//!
//! assert_eq!(station.id, 22);
//! ```

use chrono::NaiveDate;
use serde::Serialize;

use crate::time::Cadence;

/// Metadata for a tide gauge station.
///
/// Immutable once loaded from the archive.
#[derive(Clone, Debug, Serialize)]
pub struct Station {
    /// Archive station identifier
    pub id: u64,
    /// Station name as listed in the archive
    pub name: String,
    /// Latitude (degrees North)
    pub latitude: f64,
    /// Longitude (degrees East)
    pub longitude: f64,
    /// Archive coastline code
    pub coastline_code: u32,
    /// Datum correction offset (mm), subtracted from raw heights
    pub datum_offset_mm: f64,
    /// Dominant shore orientation (compass degrees), used for wind projection
    pub shore_angle_deg: Option<f64>,
}

impl Station {
    /// Create a new station.
    ///
    /// # Arguments
    /// * `id` - Archive station identifier
    /// * `name` - Station name
    /// * `latitude` - Latitude in degrees North
    /// * `longitude` - Longitude in degrees East
    pub fn new(id: u64, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            name: name.into(),
            latitude,
            longitude,
            coastline_code: 0,
            datum_offset_mm: 0.0,
            shore_angle_deg: None,
        }
    }

    /// Set the archive coastline code.
    pub fn with_coastline_code(mut self, code: u32) -> Self {
        self.coastline_code = code;
        self
    }

    /// Set the datum correction offset in millimeters.
    ///
    /// The offset is subtracted from raw heights to bring them onto the
    /// revised local reference.
    pub fn with_datum_offset_mm(mut self, offset: f64) -> Self {
        self.datum_offset_mm = offset;
        self
    }

    /// Set the dominant shore orientation in compass degrees.
    pub fn with_shore_angle_deg(mut self, angle: f64) -> Self {
        self.shore_angle_deg = Some(angle);
        self
    }
}

/// A single dated height observation.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ObservationPoint {
    /// Calendar date (first of month)
    pub date: NaiveDate,
    /// Fractional-year encoding from the source archive
    pub year_fraction: f64,
    /// Height in mm, `None` when the archive reported the missing sentinel
    pub height: Option<f64>,
    /// Whether the archive marked the value as interpolated
    pub interpolated: bool,
}

/// Ordered height observations for one station at one cadence.
#[derive(Clone, Debug, Serialize)]
pub struct ObservationSeries {
    /// Archive station identifier
    pub station_id: u64,
    /// Sampling cadence
    #[serde(skip)]
    pub cadence: Cadence,
    /// Observations in time order
    pub points: Vec<ObservationPoint>,
}

impl ObservationSeries {
    /// Create a series from observation points.
    pub fn new(station_id: u64, cadence: Cadence, points: Vec<ObservationPoint>) -> Self {
        Self {
            station_id,
            cadence,
            points,
        }
    }

    /// Number of observations (including missing ones).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of non-missing observations.
    pub fn n_valid(&self) -> usize {
        self.points.iter().filter(|p| p.height.is_some()).count()
    }

    /// Mean of the non-missing heights, or `None` if all are missing.
    pub fn mean_height(&self) -> Option<f64> {
        let valid: Vec<f64> = self.points.iter().filter_map(|p| p.height).collect();
        if valid.is_empty() {
            return None;
        }
        Some(valid.iter().sum::<f64>() / valid.len() as f64)
    }

    /// Subtract a datum correction offset (mm) from every non-missing height.
    ///
    /// Missing observations stay missing; the sentinel translation happened
    /// at read time, so the correction never touches sentinel values.
    pub fn apply_datum_correction(&mut self, offset_mm: f64) {
        for point in &mut self.points {
            if let Some(h) = point.height.as_mut() {
                *h -= offset_mm;
            }
        }
    }
}

/// Dutch main tide gauge stations.
///
/// The six stations that make up the Dutch sea-level monitoring network,
/// with archive identifiers and approximate dominant shore orientations.
/// Coordinates should be verified against official sources.
pub mod dutch_stations {
    use super::Station;

    /// Coastline code for the Netherlands in the archive.
    pub const COASTLINE_NETHERLANDS: u32 = 150;

    /// Vlissingen tide gauge.
    pub fn vlissingen() -> Station {
        Station::new(20, "VLISSINGEN", 51.442, 3.596)
            .with_coastline_code(COASTLINE_NETHERLANDS)
            .with_shore_angle_deg(60.0)
    }

    /// Hoek van Holland tide gauge.
    pub fn hoek_van_holland() -> Station {
        Station::new(22, "HOEK VAN HOLLAND", 51.978, 4.120)
            .with_coastline_code(COASTLINE_NETHERLANDS)
            .with_shore_angle_deg(45.0)
    }

    /// Den Helder tide gauge.
    pub fn den_helder() -> Station {
        Station::new(23, "DEN HELDER", 52.964, 4.745)
            .with_coastline_code(COASTLINE_NETHERLANDS)
            .with_shore_angle_deg(15.0)
    }

    /// Delfzijl tide gauge.
    pub fn delfzijl() -> Station {
        Station::new(24, "DELFZIJL", 53.326, 6.933)
            .with_coastline_code(COASTLINE_NETHERLANDS)
            .with_shore_angle_deg(100.0)
    }

    /// Harlingen tide gauge.
    pub fn harlingen() -> Station {
        Station::new(25, "HARLINGEN", 53.176, 5.409)
            .with_coastline_code(COASTLINE_NETHERLANDS)
            .with_shore_angle_deg(70.0)
    }

    /// IJmuiden tide gauge.
    pub fn ijmuiden() -> Station {
        Station::new(32, "IJMUIDEN", 52.462, 4.555)
            .with_coastline_code(COASTLINE_NETHERLANDS)
            .with_shore_angle_deg(30.0)
    }

    /// All six main Dutch stations.
    pub fn all_stations() -> Vec<Station> {
        vec![
            vlissingen(),
            hoek_van_holland(),
            den_helder(),
            delfzijl(),
            harlingen(),
            ijmuiden(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{decode_fractional_years, Cadence};

    const TOL: f64 = 1e-10;

    fn make_series(heights: &[Option<f64>]) -> ObservationSeries {
        let years: Vec<f64> = (0..heights.len()).map(|i| 1950.0 + i as f64 / 12.0).collect();
        let dates = decode_fractional_years(&years, Cadence::Monthly).unwrap();
        let points = dates
            .iter()
            .zip(years.iter())
            .zip(heights.iter())
            .map(|((&date, &year_fraction), &height)| ObservationPoint {
                date,
                year_fraction,
                height,
                interpolated: false,
            })
            .collect();
        ObservationSeries::new(20, Cadence::Monthly, points)
    }

    #[test]
    fn test_station_builder() {
        let station = Station::new(22, "HOEK VAN HOLLAND", 51.978, 4.12)
            .with_coastline_code(150)
            .with_datum_offset_mm(6976.0)
            .with_shore_angle_deg(45.0);

        assert_eq!(station.id, 22);
        assert_eq!(station.coastline_code, 150);
        assert!((station.datum_offset_mm - 6976.0).abs() < TOL);
        assert_eq!(station.shore_angle_deg, Some(45.0));
    }

    #[test]
    fn test_mean_height_skips_missing() {
        let series = make_series(&[Some(100.0), None, Some(104.0)]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.n_valid(), 2);
        assert!((series.mean_height().unwrap() - 102.0).abs() < TOL);
    }

    #[test]
    fn test_mean_height_all_missing() {
        let series = make_series(&[None, None]);
        assert!(series.mean_height().is_none());
    }

    #[test]
    fn test_datum_correction_preserves_missing() {
        let mut series = make_series(&[Some(7100.0), None, Some(7050.0)]);
        series.apply_datum_correction(7000.0);

        assert!((series.points[0].height.unwrap() - 100.0).abs() < TOL);
        assert!(series.points[1].height.is_none());
        assert!((series.points[2].height.unwrap() - 50.0).abs() < TOL);
    }

    #[test]
    fn test_dutch_stations() {
        let stations = dutch_stations::all_stations();
        assert_eq!(stations.len(), 6);
        assert!(stations.iter().all(|s| s.coastline_code == 150));
        assert!(stations.iter().all(|s| s.shore_angle_deg.is_some()));

        let hoek = dutch_stations::hoek_van_holland();
        assert_eq!(hoek.id, 22);
    }
}
