//! Dataset configuration for archive access.
//!
//! Path templates and per-dataset constants live in an explicit
//! [`ArchiveConfig`] value that callers pass into reader calls, instead of a
//! mutable global dataset registry.

use crate::io::MISSING_SENTINEL;
use crate::time::Cadence;

/// Which archive dataset variant a series comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetVariant {
    /// Monthly heights relative to the local metric datum
    MetricMonthly,
    /// Annual heights relative to the local metric datum
    MetricAnnual,
    /// Monthly heights on the revised local reference
    RlrMonthly,
    /// Annual heights on the revised local reference
    RlrAnnual,
}

impl DatasetVariant {
    /// Sampling cadence of this variant.
    pub fn cadence(&self) -> Cadence {
        match self {
            Self::MetricMonthly | Self::RlrMonthly => Cadence::Monthly,
            Self::MetricAnnual | Self::RlrAnnual => Cadence::Annual,
        }
    }

    /// Archive directory name for this variant.
    pub fn directory(&self) -> &'static str {
        match self {
            Self::MetricMonthly => "met_monthly",
            Self::MetricAnnual => "met_annual",
            Self::RlrMonthly => "rlr_monthly",
            Self::RlrAnnual => "rlr_annual",
        }
    }

    /// Whether heights of this variant still need the datum correction.
    pub fn needs_datum_correction(&self) -> bool {
        matches!(self, Self::MetricMonthly | Self::MetricAnnual)
    }
}

/// Archive layout and constants for one dataset variant.
///
/// Templates use `{id}` as the station-id placeholder.
#[derive(Clone, Debug)]
pub struct ArchiveConfig {
    /// Dataset variant
    pub variant: DatasetVariant,
    /// Data file path template, relative to the archive root
    pub data_template: String,
    /// Metadata text file path template, relative to the archive root
    pub metadata_template: String,
    /// Missing-height sentinel value
    pub sentinel: f64,
}

impl ArchiveConfig {
    /// Configuration with the standard archive layout for a variant.
    pub fn new(variant: DatasetVariant) -> Self {
        Self {
            variant,
            data_template: format!("{}/data/{{id}}.rlrdata", variant.directory()),
            metadata_template: format!("{}/docu/{{id}}.txt", variant.directory()),
            sentinel: MISSING_SENTINEL,
        }
    }

    /// Override the data file template.
    pub fn with_data_template(mut self, template: impl Into<String>) -> Self {
        self.data_template = template.into();
        self
    }

    /// Override the metadata file template.
    pub fn with_metadata_template(mut self, template: impl Into<String>) -> Self {
        self.metadata_template = template.into();
        self
    }

    /// Data file path for a station.
    pub fn data_path(&self, station_id: u64) -> String {
        self.data_template.replace("{id}", &station_id.to_string())
    }

    /// Metadata file path for a station.
    pub fn metadata_path(&self, station_id: u64) -> String {
        self.metadata_template
            .replace("{id}", &station_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_cadence() {
        assert_eq!(DatasetVariant::MetricMonthly.cadence(), Cadence::Monthly);
        assert_eq!(DatasetVariant::RlrAnnual.cadence(), Cadence::Annual);
    }

    #[test]
    fn test_datum_correction_only_for_metric() {
        assert!(DatasetVariant::MetricMonthly.needs_datum_correction());
        assert!(DatasetVariant::MetricAnnual.needs_datum_correction());
        assert!(!DatasetVariant::RlrMonthly.needs_datum_correction());
        assert!(!DatasetVariant::RlrAnnual.needs_datum_correction());
    }

    #[test]
    fn test_path_templates() {
        let config = ArchiveConfig::new(DatasetVariant::RlrMonthly);
        assert_eq!(config.data_path(22), "rlr_monthly/data/22.rlrdata");
        assert_eq!(config.metadata_path(22), "rlr_monthly/docu/22.txt");
    }

    #[test]
    fn test_template_override() {
        let config = ArchiveConfig::new(DatasetVariant::MetricAnnual)
            .with_data_template("local/{id}.csv");
        assert_eq!(config.data_path(20), "local/20.csv");
        assert!((config.sentinel - MISSING_SENTINEL).abs() < 1e-10);
    }
}
