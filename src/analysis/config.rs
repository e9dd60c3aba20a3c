use crate::error::CoverageError;
use crate::index::grid::CellSize;
use crate::index::spatial_index::CellSpan;
use crate::trajectory::reconstructor::DEFAULT_MAX_HOURLY_TRAVEL_KM;
use bon::Builder;

/// Distance, in kilometers, beyond which a sample has no meaningful ground
/// observation nearby.
pub const DEFAULT_GAP_THRESHOLD_KM: f64 = 200.0;

/// Policy knobs of a coverage analysis. Every field has a default.
///
/// # Examples
///
/// ```
/// use balloon_coverage::{CoverageConfig, CellSpan};
///
/// let config = CoverageConfig::builder()
///     .gap_threshold_km(150.0)
///     .cell_span(CellSpan::LatitudeScaled)
///     .build();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.max_hourly_travel_km, 500.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Builder)]
pub struct CoverageConfig {
    #[builder(default = DEFAULT_GAP_THRESHOLD_KM)]
    pub gap_threshold_km: f64,
    #[builder(default = DEFAULT_MAX_HOURLY_TRAVEL_KM)]
    pub max_hourly_travel_km: f64,
    #[builder(default)]
    pub cell_size: CellSize,
    #[builder(default)]
    pub cell_span: CellSpan,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CoverageConfig {
    /// Checks the distances are positive and finite. The cell size is already
    /// checked by [`CellSize::new`].
    pub fn validate(&self) -> Result<(), CoverageError> {
        for (name, value) in [
            ("gap_threshold_km", self.gap_threshold_km),
            ("max_hourly_travel_km", self.max_hourly_travel_km),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CoverageError::InvalidConfig(format!(
                    "{} must be a positive number of kilometers, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoverageConfig::default();
        assert_eq!(config.gap_threshold_km, 200.0);
        assert_eq!(config.max_hourly_travel_km, 500.0);
        assert_eq!(config.cell_size.degrees(), 5.0);
        assert_eq!(config.cell_span, CellSpan::Equatorial);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_distances() {
        let config = CoverageConfig::builder().gap_threshold_km(0.0).build();
        assert!(matches!(config.validate(), Err(CoverageError::InvalidConfig(_))));

        let config = CoverageConfig::builder()
            .max_hourly_travel_km(f64::INFINITY)
            .build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_custom_cell_size() -> Result<(), CoverageError> {
        let config = CoverageConfig::builder()
            .cell_size(CellSize::new(2.5)?)
            .build();
        assert_eq!(config.cell_size.columns(), 144);
        Ok(())
    }
}
