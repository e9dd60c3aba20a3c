//! Grid geometry: cell sizes and the integer keys of latitude/longitude cells.

use crate::error::CoverageError;
use crate::types::lat_lon::LatLon;

/// Kilometers per degree of latitude, used to turn a search radius into cells.
///
/// Exact enough at the equator, increasingly loose for longitude toward the poles.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Width and height of one grid cell in degrees.
///
/// Must be positive and divide 360 evenly so that longitude columns wrap
/// cleanly at the antimeridian. [`CellSize::new`] therefore refuses positive
/// sizes such as 7° or 0.7° with [`CoverageError::InvalidConfig`]; 1°, 2.5°,
/// 5° and 10° are all fine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSize(f64);

impl CellSize {
    pub const DEFAULT: CellSize = CellSize(5.0);

    pub fn new(degrees: f64) -> Result<Self, CoverageError> {
        if !degrees.is_finite() || degrees <= 0.0 || degrees > 360.0 {
            return Err(CoverageError::InvalidConfig(format!(
                "cell size must be within (0, 360] degrees, got {}",
                degrees
            )));
        }
        let columns = 360.0 / degrees;
        if (columns - columns.round()).abs() > 1e-9 {
            return Err(CoverageError::InvalidConfig(format!(
                "cell size {} does not divide 360 degrees evenly",
                degrees
            )));
        }
        Ok(Self(degrees))
    }

    pub fn degrees(self) -> f64 {
        self.0
    }

    /// Number of longitude columns around the globe.
    pub fn columns(self) -> i64 {
        (360.0 / self.0).round() as i64
    }

    /// Number of latitude rows between the poles (the last one may be partial).
    pub fn rows(self) -> i64 {
        (180.0 / self.0).ceil() as i64
    }

    /// Cells needed on each side of a point's own cell to cover `radius_km`
    /// of latitude.
    pub fn cells_for_radius(self, radius_km: f64) -> i64 {
        let cells = ((radius_km.max(0.0) / KM_PER_DEGREE) / self.0).ceil();
        if cells.is_finite() {
            (cells as i64).min(self.rows())
        } else {
            self.rows()
        }
    }

    /// Brings any column index back into the canonical range, which starts at -180°.
    pub fn wrap_column(self, column: i64) -> i64 {
        let columns = self.columns();
        let half = columns / 2;
        (column + half).rem_euclid(columns) - half
    }
}

impl Default for CellSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Key of one grid cell: row and column indices, i.e. the cell's south-west corner
/// divided by the cell size.
///
/// Columns are always stored wrapped, so longitude 180 and -180 share a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub row: i64,
    pub column: i64,
}

impl GridCell {
    pub fn containing(point: LatLon, cell_size: CellSize) -> Self {
        let degrees = cell_size.degrees();
        let row = (point.0 / degrees).floor() as i64;
        let column = (point.1 / degrees).floor() as i64;
        Self {
            row,
            column: cell_size.wrap_column(column),
        }
    }

    /// The south-west corner of the cell in degrees.
    pub fn corner(&self, cell_size: CellSize) -> LatLon {
        let degrees = cell_size.degrees();
        LatLon(self.row as f64 * degrees, self.column as f64 * degrees)
    }
}
