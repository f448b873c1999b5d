use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// One position + altitude sample decoded from a single GGA sentence.
///
/// A fix is atomic: it is only ever built from a fully decoded sentence,
/// so partially parsed data never leaks into the pipeline. The optional
/// fields are decoded leniently; their absence never fails a parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeodeticFix {
    /// Latitude in decimal degrees, positive north. In [-90, 90].
    pub latitude: f64,
    /// Longitude in decimal degrees, positive east. In [-180, 180].
    pub longitude: f64,
    /// Altitude above mean sea level in meters, as reported by the receiver.
    pub altitude_msl: f64,
    /// UTC time of fix, when the sentence carries a well-formed one.
    pub utc: Option<NaiveTime>,
    /// GPS quality indicator (0 = no fix, 1 = GPS, 2 = DGPS, ...).
    pub quality: Option<u8>,
    /// Number of satellites used in the solution.
    pub satellites: Option<u32>,
}

/// A fix transformed into the DEM's native coordinate system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Easting (or longitude for geographic rasters), in raster linear units.
    pub x: f64,
    /// Northing (or latitude for geographic rasters), in raster linear units.
    pub y: f64,
}

/// Grid indices of the raster cell containing a projected point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterCell {
    pub row: usize,
    pub col: usize,
}

/// One elevation value read from the DEM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElevationReading {
    /// Ground elevation in meters.
    Ground(f32),
    /// The cell is explicitly marked as carrying no valid elevation.
    NoData,
}

/// Affine raster georeferencing, the same six coefficients GDAL reports.
///
/// Maps fractional (col, row) grid positions to map coordinates:
/// `x = top_left_x + col * pixel_width + row * rotation_x` and
/// `y = top_left_y + col * rotation_y + row * pixel_height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Builds from GDAL's 6-element geotransform array.
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self {
            top_left_x: gt[0],
            pixel_width: gt[1],
            rotation_x: gt[2],
            top_left_y: gt[3],
            rotation_y: gt[4],
            pixel_height: gt[5],
        }
    }

    /// Determinant of the 2x2 linear part. Zero means the affine cannot
    /// be inverted and the raster cannot be indexed by coordinate.
    pub fn determinant(&self) -> f64 {
        self.pixel_width * self.pixel_height - self.rotation_x * self.rotation_y
    }

    /// Map coordinate of the center of `cell`.
    pub fn coordinate_of(&self, cell: RasterCell) -> ProjectedPoint {
        let col = cell.col as f64 + 0.5;
        let row = cell.row as f64 + 0.5;
        ProjectedPoint {
            x: self.top_left_x + col * self.pixel_width + row * self.rotation_x,
            y: self.top_left_y + col * self.rotation_y + row * self.pixel_height,
        }
    }

    /// Fractional (row, col) grid position of a map coordinate, by
    /// inverting the affine. `None` when the affine is degenerate.
    pub fn index_of(&self, point: ProjectedPoint) -> Option<(f64, f64)> {
        let det = self.determinant();
        if det == 0.0 {
            return None;
        }
        let dx = point.x - self.top_left_x;
        let dy = point.y - self.top_left_y;
        let col = (dx * self.pixel_height - dy * self.rotation_x) / det;
        let row = (dy * self.pixel_width - dx * self.rotation_y) / det;
        Some((row, col))
    }
}

/// The per-fix output of the pipeline. Produced once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightResult {
    /// Altitude above mean sea level in meters, straight from the fix.
    pub altitude_msl: f64,
    /// DEM ground elevation at the fix's horizontal position, in meters.
    pub ground_elevation: f64,
    /// `altitude_msl - ground_elevation`, in meters.
    pub height_above_ground: f64,
}

impl HeightResult {
    pub fn new(altitude_msl: f64, ground_elevation: f64) -> Self {
        Self {
            altitude_msl,
            ground_elevation,
            height_above_ground: altitude_msl - ground_elevation,
        }
    }
}

/// Failure to decode a DDDMM.MMMM coordinate field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("coordinate field has no decimal point")]
    MissingDecimalPoint,

    #[error("coordinate field is not numeric")]
    NotNumeric,

    #[error("unrecognized hemisphere indicator {0:?}")]
    UnknownHemisphere(String),
}

/// Per-line parse outcome. Both variants are recoverable: the caller
/// skips the line and resumes with the next one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("not a GGA fix sentence")]
    NotRecognized,

    #[error("malformed GGA sentence: {0}")]
    Malformed(String),
}

impl From<ConversionError> for ParseError {
    fn from(e: ConversionError) -> Self {
        ParseError::Malformed(e.to_string())
    }
}

/// Failure to resolve a projected point to a raster cell.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SampleError {
    #[error("projected point ({x:.1}, {y:.1}) falls outside the DEM grid")]
    OutOfBounds { x: f64, y: f64 },
}

/// Classified per-line failure. Never terminates the session; the worker
/// loop logs or surfaces it and continues with the next line.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The line did not yield a fix.
    #[error("parse: {0}")]
    Parse(#[from] ParseError),

    /// The fix could not be transformed into the raster's CRS.
    #[error("reprojection failed: {source}")]
    Reproject {
        altitude_msl: f64,
        #[source]
        source: gdal::errors::GdalError,
    },

    /// The fix projects outside the DEM extent.
    #[error("fix outside the DEM extent: {source}")]
    OutsideDem {
        altitude_msl: f64,
        #[source]
        source: SampleError,
    },

    /// The DEM cell at the fix's position is marked no-data.
    #[error("DEM has no elevation data at the fix position")]
    NoData { altitude_msl: f64 },
}

impl PipelineError {
    /// MSL altitude of the underlying fix, when one was decoded. The
    /// altitude stays displayable even when the height is not.
    pub fn altitude_msl(&self) -> Option<f64> {
        match self {
            PipelineError::Parse(_) => None,
            PipelineError::Reproject { altitude_msl, .. }
            | PipelineError::OutsideDem { altitude_msl, .. }
            | PipelineError::NoData { altitude_msl } => Some(*altitude_msl),
        }
    }
}

/// Session-setup failure. Unlike [`PipelineError`] these are fatal: they
/// are reported once and the worker loop never starts.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("DEM carries no coordinate reference system")]
    MissingCrs,

    #[error("DEM geotransform is not invertible")]
    DegenerateGeoTransform,

    #[error("DEM raster layout error: {0}")]
    InvalidRaster(String),
}

/// Result type for session setup.
pub type SessionResult<T> = Result<T, SessionError>;
