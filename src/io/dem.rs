//! DEM raster access.
//!
//! The on-disk format is GDAL's business; this module adapts an open
//! dataset into the two primitives the pipeline needs: coordinate-to-cell
//! resolution and a single-cell elevation read.

use crate::types::{
    ElevationReading, GeoTransform, ProjectedPoint, RasterCell, SampleError, SessionError,
    SessionResult,
};
use gdal::Dataset;
use ndarray::Array2;
use std::path::Path;

/// An open DEM, with its primary band cached in memory.
///
/// The raster is static for the session, so the whole band is read once
/// at open time and every point query is an in-memory lookup. Shared
/// read-only across the session; nothing here mutates after open.
pub struct DemRaster {
    /// Band 1, shape (rows, cols).
    grid: Array2<f32>,
    transform: GeoTransform,
    /// Declared no-data sentinel, if the band has one.
    nodata: Option<f32>,
    /// The raster's CRS as WKT, read from dataset metadata.
    crs_wkt: String,
}

impl DemRaster {
    /// Opens the dataset at `path` and caches its primary band.
    ///
    /// A dataset without a CRS, or with a non-invertible geotransform,
    /// cannot be sampled by coordinate and is rejected here, once,
    /// rather than failing on every fix.
    pub fn open<P: AsRef<Path>>(path: P) -> SessionResult<Self> {
        log::info!("opening DEM {}", path.as_ref().display());

        let dataset = Dataset::open(path.as_ref())?;
        let crs_wkt = dataset.projection();
        if crs_wkt.trim().is_empty() {
            return Err(SessionError::MissingCrs);
        }

        let transform = GeoTransform::from_gdal(dataset.geo_transform()?);
        let (width, height) = dataset.raster_size();
        let band = dataset.rasterband(1)?;
        let nodata = band.no_data_value().map(|v| v as f32);
        let buffer = band.read_as::<f32>((0, 0), (width, height), (width, height), None)?;
        let grid = Array2::from_shape_vec((height, width), buffer.data)
            .map_err(|e| SessionError::InvalidRaster(e.to_string()))?;

        log::info!(
            "DEM loaded: {width}x{height} cells, nodata {}",
            nodata.map_or_else(|| "none".to_string(), |v| v.to_string())
        );
        Self::from_parts(grid, transform, nodata, crs_wkt)
    }

    /// Builds a raster directly from its parts. `grid` is band data in
    /// (rows, cols) layout.
    pub fn from_parts(
        grid: Array2<f32>,
        transform: GeoTransform,
        nodata: Option<f32>,
        crs_wkt: impl Into<String>,
    ) -> SessionResult<Self> {
        if transform.determinant() == 0.0 {
            return Err(SessionError::DegenerateGeoTransform);
        }
        Ok(Self {
            grid,
            transform,
            nodata,
            crs_wkt: crs_wkt.into(),
        })
    }

    /// The raster's CRS as WKT.
    pub fn crs_wkt(&self) -> &str {
        &self.crs_wkt
    }

    pub fn geo_transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// (rows, cols) of the cached band.
    pub fn dimensions(&self) -> (usize, usize) {
        self.grid.dim()
    }

    /// Resolves a projected coordinate to the cell containing it.
    pub fn cell_at(&self, point: ProjectedPoint) -> Result<RasterCell, SampleError> {
        let out_of_bounds = SampleError::OutOfBounds {
            x: point.x,
            y: point.y,
        };
        // Degenerate transforms are rejected at construction, so this
        // only fails for non-finite coordinates.
        let (row, col) = self.transform.index_of(point).ok_or(out_of_bounds)?;
        if !row.is_finite() || !col.is_finite() {
            return Err(out_of_bounds);
        }

        let (rows, cols) = self.grid.dim();
        let row = row.floor();
        let col = col.floor();
        if row < 0.0 || col < 0.0 || row >= rows as f64 || col >= cols as f64 {
            return Err(out_of_bounds);
        }
        Ok(RasterCell {
            row: row as usize,
            col: col as usize,
        })
    }

    /// Reads the elevation at the cell containing `point`.
    ///
    /// A value equal to the declared no-data sentinel (including a NaN
    /// sentinel) comes back as [`ElevationReading::NoData`] so callers
    /// can surface "height unavailable" instead of a nonsense height.
    pub fn sample(&self, point: ProjectedPoint) -> Result<ElevationReading, SampleError> {
        let cell = self.cell_at(point)?;
        let value = self.grid[[cell.row, cell.col]];
        let is_nodata = match self.nodata {
            Some(sentinel) => value == sentinel || (sentinel.is_nan() && value.is_nan()),
            None => false,
        };
        if is_nodata {
            log::debug!("cell ({}, {}) is nodata", cell.row, cell.col);
            Ok(ElevationReading::NoData)
        } else {
            Ok(ElevationReading::Ground(value))
        }
    }
}
