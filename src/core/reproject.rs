//! WGS84 to raster-CRS coordinate transformation.

use crate::io::dem::DemRaster;
use crate::types::{GeodeticFix, ProjectedPoint, SessionResult};
use gdal::errors::GdalError;
use gdal::spatial_ref::{CoordTransform, SpatialRef};
use gdal_sys::OSRAxisMappingStrategy;

/// One-time transform from geographic WGS84 (EPSG:4326) into a raster's
/// native CRS.
///
/// Axis mapping is pinned to traditional GIS order on both ends, so the
/// transform always consumes (longitude, latitude) and produces (x, y)
/// regardless of the axis order the authority definition declares.
///
/// Holds no mutable state after construction; construction failure is a
/// session-fatal error, a per-fix transform failure is not.
pub struct Reprojector {
    transform: CoordTransform,
}

impl Reprojector {
    /// Builds the session transform targeting `dem`'s CRS.
    pub fn to_raster_crs(dem: &DemRaster) -> SessionResult<Self> {
        let source = SpatialRef::from_epsg(4326)?;
        let target = SpatialRef::from_wkt(dem.crs_wkt())?;
        source.set_axis_mapping_strategy(OSRAxisMappingStrategy::OAMS_TRADITIONAL_GIS_ORDER);
        target.set_axis_mapping_strategy(OSRAxisMappingStrategy::OAMS_TRADITIONAL_GIS_ORDER);
        let transform = CoordTransform::new(&source, &target)?;
        log::info!("coordinate transform ready: EPSG:4326 -> raster CRS");
        Ok(Self { transform })
    }

    /// Projects a fix into the raster's coordinate system.
    pub fn project(&self, fix: &GeodeticFix) -> Result<ProjectedPoint, GdalError> {
        let mut xs = [fix.longitude];
        let mut ys = [fix.latitude];
        let mut zs = [0.0];
        self.transform.transform_coords(&mut xs, &mut ys, &mut zs)?;
        Ok(ProjectedPoint { x: xs[0], y: ys[0] })
    }
}
