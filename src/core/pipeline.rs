//! Per-line elevation pipeline: parse, reproject, sample, subtract.

use crate::core::reproject::Reprojector;
use crate::io::dem::DemRaster;
use crate::io::nmea;
use crate::types::{ElevationReading, HeightResult, PipelineError, SessionResult};
use std::path::Path;

/// The long-lived collaborators of one monitoring session: the DEM and
/// the coordinate transform targeting its CRS.
///
/// Opened once, then shared read-only by every lookup; no per-fix state.
pub struct ElevationSession {
    dem: DemRaster,
    reprojector: Reprojector,
}

impl ElevationSession {
    /// Wraps an already-open DEM, building the session transform from
    /// its metadata.
    pub fn new(dem: DemRaster) -> SessionResult<Self> {
        let reprojector = Reprojector::to_raster_crs(&dem)?;
        Ok(Self { dem, reprojector })
    }

    /// Opens the DEM at `path` and builds the session around it.
    pub fn open<P: AsRef<Path>>(dem_path: P) -> SessionResult<Self> {
        Self::new(DemRaster::open(dem_path)?)
    }

    pub fn dem(&self) -> &DemRaster {
        &self.dem
    }

    /// Processes one line from the stream into a height-above-ground
    /// reading.
    ///
    /// Every failure comes back as a classified [`PipelineError`]; none
    /// of them should end the session. Meters in, meters out, no
    /// smoothing or rounding.
    pub fn process_line(&self, line: &str) -> Result<HeightResult, PipelineError> {
        let fix = nmea::parse_gga(line)?;
        log::debug!(
            "fix: lat {:.6}, lon {:.6}, msl {:.2} m",
            fix.latitude,
            fix.longitude,
            fix.altitude_msl
        );

        let point = self
            .reprojector
            .project(&fix)
            .map_err(|source| PipelineError::Reproject {
                altitude_msl: fix.altitude_msl,
                source,
            })?;

        let reading = self
            .dem
            .sample(point)
            .map_err(|source| PipelineError::OutsideDem {
                altitude_msl: fix.altitude_msl,
                source,
            })?;

        match reading {
            ElevationReading::Ground(ground) => {
                Ok(HeightResult::new(fix.altitude_msl, f64::from(ground)))
            }
            ElevationReading::NoData => Err(PipelineError::NoData {
                altitude_msl: fix.altitude_msl,
            }),
        }
    }
}
