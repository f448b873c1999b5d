//! Real-time GNSS height-above-ground monitoring.
//!
//! Combines a live NMEA-0183 positioning stream with a digital elevation
//! model: each GGA fix is reprojected from WGS84 into the DEM's native
//! coordinate system, the raster is sampled at that point, and the
//! receiver's height above ground (MSL altitude minus ground elevation)
//! is emitted.
//!
//! The two-tier failure policy runs through everything: opening the DEM,
//! building the coordinate transform, and opening the transport are
//! session-fatal, reported once; every per-line or per-fix failure is a
//! typed result that the stream loop classifies and skips.

pub mod core;
pub mod io;
pub mod types;

// Re-export the main types for easier access
pub use crate::core::{
    pipeline::ElevationSession,
    reproject::Reprojector,
    stream::{run, DisplayUpdate, SessionConfig, StreamLoop},
};
pub use crate::io::{
    dem::DemRaster,
    nmea,
    transport::{LineReader, LineSource},
};
pub use crate::types::{
    ConversionError, ElevationReading, GeoTransform, GeodeticFix, HeightResult, ParseError,
    PipelineError, ProjectedPoint, RasterCell, SampleError, SessionError, SessionResult,
};
