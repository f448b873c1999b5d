//! I/O modules: sentence decoding, DEM raster access, line transport.

pub mod dem;
pub mod nmea;
pub mod transport;

pub use dem::DemRaster;
pub use transport::{LineReader, LineSource};
