//! Core processing: reprojection, the per-line pipeline, the stream loop.

pub mod pipeline;
pub mod reproject;
pub mod stream;

pub use pipeline::ElevationSession;
pub use reproject::Reprojector;
pub use stream::{run, DisplayUpdate, SessionConfig, StreamLoop};
