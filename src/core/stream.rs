//! The worker loop: pull lines from the transport, run the pipeline,
//! push display updates over a channel.
//!
//! Exactly one worker reads and processes, in arrival order; the display
//! lives on whatever thread drains the channel, so no UI state is ever
//! touched from the worker.

use crate::core::pipeline::ElevationSession;
use crate::io::transport::{LineReader, LineSource};
use crate::types::{HeightResult, ParseError, PipelineError};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// At most one of these is emitted per input line.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayUpdate {
    /// A fix with a valid terrain sample.
    Reading(HeightResult),
    /// The fix was good but the DEM had nothing for it (outside the
    /// extent, or a no-data cell). The MSL altitude is still current;
    /// the last valid height stays on screen rather than being blanked.
    HeightUnavailable { altitude_msl: f64 },
    /// Session-setup or transport failure, reported once; the loop ends.
    Fatal(String),
}

/// Everything the worker needs to build its session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// DEM raster path (any GDAL-readable format).
    pub dem_path: PathBuf,
    /// Line-source path: a serial device node or a recorded NMEA log.
    pub source_path: PathBuf,
}

/// The blocking read-process-emit loop.
///
/// Runs until the stop flag is raised, the source closes, or the
/// receiving end of `updates` goes away. Per-line failures are logged
/// and skipped; parse skips emit nothing at all so a noisy wire cannot
/// flood the display.
pub fn run<S: LineSource>(
    source: &mut S,
    session: &ElevationSession,
    updates: &Sender<DisplayUpdate>,
    stop: &AtomicBool,
) {
    while !stop.load(Ordering::Relaxed) {
        let line = match source.read_line() {
            Ok(Some(line)) => line,
            // Timed out; loop around and re-check the stop flag.
            Ok(None) => continue,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                log::info!("line source closed, ending session");
                break;
            }
            Err(e) => {
                let _ = updates.send(DisplayUpdate::Fatal(format!("transport failure: {e}")));
                break;
            }
        };
        if line.is_empty() {
            continue;
        }

        match session.process_line(&line) {
            Ok(result) => {
                log::debug!(
                    "msl {:.2} m, ground {:.2} m, agl {:.2} m",
                    result.altitude_msl,
                    result.ground_elevation,
                    result.height_above_ground
                );
                if updates.send(DisplayUpdate::Reading(result)).is_err() {
                    break;
                }
            }
            Err(PipelineError::Parse(ParseError::NotRecognized)) => {
                log::trace!("skipping non-GGA sentence");
            }
            Err(PipelineError::Parse(e)) => {
                log::debug!("skipping line: {e}");
            }
            Err(e) => {
                log::debug!("height unavailable: {e}");
                if let Some(altitude_msl) = e.altitude_msl() {
                    if updates
                        .send(DisplayUpdate::HeightUnavailable { altitude_msl })
                        .is_err()
                    {
                        break;
                    }
                }
            }
        }
    }
}

/// Handle to the background worker thread.
pub struct StreamLoop {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl StreamLoop {
    /// Spawns the worker.
    ///
    /// All session setup happens inside the worker thread: a DEM or
    /// transport open failure becomes a single [`DisplayUpdate::Fatal`]
    /// and the read loop never starts.
    pub fn spawn(config: SessionConfig, updates: Sender<DisplayUpdate>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            let session = match ElevationSession::open(&config.dem_path) {
                Ok(session) => session,
                Err(e) => {
                    let _ = updates.send(DisplayUpdate::Fatal(format!(
                        "failed to open DEM {}: {e}",
                        config.dem_path.display()
                    )));
                    return;
                }
            };
            let mut source = match File::open(&config.source_path) {
                Ok(file) => LineReader::new(file),
                Err(e) => {
                    let _ = updates.send(DisplayUpdate::Fatal(format!(
                        "failed to open line source {}: {e}",
                        config.source_path.display()
                    )));
                    return;
                }
            };

            log::info!(
                "session started: DEM {}, source {}",
                config.dem_path.display(),
                config.source_path.display()
            );
            run(&mut source, &session, &updates, &stop_flag);
        });

        Self { stop, handle }
    }

    /// Requests a cooperative stop. An in-flight read is not interrupted;
    /// it returns at the transport's own read timeout, so shutdown
    /// latency is bounded by that timeout.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Waits for the worker to finish.
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}
