use aglmon::{DisplayUpdate, SessionConfig, StreamLoop};
use anyhow::bail;
use clap::Parser;
use std::path::PathBuf;
use std::sync::mpsc;

/// Live GNSS height-above-ground monitor.
///
/// Reads GGA sentences from a line source, samples the DEM at each fix,
/// and prints the MSL altitude and the height above ground.
#[derive(Debug, Parser)]
#[command(name = "aglmon", version, about)]
struct Args {
    /// DEM raster (any GDAL-readable format, e.g. GeoTIFF)
    #[arg(long)]
    dem: PathBuf,

    /// Line source: a serial device node (e.g. /dev/ttyUSB0) or a
    /// recorded NMEA log
    #[arg(long)]
    source: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (tx, rx) = mpsc::channel();
    let worker = StreamLoop::spawn(
        SessionConfig {
            dem_path: args.dem,
            source_path: args.source,
        },
        tx,
    );

    // The display lives here, on the channel's receiving thread. A fix
    // without terrain data refreshes the altitude but re-shows the last
    // valid height instead of blanking it.
    let mut last_height: Option<f64> = None;
    let mut fatal: Option<String> = None;
    for update in rx {
        match update {
            DisplayUpdate::Reading(reading) => {
                last_height = Some(reading.height_above_ground);
                println!(
                    "MSL altitude: {:9.2} m | height above ground: {:9.2} m",
                    reading.altitude_msl, reading.height_above_ground
                );
            }
            DisplayUpdate::HeightUnavailable { altitude_msl } => match last_height {
                Some(height) => println!(
                    "MSL altitude: {:9.2} m | height above ground: {:9.2} m (no terrain data at fix)",
                    altitude_msl, height
                ),
                None => println!(
                    "MSL altitude: {:9.2} m | height above ground:         - m",
                    altitude_msl
                ),
            },
            DisplayUpdate::Fatal(message) => {
                fatal = Some(message);
                break;
            }
        }
    }

    if worker.join().is_err() {
        bail!("worker thread panicked");
    }
    if let Some(message) = fatal {
        bail!("{message}");
    }
    Ok(())
}
