//! airtrack: replay Mode S captures through the aircraft store.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use airtrack_core::config::{self, StoreConfig};
use airtrack_core::{decode_frame, icao_to_string, Aircraft, AircraftStore, Result, TrackError};

mod input;

#[derive(Parser)]
#[command(name = "airtrack", version, about = "Live aircraft table from Mode S frames")]
struct Cli {
    /// Config file (defaults to ~/.airtrack/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed hex frames into the store and print the live aircraft
    Track {
        /// File with one frame per line (`HEX` or `HEX;TIMESTAMP_MS`), `-` for stdin
        file: PathBuf,

        /// Forget aircraft not seen for this many milliseconds
        #[arg(long, env = "AIRTRACK_TIMEOUT")]
        timeout: Option<u64>,

        /// Query time for the snapshot (ms); defaults to the last frame timestamp
        #[arg(long)]
        at: Option<u64>,

        /// Print the snapshot as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Track {
            file,
            timeout,
            at,
            json,
        } => cmd_track(&file, config_path, timeout, at, json),
        Commands::Config => cmd_config(config_path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Config from `--config`, or `~/.airtrack/config.toml` when not given.
fn load_file_config(config_path: Option<&Path>) -> Result<StoreConfig> {
    match config_path {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
}

/// File config, with the command-line timeout taking precedence.
fn effective_config(config_path: Option<&Path>, timeout: Option<u64>) -> Result<StoreConfig> {
    let mut store_config = load_file_config(config_path)?;
    if let Some(timeout) = timeout {
        store_config.timeout = timeout;
    }
    Ok(store_config.normalized())
}

fn cmd_track(
    file: &Path,
    config_path: Option<&Path>,
    timeout: Option<u64>,
    at: Option<u64>,
    json: bool,
) -> Result<()> {
    let store_config = effective_config(config_path, timeout)?;
    let mut store = AircraftStore::new(store_config);

    let reader = input::open(file).map_err(|e| {
        TrackError::Io(std::io::Error::new(e.kind(), format!("{}: {e}", file.display())))
    })?;

    let mut total_frames = 0u64;
    let mut rejected = 0u64;
    let mut last_timestamp = None;

    for line in reader.lines() {
        let line = line?;
        let Some(frame) = input::parse_line(&line) else {
            continue;
        };
        total_frames += 1;

        match decode_frame(frame.hex) {
            Ok(msg) => {
                store.add_message(&msg, frame.timestamp);
                if frame.timestamp.is_some() {
                    last_timestamp = frame.timestamp;
                }
            }
            Err(e) => {
                rejected += 1;
                warn!(frame = frame.hex, "skipping frame: {e}");
            }
        }
    }

    info!(
        total_frames,
        rejected,
        timeout = store.timeout(),
        "capture replayed from {}",
        file.display()
    );

    let mut aircraft = store.aircrafts(at.or(last_timestamp));
    aircraft.sort_by(|a, b| b.seen.cmp(&a.seen).then(a.icao.cmp(&b.icao)));

    if json {
        let text = serde_json::to_string_pretty(&aircraft)
            .map_err(|e| TrackError::Io(e.into()))?;
        println!("{text}");
    } else {
        println!();
        println!(
            "Frames: {total_frames} read, {rejected} rejected, {} aircraft",
            aircraft.len()
        );
        if !aircraft.is_empty() {
            println!();
            println!("{}", render_table(&aircraft));
        }
    }

    Ok(())
}

fn cmd_config(config_path: Option<&Path>) -> Result<()> {
    let store_config = load_file_config(config_path)?;
    let config_path = config_path.map_or_else(config::config_file, Path::to_path_buf);
    let source = if config_path.exists() {
        config_path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", config_path.display())
    };

    println!();
    println!("Config: {source}");
    println!();
    println!("  timeout: {} ms", store_config.timeout);
    println!();
    Ok(())
}

fn render_table(aircraft: &[&Aircraft]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "ICAO", "Callsign", "Alt", "Unit", "Speed (kts)", "Hdg", "Lat", "Lon", "Seen", "Msgs",
    ]);

    for ac in aircraft {
        let (lat, lon) = if ac.has_position() {
            (format!("{:.5}", ac.lat), format!("{:.5}", ac.lng))
        } else {
            ("-".into(), "-".into())
        };
        let callsign = if ac.callsign.is_empty() {
            "-"
        } else {
            ac.callsign.as_str()
        };

        table.add_row(vec![
            Cell::new(icao_to_string(ac.icao)),
            Cell::new(callsign),
            Cell::new(ac.altitude),
            Cell::new(ac.unit),
            Cell::new(format!("{:.0}", ac.speed)),
            Cell::new(format!("{:.1}", ac.heading)),
            Cell::new(lat),
            Cell::new(lon),
            Cell::new(ac.seen),
            Cell::new(ac.count),
        ]);
    }

    table
}
