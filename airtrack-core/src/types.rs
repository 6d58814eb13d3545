//! Shared types, error enum, and small helpers for airtrack-core.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors produced by airtrack-core.
///
/// Only the edges are fallible (frame adapter, config file). Tracking itself
/// absorbs every message.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    #[error("invalid frame length: expected 56 or 112 bits, got {0}")]
    InvalidLength(usize),
    #[error("config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrackError>;

// ---------------------------------------------------------------------------
// Altitude unit
// ---------------------------------------------------------------------------

/// Which altitude source a message reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AltitudeUnit {
    /// Pressure altitude (Mode C / baro).
    #[default]
    Barometric,
    /// Geometric height from GNSS.
    Gnss,
}

impl std::fmt::Display for AltitudeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AltitudeUnit::Barometric => write!(f, "baro"),
            AltitudeUnit::Gnss => write!(f, "GNSS"),
        }
    }
}

// ---------------------------------------------------------------------------
// ICAO address helpers
// ---------------------------------------------------------------------------

/// 24-bit ICAO transponder address.
pub type Icao = u32;

/// Format ICAO address as 6-char uppercase hex string.
pub fn icao_to_string(icao: Icao) -> String {
    format!("{:06X}", icao & 0xFF_FFFF)
}

/// Parse a 6-char hex string into an ICAO address.
pub fn icao_from_hex(hex: &str) -> Option<Icao> {
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

// ---------------------------------------------------------------------------
// Hex utilities
// ---------------------------------------------------------------------------

/// Decode a hex string into bytes. Case-insensitive, must be even length.
pub fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return None;
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for chunk in hex.as_bytes().chunks(2) {
        let high = hex_digit(chunk[0])?;
        let low = hex_digit(chunk[1])?;
        bytes.push((high << 4) | low);
    }
    Some(bytes)
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// Used only where a caller leaves the timestamp out.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
