//! Turn raw Mode S frames into [`Message`]s for the store.
//!
//! This is the thin edge that stands in for an external decoder when
//! replaying hex captures. It extracts only what the tracker consumes:
//! - DF0/4/16/20:    altitude reply (13-bit altitude code)
//! - DF17/18 TC 1-4:  aircraft identification (callsign)
//! - DF17/18 TC 9-18: airborne position, barometric altitude
//! - DF17/18 TC 19:   airborne velocity, ground speed subtypes 1-2
//! - DF17/18 TC 20-22: airborne position, GNSS altitude
//!
//! No CRC validation or error correction is attempted.

use crate::message::Message;
use crate::parity;
use crate::types::*;

/// ADS-B character set for callsign encoding (6 bits per character).
const CALLSIGN_CHARSET: &[u8; 64] =
    b"#ABCDEFGHIJKLMNOPQRSTUVWXYZ##### ###############0123456789######";

// DFs where ICAO is explicit in bytes 1-3
const DF_EXPLICIT_ICAO: &[u8] = &[11, 17, 18];

// ---------------------------------------------------------------------------
// Altitude decoding
// ---------------------------------------------------------------------------

/// Decode 12-bit altitude code from an ADS-B airborne position.
///
/// The Q-bit (bit 4) selects the encoding mode:
/// - Q=1: 25-ft resolution
/// - Q=0: 100-ft Gillham gray code
pub fn decode_altitude(alt_code: u32) -> Option<i32> {
    if alt_code == 0 {
        return None;
    }

    if (alt_code >> 4) & 1 == 1 {
        let n = ((alt_code >> 5) << 4) | (alt_code & 0x0F);
        Some(n as i32 * 25 - 1000)
    } else {
        decode_gillham_altitude(alt_code)
    }
}

/// Decode 13-bit altitude code from DF0/4/16/20.
///
/// - M=0, Q=1: 25-ft increments
/// - M=0, Q=0: 100-ft Gillham gray code
/// - M=1: metric, not decoded
pub fn decode_altitude_13bit(alt_code_13: u32) -> Option<i32> {
    if alt_code_13 == 0 {
        return None;
    }

    let m_bit = (alt_code_13 >> 6) & 1;
    let q_bit = (alt_code_13 >> 4) & 1;

    if m_bit == 1 {
        return None;
    }

    if q_bit == 1 {
        let n =
            ((alt_code_13 & 0x1F80) >> 2) | ((alt_code_13 & 0x0020) >> 1) | (alt_code_13 & 0x000F);
        Some(n as i32 * 25 - 1000)
    } else {
        decode_gillham_altitude(alt_code_13)
    }
}

/// Decode 100-ft Gillham gray code altitude.
fn decode_gillham_altitude(alt_code: u32) -> Option<i32> {
    let bit = |n: u32| (alt_code >> n) & 1;

    // C1 A1 C2 A2 C4 A4 M B1 Q B2 D2 B4 D4
    let (c1, a1, c2, a2, c4, a4) = (bit(12), bit(11), bit(10), bit(9), bit(8), bit(7));
    let (b1, b2, b4) = (bit(5), bit(3), bit(1));

    // 100-ft component from C digit (Gray code)
    let mut c_bin = c4 * 4 + c2 * 2 + c1;
    c_bin ^= c_bin >> 2;
    c_bin ^= c_bin >> 1;

    if c_bin == 0 || c_bin >= 6 {
        return None;
    }

    // 500-ft component: Gray code from combined A and B digits
    let mut ab_bin = (a4 * 4 + a2 * 2 + a1) << 3 | (b4 * 4 + b2 * 2 + b1);
    ab_bin ^= ab_bin >> 4;
    ab_bin ^= ab_bin >> 2;
    ab_bin ^= ab_bin >> 1;

    let altitude = ab_bin as i32 * 500 + c_bin as i32 * 100 - 1200;

    if !(-1200..=126750).contains(&altitude) {
        return None;
    }

    Some(altitude)
}

// ---------------------------------------------------------------------------
// Frame decoding
// ---------------------------------------------------------------------------

/// Decode a 56- or 112-bit frame given as hex.
///
/// Formats and type codes the tracker ignores still come back as a
/// `Message` carrying the address and discriminators.
pub fn decode_frame(hex: &str) -> Result<Message> {
    let hex = hex.trim();
    let raw = hex_decode(hex).ok_or_else(|| TrackError::InvalidHex(hex.to_string()))?;
    if raw.len() != 7 && raw.len() != 14 {
        return Err(TrackError::InvalidLength(raw.len() * 8));
    }

    let df = (raw[0] >> 3) & 0x1F;
    let icao = if DF_EXPLICIT_ICAO.contains(&df) {
        (raw[1] as u32) << 16 | (raw[2] as u32) << 8 | raw[3] as u32
    } else {
        parity::recover_address(&raw)
    };

    let mut msg = Message {
        icao,
        msgtype: df,
        ..Default::default()
    };

    match df {
        0 | 4 | 16 | 20 => {
            let alt_code = ((raw[2] as u32 & 0x1F) << 8) | raw[3] as u32;
            msg.altitude = decode_altitude_13bit(alt_code).unwrap_or(0);
        }
        17 | 18 if raw.len() == 14 => decode_extended_squitter(&raw[4..11], &mut msg),
        _ => {}
    }

    Ok(msg)
}

/// Fill type-code specific fields from the 56-bit ME field.
fn decode_extended_squitter(me: &[u8], msg: &mut Message) {
    let bits = u64::from_be_bytes({
        let mut buf = [0u8; 8];
        buf[1..8].copy_from_slice(me);
        buf
    });

    msg.metype = me[0] >> 3;
    msg.mesub = me[0] & 0x07;

    match msg.metype {
        1..=4 => msg.callsign = decode_callsign(bits),
        9..=18 | 20..=22 => {
            let alt_code = ((bits >> 36) & 0x0FFF) as u32;
            msg.altitude = decode_altitude(alt_code).unwrap_or(0);
            msg.unit = if msg.metype < 19 {
                AltitudeUnit::Barometric
            } else {
                AltitudeUnit::Gnss
            };
            msg.fflag = (bits >> 34) & 1 == 1;
            msg.raw_latitude = ((bits >> 17) & 0x1FFFF) as u32;
            msg.raw_longitude = (bits & 0x1FFFF) as u32;
        }
        19 if matches!(msg.mesub, 1 | 2) => {
            let (speed, heading) = ground_velocity(bits);
            msg.speed = speed;
            msg.heading = heading;
        }
        _ => {}
    }
}

/// Eight 6-bit characters, trailing space and `#` padding removed.
fn decode_callsign(bits: u64) -> String {
    let mut callsign = String::with_capacity(8);
    for i in 0..8 {
        let idx = ((bits >> (42 - i * 6)) & 0x3F) as usize;
        callsign.push(CALLSIGN_CHARSET[idx] as char);
    }
    callsign.trim_end_matches([' ', '#']).to_string()
}

/// Ground speed (kts) and track (degrees) from the raw E/W and N/S
/// components, as dump1090 reports them.
fn ground_velocity(bits: u64) -> (f64, f64) {
    let ew_dir = (bits >> 42) & 1; // 0=East, 1=West
    let ew_vel = ((bits >> 32) & 0x3FF) as i32;
    let ns_dir = (bits >> 31) & 1; // 0=North, 1=South
    let ns_vel = ((bits >> 21) & 0x3FF) as i32;

    let speed = ((ns_vel * ns_vel + ew_vel * ew_vel) as f64).sqrt();
    if speed == 0.0 {
        return (0.0, 0.0);
    }

    let ewv = if ew_dir == 1 { -ew_vel } else { ew_vel } as f64;
    let nsv = if ns_dir == 1 { -ns_vel } else { ns_vel } as f64;
    let mut heading = ewv.atan2(nsv) * 360.0 / (std::f64::consts::PI * 2.0);
    if heading < 0.0 {
        heading += 360.0;
    }

    (speed, heading)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
