//! Compact Position Reporting: global CPR decode for airborne positions.
//!
//! An airborne position arrives as two 17-bit fragments, one "even" and one
//! "odd" framed. Neither is unambiguous alone; together they pin down the
//! latitude zone and then the longitude zone.
//!
//! Key constants:
//! - Nb = 17 (bits per coordinate, 2^17 = 131072)
//! - Dlat_even = 360 / 60 = 6.0 degrees
//! - Dlat_odd = 360 / 59 ≈ 6.1017 degrees

/// Maximum CPR value (2^17 = 131072).
const CPR_MAX: f64 = 131072.0;

/// Latitude zone size for even frames.
const DLAT_EVEN: f64 = 360.0 / 60.0;

/// Latitude zone size for odd frames.
const DLAT_ODD: f64 = 360.0 / 59.0;

/// Maximum time between even/odd fragments for a global decode (ms).
pub const PAIR_WINDOW: u64 = 10_000;

/// Upper latitude bound of each NL band, from the 1090-WP-9-14 table.
///
/// Entry `i` is the first latitude where NL drops below `59 - i`.
const NL_TABLE: [f64; 58] = [
    10.47047130, 14.82817437, 18.18626357, 21.02939493, 23.54504487, 25.82924707,
    27.93898710, 29.91135686, 31.77209708, 33.53993436, 35.22899598, 36.85025108,
    38.41241892, 39.92256684, 41.38651832, 42.80914012, 44.19454951, 45.54626723,
    46.86733252, 48.16039128, 49.42776439, 50.67150166, 51.89342469, 53.09516153,
    54.27817472, 55.44378444, 56.59318756, 57.72747354, 58.84763776, 59.95459277,
    61.04917774, 62.13216659, 63.20427479, 64.26616523, 65.31845310, 66.36171008,
    67.39646774, 68.42322022, 69.44242631, 70.45451075, 71.45986473, 72.45884545,
    73.45177442, 74.43893416, 75.42056257, 76.39684391, 77.36789461, 78.33374083,
    79.29428225, 80.24923213, 81.19801349, 82.13956981, 83.07199445, 83.99173563,
    84.89166191, 85.75541621, 86.53536998, 87.00000000,
];

/// Number of longitude zones at a given latitude (NL function).
///
/// Ranges from 59 at the equator to 1 at and beyond 87°. Symmetric about 0.
pub fn nl(lat: f64) -> u32 {
    let lat = lat.abs();
    match NL_TABLE.iter().position(|&bound| lat < bound) {
        Some(i) => 59 - i as u32,
        None => 1,
    }
}

/// Modulo that always returns a non-negative result.
fn modulo(a: i64, b: i64) -> i64 {
    a.rem_euclid(b)
}

/// Longitude zone count for a latitude and frame parity, never below 1.
fn n_lon(lat: f64, odd: bool) -> i64 {
    (nl(lat) as i64 - odd as i64).max(1)
}

/// Global CPR decode from an even/odd fragment pair.
///
/// `even_is_newer` picks which frame's latitude (and longitude offset) the
/// result is expressed in. Returns `(latitude, longitude)` in degrees, or
/// `None` when the two candidate latitudes fall in different NL zones.
///
/// The longitude zone index always uses the NL of the selected latitude for
/// both raw longitude terms, as dump1090 does.
pub fn decode(
    even_lat: u32,
    even_lng: u32,
    odd_lat: u32,
    odd_lng: u32,
    even_is_newer: bool,
) -> Option<(f64, f64)> {
    let lat0 = even_lat as f64;
    let lat1 = odd_lat as f64;
    let lng0 = even_lng as f64;
    let lng1 = odd_lng as f64;

    // Latitude zone index
    let j = (((59.0 * lat0 - 60.0 * lat1) / CPR_MAX) + 0.5).floor() as i64;

    let mut rlat0 = DLAT_EVEN * (modulo(j, 60) as f64 + lat0 / CPR_MAX);
    let mut rlat1 = DLAT_ODD * (modulo(j, 59) as f64 + lat1 / CPR_MAX);

    if rlat0 >= 270.0 {
        rlat0 -= 360.0;
    }
    if rlat1 >= 270.0 {
        rlat1 -= 360.0;
    }

    if nl(rlat0) != nl(rlat1) {
        return None;
    }

    let (lat, lng_selected, odd) = if even_is_newer {
        (rlat0, lng0, false)
    } else {
        (rlat1, lng1, true)
    };

    let nl_val = nl(lat) as f64;
    let ni = n_lon(lat, odd);
    let m = ((((lng0 * (nl_val - 1.0)) - (lng1 * nl_val)) / CPR_MAX) + 0.5).floor() as i64;
    let mut lng = (360.0 / ni as f64) * (modulo(m, ni) as f64 + lng_selected / CPR_MAX);

    if lng > 180.0 {
        lng -= 360.0;
    }

    Some((lat, lng))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
