//! Per-aircraft state with CPR fragment pairing.
//!
//! Pure logic, no I/O. Each message overwrites the attributes it carries and
//! leaves the rest alone. Airborne position fragments land in one of two
//! fixed slots (even/odd); a global CPR decode runs whenever both slots were
//! filled within [`cpr::PAIR_WINDOW`] of each other.

use serde::Serialize;
use tracing::debug;

use crate::cpr;
use crate::message::Message;
use crate::types::{icao_to_string, AltitudeUnit, Icao};

/// One raw CPR fragment and when it was received (ms).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CprFragment {
    pub lat: u32,
    pub lng: u32,
    pub time: u64,
}

/// Mutable state for a single tracked aircraft.
///
/// `lat`/`lng` stay at 0/0 until the first successful decode; use
/// [`Aircraft::has_position`] to tell that apart from a real 0/0 fix.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Aircraft {
    pub icao: Icao,
    /// Reception time of the most recent message (ms).
    pub seen: u64,
    /// Total messages received.
    pub count: u64,

    pub altitude: i32,
    pub unit: AltitudeUnit,
    pub speed: f64,
    pub heading: f64,
    pub lat: f64,
    pub lng: f64,
    pub callsign: String,

    // CPR slots for global decode
    #[serde(skip)]
    even: CprFragment,
    #[serde(skip)]
    odd: CprFragment,
    #[serde(skip)]
    position_decodes: u64,
}

impl Aircraft {
    pub fn new() -> Self {
        Aircraft::default()
    }

    /// Fold one message into the record.
    pub fn update(&mut self, msg: &Message, reception_time: u64) {
        self.count += 1;
        self.seen = reception_time;
        self.icao = msg.icao;

        if msg.is_altitude_reply() {
            self.altitude = msg.altitude;
            self.unit = msg.unit;
        } else if msg.is_identification() {
            self.callsign = msg.callsign.clone();
        } else if msg.is_airborne_position() {
            self.altitude = msg.altitude;
            self.unit = msg.unit;

            let fragment = CprFragment {
                lat: msg.raw_latitude,
                lng: msg.raw_longitude,
                time: reception_time,
            };
            if msg.fflag {
                self.odd = fragment;
            } else {
                self.even = fragment;
            }

            if self.even.time.abs_diff(self.odd.time) <= cpr::PAIR_WINDOW {
                self.try_cpr_decode();
            }
        } else if msg.is_ground_velocity() {
            self.speed = msg.speed;
            self.heading = msg.heading;
        }
    }

    fn try_cpr_decode(&mut self) {
        let even_is_newer = self.even.time > self.odd.time;
        match cpr::decode(
            self.even.lat,
            self.even.lng,
            self.odd.lat,
            self.odd.lng,
            even_is_newer,
        ) {
            Some((lat, lng)) => {
                self.lat = lat;
                self.lng = lng;
                self.position_decodes += 1;
            }
            None => debug!(
                icao = %icao_to_string(self.icao),
                "CPR pair spans latitude zones, keeping last position"
            ),
        }
    }

    /// True once at least one CPR pair decoded successfully.
    pub fn has_position(&self) -> bool {
        self.position_decodes > 0
    }

    /// Latest even-framed fragment.
    pub fn even_fragment(&self) -> CprFragment {
        self.even
    }

    /// Latest odd-framed fragment.
    pub fn odd_fragment(&self) -> CprFragment {
        self.odd
    }

    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.seen)
    }

    /// Stale once `seen` falls strictly before `now - timeout`.
    pub fn is_stale(&self, now: u64, timeout: u64) -> bool {
        self.age(now) > timeout
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::DF_EXTENDED_SQUITTER;
    use approx::assert_abs_diff_eq;

    const ICAO: Icao = 0x780D9F;
    const T0: u64 = 4_815_162_342;

    fn position(odd: bool, lat: u32, lng: u32) -> Message {
        Message {
            icao: ICAO,
            msgtype: DF_EXTENDED_SQUITTER,
            metype: 11,
            altitude: 31000,
            raw_latitude: lat,
            raw_longitude: lng,
            fflag: odd,
            ..Default::default()
        }
    }

    fn even() -> Message {
        position(false, 37419, 28049)
    }

    fn odd() -> Message {
        position(true, 17090, 23133)
    }

    fn velocity(mesub: u8) -> Message {
        Message {
            icao: ICAO,
            msgtype: DF_EXTENDED_SQUITTER,
            metype: 19,
            mesub,
            speed: 506.66359648192605,
            heading: 65.76194226683805,
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let ac = Aircraft::new();
        assert_eq!(ac.count, 0);
        assert_eq!(ac.altitude, 0);
        assert_eq!(ac.unit, AltitudeUnit::Barometric);
        assert_eq!(ac.speed, 0.0);
        assert_eq!(ac.heading, 0.0);
        assert_eq!(ac.callsign, "");
        assert_eq!((ac.lat, ac.lng), (0.0, 0.0));
        assert!(!ac.has_position());
    }

    #[test]
    fn test_count_and_seen() {
        let mut ac = Aircraft::new();
        for i in 0..5 {
            ac.update(&velocity(1), T0 + i * 100);
        }
        assert_eq!(ac.count, 5);
        assert_eq!(ac.seen, T0 + 400);
        assert_eq!(ac.icao, ICAO);
    }

    #[test]
    fn test_unrecognized_message_only_counts() {
        let mut ac = Aircraft::new();
        let msg = Message {
            icao: ICAO,
            msgtype: 11,
            altitude: 5000,
            callsign: "IGNORED".into(),
            ..Default::default()
        };
        ac.update(&msg, T0);
        assert_eq!(ac.count, 1);
        assert_eq!(ac.seen, T0);
        assert_eq!(ac.altitude, 0);
        assert_eq!(ac.callsign, "");
    }

    #[test]
    fn test_altitude_reply() {
        let mut ac = Aircraft::new();
        let msg = Message {
            icao: ICAO,
            msgtype: 4,
            altitude: 12500,
            ..Default::default()
        };
        ac.update(&msg, T0);
        assert_eq!(ac.altitude, 12500);
        assert_eq!(ac.unit, AltitudeUnit::Barometric);
    }

    #[test]
    fn test_callsign_update() {
        let mut ac = Aircraft::new();
        let msg = Message {
            icao: ICAO,
            msgtype: DF_EXTENDED_SQUITTER,
            metype: 4,
            callsign: "SAS1234".into(),
            ..Default::default()
        };
        ac.update(&msg, T0);
        assert_eq!(ac.callsign, "SAS1234");
        assert_eq!(ac.altitude, 0);
    }

    #[test]
    fn test_altitude_unit_follows_latest_message() {
        let mut ac = Aircraft::new();
        ac.update(&velocity(1), T0);
        ac.update(
            &Message {
                icao: ICAO,
                msgtype: DF_EXTENDED_SQUITTER,
                metype: 1,
                callsign: "SAS1234".into(),
                ..Default::default()
            },
            T0 + 1,
        );

        let gnss = Message {
            unit: AltitudeUnit::Gnss,
            altitude: 30950,
            ..odd()
        };
        ac.update(&gnss, T0 + 2);
        assert_eq!(ac.unit, AltitudeUnit::Gnss);
        assert_eq!(ac.altitude, 30950);

        // Position messages leave the other reported fields alone
        assert_abs_diff_eq!(ac.speed, 506.66359648192605, epsilon = 1e-9);
        assert_abs_diff_eq!(ac.heading, 65.76194226683805, epsilon = 1e-9);
        assert_eq!(ac.callsign, "SAS1234");

        let reply = Message {
            icao: ICAO,
            msgtype: 20,
            altitude: 31000,
            unit: AltitudeUnit::Barometric,
            ..Default::default()
        };
        ac.update(&reply, T0 + 3);
        assert_eq!(ac.unit, AltitudeUnit::Barometric);
        assert_eq!(ac.altitude, 31000);
        assert_eq!(ac.callsign, "SAS1234");
        assert_eq!(ac.odd_fragment().time, T0 + 2);
    }

    #[test]
    fn test_velocity_subtypes() {
        let mut ac = Aircraft::new();
        ac.update(&velocity(3), T0);
        assert_eq!(ac.speed, 0.0);
        assert_eq!(ac.heading, 0.0);

        ac.update(&velocity(2), T0 + 1);
        assert_abs_diff_eq!(ac.speed, 506.6636, epsilon = 1e-4);
        assert_abs_diff_eq!(ac.heading, 65.7619, epsilon = 1e-4);
    }

    #[test]
    fn test_fragments_fill_slots() {
        let mut ac = Aircraft::new();
        ac.update(&odd(), T0);
        assert_eq!(
            ac.odd_fragment(),
            CprFragment {
                lat: 17090,
                lng: 23133,
                time: T0
            }
        );
        assert_eq!(ac.even_fragment(), CprFragment::default());
        assert_eq!(ac.altitude, 31000);
        assert!(!ac.has_position());
    }

    #[test]
    fn test_position_cpr_pairing() {
        let mut ac = Aircraft::new();
        ac.update(&odd(), T0);
        ac.update(&even(), T0 + 2);

        assert!(ac.has_position());
        assert_abs_diff_eq!(ac.lat, 55.71290588378906, epsilon = 1e-9);
        assert_abs_diff_eq!(ac.lng, 13.243602405894885, epsilon = 1e-9);
    }

    #[test]
    fn test_odd_newer_uses_odd_frame() {
        let mut ac = Aircraft::new();
        ac.update(&even(), T0);
        ac.update(&odd(), T0 + 2);
        assert_abs_diff_eq!(ac.lat, 55.710831981594275, epsilon = 1e-9);
        assert_abs_diff_eq!(ac.lng, 13.23552131652832, epsilon = 1e-9);
    }

    #[test]
    fn test_pair_window_inclusive() {
        let mut ac = Aircraft::new();
        ac.update(&odd(), T0);
        ac.update(&even(), T0 + cpr::PAIR_WINDOW);
        assert!(ac.has_position());
    }

    #[test]
    fn test_pair_window_exceeded() {
        let mut ac = Aircraft::new();
        ac.update(&odd(), T0);
        ac.update(&even(), T0 + cpr::PAIR_WINDOW + 1);
        assert!(!ac.has_position());
        assert_eq!((ac.lat, ac.lng), (0.0, 0.0));
    }

    #[test]
    fn test_failed_decode_keeps_position() {
        let mut ac = Aircraft::new();
        ac.update(&odd(), T0);
        ac.update(&even(), T0 + 1);
        let fix = (ac.lat, ac.lng);

        // Odd fragment that puts the candidates in different NL zones
        ac.update(&position(true, 61814, 23133), T0 + 2);
        assert_eq!((ac.lat, ac.lng), fix);
        assert_eq!(ac.odd_fragment().lat, 61814);
    }

    #[test]
    fn test_slots_survive_decode() {
        let mut ac = Aircraft::new();
        ac.update(&odd(), T0);
        ac.update(&even(), T0 + 1);
        // A fresh odd fragment re-pairs with the retained even one
        ac.update(&odd(), T0 + 3);
        assert_eq!(ac.even_fragment().time, T0 + 1);
        assert_abs_diff_eq!(ac.lat, 55.710831981594275, epsilon = 1e-9);
    }

    #[test]
    fn test_early_timestamps_pair_with_empty_slot() {
        // Slots start at time 0, so a fragment within the window of 0 is
        // decoded against the zeroed opposite slot.
        let mut ac = Aircraft::new();
        ac.update(&even(), 5_000);
        assert!(ac.has_position());
        assert!(ac.lat > 90.0);
    }

    #[test]
    fn test_stale() {
        let mut ac = Aircraft::new();
        ac.update(&velocity(1), 1_000);
        assert!(!ac.is_stale(1_050, 50));
        assert!(ac.is_stale(1_051, 50));
        assert!(!ac.is_stale(500, 50));
    }
}
