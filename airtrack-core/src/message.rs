//! The structured message the tracker consumes.
//!
//! Produced by an external Mode S decoder (or by [`crate::decode`] for hex
//! captures). Fields are flat and default to zero/empty; which ones carry
//! meaning depends on `msgtype`/`metype`/`mesub`.

use serde::{Deserialize, Serialize};

use crate::types::{AltitudeUnit, Icao};

// Downlink formats the tracker dispatches on.
pub const DF_SHORT_AIR_AIR: u8 = 0;
pub const DF_ALTITUDE_REPLY: u8 = 4;
pub const DF_EXTENDED_SQUITTER: u8 = 17;
pub const DF_COMM_B_ALTITUDE: u8 = 20;

/// A decoded surveillance message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub icao: Icao,
    /// Downlink format.
    pub msgtype: u8,
    /// ADS-B type code (extended squitter only).
    pub metype: u8,
    /// ADS-B subtype (extended squitter only).
    pub mesub: u8,
    pub altitude: i32,
    pub unit: AltitudeUnit,
    pub callsign: String,
    pub raw_latitude: u32,
    pub raw_longitude: u32,
    /// CPR format flag: true for an odd frame.
    pub fflag: bool,
    /// Ground speed in knots.
    pub speed: f64,
    /// Track angle in degrees.
    pub heading: f64,
}

impl Message {
    pub fn is_extended_squitter(&self) -> bool {
        self.msgtype == DF_EXTENDED_SQUITTER
    }

    /// Short replies that carry a barometric altitude code.
    pub fn is_altitude_reply(&self) -> bool {
        matches!(
            self.msgtype,
            DF_SHORT_AIR_AIR | DF_ALTITUDE_REPLY | DF_COMM_B_ALTITUDE
        )
    }

    /// TC 1-4: aircraft identification.
    pub fn is_identification(&self) -> bool {
        self.is_extended_squitter() && (1..=4).contains(&self.metype)
    }

    /// TC 9-18: airborne position with barometric altitude.
    pub fn is_airborne_position(&self) -> bool {
        self.is_extended_squitter() && (9..=18).contains(&self.metype)
    }

    /// TC 19 subtypes 1-2: airborne velocity over ground.
    pub fn is_ground_velocity(&self) -> bool {
        self.is_extended_squitter() && self.metype == 19 && matches!(self.mesub, 1 | 2)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn squitter(metype: u8, mesub: u8) -> Message {
        Message {
            msgtype: DF_EXTENDED_SQUITTER,
            metype,
            mesub,
            ..Default::default()
        }
    }

    #[test]
    fn test_classification() {
        assert!(squitter(4, 0).is_identification());
        assert!(!squitter(5, 0).is_identification());
        assert!(squitter(9, 0).is_airborne_position());
        assert!(squitter(18, 0).is_airborne_position());
        assert!(!squitter(20, 0).is_airborne_position());
        assert!(squitter(19, 1).is_ground_velocity());
        assert!(squitter(19, 2).is_ground_velocity());
        assert!(!squitter(19, 3).is_ground_velocity());
    }

    #[test]
    fn test_altitude_reply_formats() {
        for df in [0, 4, 20] {
            let msg = Message {
                msgtype: df,
                ..Default::default()
            };
            assert!(msg.is_altitude_reply(), "DF{df} carries altitude");
        }
        let msg = Message {
            msgtype: 5,
            ..Default::default()
        };
        assert!(!msg.is_altitude_reply());
    }

    #[test]
    fn test_type_code_ignored_outside_squitter() {
        let msg = Message {
            msgtype: 4,
            metype: 11,
            ..Default::default()
        };
        assert!(!msg.is_airborne_position());
    }

    #[test]
    fn test_deserialize_missing_fields_default() {
        let msg: Message = toml::from_str(
            r#"icao = 7867807
msgtype = 17
metype = 11
fflag = true
raw_latitude = 17090
raw_longitude = 23133
unit = "gnss""#,
        )
        .expect("valid message");
        assert_eq!(msg.icao, 7867807);
        assert!(msg.fflag);
        assert_eq!(msg.unit, AltitudeUnit::Gnss);
        assert_eq!(msg.callsign, "");
        assert_eq!(msg.altitude, 0);
    }
}
