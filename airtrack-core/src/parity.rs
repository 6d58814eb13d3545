//! Mode S address/parity field.
//!
//! ICAO standard polynomial: x^24 + x^23 + x^22 + ... + x^10 + x^3 + 1
//! Generator: 0xFFF409
//!
//! Short replies (DF0/4/5/16/20/21) overlay the CRC-24 with the aircraft
//! address, so the residual of a clean frame *is* the address. No integrity
//! check is made here: a corrupted reply just yields some other address.

use crate::types::Icao;

const GENERATOR: u32 = 0xFFF409;

const fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 16;
        let mut bit = 0;
        while bit < 8 {
            if crc & 0x800000 != 0 {
                crc = (crc << 1) ^ GENERATOR;
            } else {
                crc <<= 1;
            }
            crc &= 0xFFFFFF;
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

static CRC_TABLE: [u32; 256] = build_crc_table();

/// CRC-24 residual: polynomial division of all but the last 3 bytes, XOR'd
/// with the last 3 bytes (AP/PI field).
///
/// Zero for an intact DF17/18; the ICAO address for short replies.
pub fn residual(data: &[u8]) -> u32 {
    if data.len() <= 3 {
        return data.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32) & 0xFFFFFF;
    }

    let payload_len = data.len() - 3;
    let mut crc = 0u32;
    for &byte in &data[..payload_len] {
        crc = ((crc << 8) ^ CRC_TABLE[((crc >> 16) ^ byte as u32) as usize & 0xFF]) & 0xFFFFFF;
    }

    crc ^ ((data[payload_len] as u32) << 16
        | (data[payload_len + 1] as u32) << 8
        | data[payload_len + 2] as u32)
}

/// Recover the aircraft address from a reply whose AP field carries it.
pub fn recover_address(data: &[u8]) -> Icao {
    residual(data)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
