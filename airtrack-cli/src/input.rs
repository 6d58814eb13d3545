//! Capture file reading: one frame per line, `HEX` or `HEX;TIMESTAMP_MS`.

use std::io::{self, BufRead};
use std::path::Path;

/// A frame line split into hex and optional reception time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLine<'a> {
    pub hex: &'a str,
    pub timestamp: Option<u64>,
}

/// Split a capture line. Blank lines and `#` comments yield `None`.
///
/// A timestamp that doesn't parse is dropped, so the frame falls back to
/// the wall clock.
pub fn parse_line(line: &str) -> Option<FrameLine<'_>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    match line.split_once(';') {
        Some((hex, ts)) => Some(FrameLine {
            hex: hex.trim(),
            timestamp: ts.trim().parse().ok(),
        }),
        None => Some(FrameLine {
            hex: line,
            timestamp: None,
        }),
    }
}

/// Open a capture file, or stdin for `-`.
pub fn open(path: &Path) -> io::Result<Box<dyn BufRead>> {
    if path.to_str() == Some("-") {
        Ok(Box::new(io::stdin().lock()))
    } else {
        let f = std::fs::File::open(path)?;
        Ok(Box::new(io::BufReader::new(f)))
    }
}
