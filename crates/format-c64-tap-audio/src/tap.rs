//! Commodore TAP container: encodes the pulse stream of the
//! best-scoring pass, and decodes a TAP byte stream back into a pulse
//! length list so it can be re-run through the rest of the pipeline.
//!
//! This system only ever *writes* TAP v0, with pulse bytes encoding
//! `length_cycles` directly (one byte per pulse, 1:1, matching the
//! bit-exact format this system defines). Real-world TAP v0 files
//! produced by other tools instead scale each byte by 8 (one byte per
//! 8 CPU cycles); the reader therefore only decodes v0 byte-for-cycle
//! when reading back a file this system itself wrote, and understands
//! the real TAP v1 sentinel-plus-24-bit-count encoding for
//! interoperability with files from other tools.

use crate::clock::Pulse;
use crate::pulse::RawPulse;

pub const TAP_SIGNATURE: &[u8; 12] = b"C64-TAPE-RAW";

/// Error reading a TAP byte stream that isn't well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapError {
    BadSignature,
    Truncated,
    UnsupportedVersion(u8),
}

impl std::fmt::Display for TapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadSignature => write!(f, "missing C64-TAPE-RAW signature"),
            Self::Truncated => write!(f, "TAP data shorter than its declared length"),
            Self::UnsupportedVersion(v) => write!(f, "unsupported TAP version {v}"),
        }
    }
}

impl std::error::Error for TapError {}

/// Encode a pulse stream as a TAP v0 file.
///
/// `tape_play_speed` is 1.0 unless speed correction is requested, in
/// which case it's the mean of `default_sm / mean_sm_per_pass` across
/// passes. Pulse lengths that don't fit in one byte once scaled are
/// encoded as `0`, matching this system's "unrepresentable" marker.
#[must_use]
pub fn write(pulses: &[Pulse], tape_play_speed: f64) -> Vec<u8> {
    let clock = crate::TAPE_CLOCK_PERIOD_SEC / tape_play_speed;

    let body: Vec<u8> = pulses
        .iter()
        .map(|pulse| {
            let scaled = (pulse.length_sec / clock).trunc();
            if scaled >= 1.0 && scaled <= 255.0 {
                scaled as u8
            } else {
                0
            }
        })
        .collect();

    let mut out = Vec::with_capacity(20 + body.len());
    out.extend_from_slice(TAP_SIGNATURE);
    out.push(0); // version
    out.extend_from_slice(&[0, 0, 0]); // reserved
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

/// Decode a TAP byte stream back into a pulse length list, with
/// cumulative start times reconstructed from the clock period.
///
/// # Errors
/// Returns [`TapError`] if the signature is missing, the declared pulse
/// count doesn't fit in the data, or the version byte is unrecognized.
pub fn read(data: &[u8], tape_play_speed: f64) -> Result<Vec<RawPulse>, TapError> {
    if data.len() < 20 || &data[0..12] != TAP_SIGNATURE {
        return Err(TapError::BadSignature);
    }

    let version = data[12];
    let declared_len = u32::from_le_bytes([data[16], data[17], data[18], data[19]]) as usize;
    let body = &data[20..];
    if body.len() < declared_len {
        return Err(TapError::Truncated);
    }
    let body = &body[..declared_len];

    let clock = crate::TAPE_CLOCK_PERIOD_SEC / tape_play_speed;
    let mut lengths_sec = Vec::new();

    match version {
        0 => {
            for &byte in body {
                let cycles = if byte == 0 { 256.0 } else { f64::from(byte) };
                lengths_sec.push(cycles * clock);
            }
        }
        1 => {
            let mut index = 0;
            while index < body.len() {
                let byte = body[index];
                if byte == 0 {
                    if index + 3 >= body.len() {
                        return Err(TapError::Truncated);
                    }
                    let cycles = u32::from_le_bytes([body[index + 1], body[index + 2], body[index + 3], 0]);
                    lengths_sec.push(f64::from(cycles) * clock);
                    index += 4;
                } else {
                    lengths_sec.push(f64::from(byte) * 8.0 * clock);
                    index += 1;
                }
            }
        }
        other => return Err(TapError::UnsupportedVersion(other)),
    }

    let mut start = 0.0;
    let pulses = lengths_sec
        .into_iter()
        .map(|length_sec| {
            let pulse = RawPulse { start, length_sec };
            start += length_sec;
            pulse
        })
        .collect();

    Ok(pulses)
}
