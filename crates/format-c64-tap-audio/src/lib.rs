//! Adaptive pulse-to-block decode pipeline for Commodore datasette WAV
//! recordings (C64/C128/C16/Plus4), plus a TAP v0 writer/reader.
//!
//! This crate never touches the filesystem: it consumes raw per-channel
//! sample buffers and produces recovered blocks, pulse lists, and TAP
//! bytes entirely in memory. The pipeline itself never returns
//! `Result` — every layer always produces output, possibly flagged as
//! incomplete or corrupt, never a fatal error. I/O and orchestration
//! live in the `c64-tape-recover` binary crate.

pub mod block;
pub mod clock;
pub mod display_code;
pub mod edge;
pub mod framer;
pub mod profile;
pub mod pulse;
pub mod reconcile;
pub mod signal;
pub mod tap;

pub use block::{Block, BlockKind};
pub use clock::{Pulse, PulseClass};
pub use framer::Byte;
pub use profile::{Machine, MachineProfile};
pub use reconcile::{MergedBlock, PassId, PassResult, ReconcileOutput};
pub use signal::Channel;

/// One CPU clock cycle at the C64/C128/C16/Plus4 datasette clock: 1/8th
/// of the ~1 MHz CPU clock.
pub const TAPE_CLOCK_PERIOD_SEC: f64 = 1.0 / 123_156.0;

/// Default minimum-amplitude fraction used to gate the edge detector.
pub const DEFAULT_MIN_AMP_FRAC: f64 = edge::DEFAULT_MIN_AMP_FRAC;

/// Run one full (channel, polarity) pass: edge detection, pulse
/// extraction, clock categorization, bit/byte framing, and block
/// assembly.
#[must_use]
pub fn run_pass(
    id: PassId,
    channel: &Channel,
    peak_amplitude: f64,
    invert: bool,
    profile: MachineProfile,
    min_amp_frac: f64,
    debug: bool,
) -> PassResult {
    let crossings = edge::zero_crossings(channel, peak_amplitude, min_amp_frac, invert);
    let raw_pulses = pulse::extract(&crossings);
    let pulses = clock::categorize_pulses(&raw_pulses, profile, debug);
    let bytes = framer::frame(&pulses, debug);
    let blocks = block::assemble(&bytes);

    let tape_speed_estimate = if bytes.is_empty() {
        1.0
    } else {
        let mean_sm: f64 = bytes.iter().map(|b| b.sm_threshold).sum::<f64>() / bytes.len() as f64;
        if mean_sm > 0.0 {
            profile.sm / mean_sm
        } else {
            1.0
        }
    };

    PassResult {
        id,
        blocks,
        pulses,
        tape_speed_estimate,
    }
}
