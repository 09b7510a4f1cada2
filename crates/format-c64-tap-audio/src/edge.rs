//! Downward zero-crossing detector, gated by an amplitude hysteresis.

use crate::signal::Channel;

/// Default fraction of peak amplitude a sample must exceed, since the
/// last emitted crossing, before the next crossing is counted.
pub const DEFAULT_MIN_AMP_FRAC: f64 = 0.15;

/// Detect downward zero-crossing times (seconds from stream start).
///
/// A crossing at sample `i` is emitted when sample `i-1 >= 0` and sample
/// `i < 0`, provided at least one sample since the previous emitted
/// crossing exceeded `min_amp_frac * peak_amplitude`. This suppresses
/// spurious crossings in silent or low-level regions. Setting `invert`
/// multiplies every sample by -1 before detection, equivalent to
/// detecting upward crossings of the original signal.
#[must_use]
pub fn zero_crossings(channel: &Channel, peak_amplitude: f64, min_amp_frac: f64, invert: bool) -> Vec<f64> {
    let threshold = min_amp_frac * peak_amplitude;
    let mut times = Vec::new();
    let mut seen_adequate_amplitude = false;
    let mut was_above_zero = false;

    for (index, &raw) in channel.samples.iter().enumerate() {
        let value = if invert { -raw } else { raw };

        if value > threshold {
            seen_adequate_amplitude = true;
        }

        if value < 0.0 && was_above_zero && seen_adequate_amplitude {
            times.push(index as f64 / f64::from(channel.sample_rate));
            seen_adequate_amplitude = false;
        }

        was_above_zero = value >= 0.0;
    }

    times
}
