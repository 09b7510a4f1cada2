//! Turns zero-crossing timestamps into a sequence of raw pulses.

/// One audio cycle, not yet categorized: the interval between two
/// consecutive zero-crossings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPulse {
    pub start: f64,
    pub length_sec: f64,
}

/// Given ordered crossing times `t0, t1, ...`, emit pulses
/// `{start: t[i-1], length_sec: t[i] - t[i-1]}` for `i >= 1`.
#[must_use]
pub fn extract(crossings: &[f64]) -> Vec<RawPulse> {
    crossings
        .windows(2)
        .map(|pair| RawPulse {
            start: pair[0],
            length_sec: pair[1] - pair[0],
        })
        .collect()
}
