//! Header-tone detection, per-segment threshold search, and pulse
//! classification.
//!
//! Commodore KERNAL tapes prefix each block with a long header tone:
//! many thousands of identical short pulses. This module locates those
//! tones and uses them as calibration landmarks to re-derive the S/M/L
//! breakpoints for the segment that follows, absorbing playback-speed
//! drift without ever touching the reference clock itself.

use crate::profile::MachineProfile;
use crate::pulse::RawPulse;

/// Every 100 pulses, inspect the next 500 pulses for a header tone.
const HEADER_CHECK_STRIDE: usize = 100;
const HEADER_CHECK_WINDOW: usize = 500;
/// A window is a header tone if its stddev is under this fraction of its mean.
const HEADER_STD_FRACTION: f64 = 0.025;
/// Minimum tape time between two header-tone detections.
const HEADER_MIN_GAP_SEC: f64 = 30.0;

const HISTOGRAM_BINS_PER_CYCLE: f64 = 2.0;
const HISTOGRAM_RANGE_CYCLES: f64 = 720.0;
/// A histogram bin is "empty" below this normalized weight.
const HISTOGRAM_EMPTY_WEIGHT: f64 = 0.004;
/// Segments with fewer pulses than this keep the machine defaults.
const MIN_SEGMENT_PULSES: usize = 1000;

/// Pulse length class. Ranges are contiguous and exhaustive given a
/// finite `length_cycles`, so [`PulseClass::Unknown`] is never produced
/// by [`classify_pulses`]; it exists as the catch-all the data model
/// reserves for anything that doesn't fit the other five.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseClass {
    TooShort,
    Short,
    Medium,
    Long,
    TooLong,
    Unknown,
}

/// A categorized pulse, ready for the bit/byte framer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub start: f64,
    pub length_sec: f64,
    pub length_cycles: f64,
    pub header_break: bool,
    pub class: PulseClass,
    pub sm_threshold: f64,
}

#[derive(Debug, Clone, Copy)]
struct Thresholds {
    s_min: f64,
    sm: f64,
    ml: f64,
    l_max: f64,
}

impl From<MachineProfile> for Thresholds {
    fn from(profile: MachineProfile) -> Self {
        Self {
            s_min: profile.s_min,
            sm: profile.sm,
            ml: profile.ml,
            l_max: profile.l_max,
        }
    }
}

struct Gap {
    center_cycles: f64,
    weight: f64,
}

/// Classify every pulse in `raw` against `profile`'s breakpoints,
/// re-deriving SM/ML thresholds after each detected header tone.
///
/// When `debug` is set, header-tone detections and threshold updates
/// are reported to stderr.
#[must_use]
pub fn categorize_pulses(raw: &[RawPulse], profile: MachineProfile, debug: bool) -> Vec<Pulse> {
    let header_breaks = detect_header_breaks(raw);
    let defaults: Thresholds = profile.into();

    let mut pulses = Vec::with_capacity(raw.len());
    let mut thresholds = analyse_segment(raw, &header_breaks, 0, defaults, debug);

    for (index, item) in raw.iter().enumerate() {
        if index > 0 && header_breaks[index] {
            thresholds = analyse_segment(raw, &header_breaks, index, defaults, debug);
        }

        let length_cycles = item.length_sec / crate::TAPE_CLOCK_PERIOD_SEC;
        let class = classify(length_cycles, &thresholds);

        pulses.push(Pulse {
            start: item.start,
            length_sec: item.length_sec,
            length_cycles,
            header_break: header_breaks[index],
            class,
            sm_threshold: thresholds.sm,
        });
    }

    pulses
}

fn classify(length_cycles: f64, thresholds: &Thresholds) -> PulseClass {
    if length_cycles < thresholds.s_min {
        PulseClass::TooShort
    } else if length_cycles < thresholds.sm {
        PulseClass::Short
    } else if length_cycles < thresholds.ml {
        PulseClass::Medium
    } else if length_cycles < thresholds.l_max {
        PulseClass::Long
    } else {
        PulseClass::TooLong
    }
}

fn detect_header_breaks(raw: &[RawPulse]) -> Vec<bool> {
    let mut breaks = vec![false; raw.len()];
    let mut last_header_tone_time: Option<f64> = None;

    let mut index = 0;
    while index < raw.len() {
        if index % HEADER_CHECK_STRIDE == 0 {
            let end = (index + HEADER_CHECK_WINDOW).min(raw.len());
            let window = &raw[index..end];
            if let Some((mean, std_dev)) = mean_and_std(window) {
                if mean > 0.0 && std_dev < mean * HEADER_STD_FRACTION {
                    let time = raw[index].start;
                    let should_mark = match last_header_tone_time {
                        None => true,
                        Some(last) => time - last > HEADER_MIN_GAP_SEC,
                    };
                    if should_mark {
                        breaks[index] = true;
                        last_header_tone_time = Some(time);
                    }
                }
            }
        }
        index += 1;
    }

    breaks
}

fn mean_and_std(window: &[RawPulse]) -> Option<(f64, f64)> {
    if window.is_empty() {
        return None;
    }
    let count = window.len() as f64;
    let mean = window.iter().map(|p| p.length_sec).sum::<f64>() / count;
    let variance = window.iter().map(|p| (p.length_sec - mean).powi(2)).sum::<f64>() / count;
    Some((mean, variance.sqrt()))
}

/// Re-derive SM/ML thresholds for the segment starting at `start_index`
/// and running to the next header break (or end of stream).
fn analyse_segment(
    raw: &[RawPulse],
    header_breaks: &[bool],
    start_index: usize,
    defaults: Thresholds,
    debug: bool,
) -> Thresholds {
    let mut end_index = start_index + 1;
    while end_index < raw.len() && !header_breaks[end_index] {
        end_index += 1;
    }

    let sample_count = end_index - start_index;
    if sample_count <= MIN_SEGMENT_PULSES {
        return defaults;
    }

    let bin_count = (HISTOGRAM_RANGE_CYCLES * HISTOGRAM_BINS_PER_CYCLE) as usize;
    let mut histogram = vec![0.0_f64; bin_count];
    for item in &raw[start_index..end_index] {
        let length_cycles = item.length_sec / crate::TAPE_CLOCK_PERIOD_SEC;
        let bin = (length_cycles * HISTOGRAM_BINS_PER_CYCLE) as i64;
        if bin > 0 && (bin as usize) < bin_count {
            histogram[bin as usize] += 1.0;
        }
    }
    for weight in &mut histogram {
        *weight /= sample_count as f64;
    }

    let mut gaps = find_gaps(&histogram, defaults.s_min as usize);

    let mut thresholds = defaults;
    if let Some(sm_index) = best_gap_index(&gaps, defaults.sm) {
        let sm_gap = gaps.remove(sm_index);
        thresholds.sm = sm_gap.center_cycles;

        if let Some(ml_index) = best_gap_index(&gaps, defaults.ml) {
            thresholds.ml = gaps[ml_index].center_cycles;
        }
    }

    if debug {
        eprintln!(
            "[{:.5}] threshold search over {sample_count} pulses: sm={:.1} ml={:.1}",
            raw[start_index].start, thresholds.sm, thresholds.ml
        );
    }

    thresholds
}

fn find_gaps(histogram: &[f64], start_bin: usize) -> Vec<Gap> {
    let mut gaps = Vec::new();
    let mut index = start_bin;
    while index < histogram.len() {
        if histogram[index] < HISTOGRAM_EMPTY_WEIGHT {
            let gap_start = index;
            while index < histogram.len() && histogram[index] < HISTOGRAM_EMPTY_WEIGHT {
                index += 1;
            }
            let gap_end = index;
            if gap_end < histogram.len() {
                let length_bins = gap_end - gap_start;
                gaps.push(Gap {
                    center_cycles: (gap_start + gap_end) as f64 / 2.0 / HISTOGRAM_BINS_PER_CYCLE,
                    weight: length_bins as f64,
                });
            }
        }
        index += 1;
    }
    gaps
}

fn best_gap_index(gaps: &[Gap], target: f64) -> Option<usize> {
    gaps.iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let score_a = (a.center_cycles - target).abs() / (2.0 + a.weight);
            let score_b = (b.center_cycles - target).abs() / (2.0 + b.weight);
            score_a.partial_cmp(&score_b).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Machine;

    fn raw(lengths_sec: &[f64]) -> Vec<RawPulse> {
        let mut start = 0.0;
        lengths_sec
            .iter()
            .map(|&length_sec| {
                let pulse = RawPulse { start, length_sec };
                start += length_sec;
                pulse
            })
            .collect()
    }

    #[test]
    fn short_segment_uses_machine_defaults() {
        let profile = MachineProfile::for_machine(Machine::C64);
        let pulses = raw(&[10.0 * crate::TAPE_CLOCK_PERIOD_SEC; 5]);
        let categorized = categorize_pulses(&pulses, profile, false);
        assert!(categorized.iter().all(|p| (p.sm_threshold - profile.sm).abs() < 1e-9));
    }

    #[test]
    fn classification_respects_boundaries() {
        let profile = MachineProfile::for_machine(Machine::C64);
        let thresholds: Thresholds = profile.into();
        assert_eq!(classify(5.0, &thresholds), PulseClass::TooShort);
        assert_eq!(classify(30.0, &thresholds), PulseClass::Short);
        assert_eq!(classify(60.0, &thresholds), PulseClass::Medium);
        assert_eq!(classify(100.0, &thresholds), PulseClass::Long);
        assert_eq!(classify(300.0, &thresholds), PulseClass::TooLong);
    }

    #[test]
    fn header_tone_is_detected_from_uniform_short_pulses() {
        let short = 30.0 * crate::TAPE_CLOCK_PERIOD_SEC;
        let pulses = raw(&vec![short; 600]);
        let breaks = detect_header_breaks(&pulses);
        assert!(breaks[0]);
    }

    #[test]
    fn no_second_break_within_thirty_seconds() {
        // 1200 identical short pulses span well under a second of tape
        // time, so only the first 30s-gated break should fire.
        let short = 30.0 * crate::TAPE_CLOCK_PERIOD_SEC;
        let pulses = raw(&vec![short; 1200]);
        let breaks = detect_header_breaks(&pulses);
        assert_eq!(breaks.iter().filter(|&&b| b).count(), 1);
    }

    #[test]
    fn noisy_pulse_lengths_never_trigger_header_break() {
        let pulses = raw(&[
            10.0 * crate::TAPE_CLOCK_PERIOD_SEC,
            90.0 * crate::TAPE_CLOCK_PERIOD_SEC,
            20.0 * crate::TAPE_CLOCK_PERIOD_SEC,
            200.0 * crate::TAPE_CLOCK_PERIOD_SEC,
            5.0 * crate::TAPE_CLOCK_PERIOD_SEC,
        ]);
        let breaks = detect_header_breaks(&pulses);
        assert!(breaks.iter().all(|&b| !b));
    }
}
