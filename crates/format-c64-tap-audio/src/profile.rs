//! Machine-specific S/M/L/too-long pulse-length breakpoints.
//!
//! These are the defaults each machine family's KERNAL tape routine
//! assumes, measured in clock cycles (one cycle = 1/8th of the CPU
//! clock, see [`crate::TAPE_CLOCK_PERIOD_SEC`]). The clock-and-categorizer
//! layer only ever *starts* from these: per-segment histogram analysis
//! may move `sm`/`ml` to better fit a warped or fast/slow tape, but
//! `s_min` and `l_max` never change.

use std::fmt;
use std::str::FromStr;

/// Commodore machine family, selects the default pulse breakpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Machine {
    C64,
    C128,
    C16,
    Plus4,
}

impl FromStr for Machine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "c64" => Ok(Self::C64),
            "c128" => Ok(Self::C128),
            "c16" => Ok(Self::C16),
            "plus4" => Ok(Self::Plus4),
            other => Err(format!("unknown machine '{other}' (expected c64, c128, c16, plus4)")),
        }
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::C64 => "c64",
            Self::C128 => "c128",
            Self::C16 => "c16",
            Self::Plus4 => "plus4",
        };
        f.write_str(name)
    }
}

/// Default S/M/L/too-long breakpoints for a machine family, in clock
/// cycles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineProfile {
    pub s_min: f64,
    pub sm: f64,
    pub ml: f64,
    pub l_max: f64,
}

impl MachineProfile {
    #[must_use]
    pub fn for_machine(machine: Machine) -> Self {
        match machine {
            Machine::C64 | Machine::C128 => Self {
                s_min: 16.0,
                sm: 55.0,
                ml: 74.0,
                l_max: 240.0,
            },
            Machine::C16 | Machine::Plus4 => Self {
                s_min: 16.0,
                sm: 100.0,
                ml: 180.0,
                l_max: 300.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c64_and_c128_share_a_profile() {
        assert_eq!(
            MachineProfile::for_machine(Machine::C64),
            MachineProfile::for_machine(Machine::C128)
        );
    }

    #[test]
    fn c16_and_plus4_share_a_profile() {
        assert_eq!(
            MachineProfile::for_machine(Machine::C16),
            MachineProfile::for_machine(Machine::Plus4)
        );
    }

    #[test]
    fn families_differ() {
        assert_ne!(
            MachineProfile::for_machine(Machine::C64),
            MachineProfile::for_machine(Machine::C16)
        );
    }

    #[test]
    fn parses_known_names() {
        assert_eq!("c64".parse(), Ok(Machine::C64));
        assert_eq!("plus4".parse(), Ok(Machine::Plus4));
        assert!("amiga".parse::<Machine>().is_err());
    }
}
