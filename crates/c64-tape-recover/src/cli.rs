//! Hand-rolled `std::env::args()` flag parser. The corpus never pulls
//! in `clap` or similar; runners parse argument strings directly.

use std::path::PathBuf;

use format_c64_tap_audio::Machine;

pub const USAGE: &str = "\
c64-tape-recover --input TAPE.wav [options]

Options:
  --input PATH                      Input WAV file (required)
  --output DIR                      Output directory for extracted files [default: ./out]
  --tap PATH                        Write a TAP v0 file here
  --machine {c64,c128,c16,plus4}    Default S/M/L breakpoints [default: c64]
  --fix-play-speed                  Apply speed correction to TAP output
  --no-fix-play-speed               Disable speed correction (default)
  --debug                           Verbose diagnostics to stderr
  --help                            Print this message and exit
";

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub input: PathBuf,
    pub output: PathBuf,
    pub tap: Option<PathBuf>,
    pub machine: Machine,
    pub fix_play_speed: bool,
    pub debug: bool,
}

pub enum Action {
    Run(Options),
    Help,
}

/// Parse CLI arguments (excluding the program name).
///
/// # Errors
/// Returns a human-readable message on a missing required flag, an
/// unrecognized flag, or a bad `--machine` value.
pub fn parse(args: &[String]) -> Result<Action, String> {
    let mut input: Option<PathBuf> = None;
    let mut output = PathBuf::from("./out");
    let mut tap: Option<PathBuf> = None;
    let mut machine = Machine::C64;
    let mut fix_play_speed = false;
    let mut debug = false;

    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--help" => return Ok(Action::Help),
            "--input" => {
                input = Some(PathBuf::from(next_value(args, &mut index, "--input")?));
            }
            "--output" => {
                output = PathBuf::from(next_value(args, &mut index, "--output")?);
            }
            "--tap" => {
                tap = Some(PathBuf::from(next_value(args, &mut index, "--tap")?));
            }
            "--machine" => {
                let value = next_value(args, &mut index, "--machine")?;
                machine = value.parse().map_err(|e: String| e)?;
            }
            "--fix-play-speed" => fix_play_speed = true,
            "--no-fix-play-speed" => fix_play_speed = false,
            "--debug" => debug = true,
            other => return Err(format!("unrecognized argument '{other}'")),
        }
        index += 1;
    }

    let input = input.ok_or_else(|| "missing required --input PATH".to_string())?;

    Ok(Action::Run(Options {
        input,
        output,
        tap,
        machine,
        fix_play_speed,
        debug,
    }))
}

fn next_value(args: &[String], index: &mut usize, flag: &str) -> Result<String, String> {
    *index += 1;
    args.get(*index).cloned().ok_or_else(|| format!("{flag} requires a value"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn requires_input() {
        let err = parse(&args(&[])).unwrap_err();
        assert!(err.contains("--input"));
    }

    #[test]
    fn applies_defaults() {
        let Action::Run(opts) = parse(&args(&["--input", "tape.wav"])).unwrap() else {
            panic!("expected Run");
        };
        assert_eq!(opts.output, PathBuf::from("./out"));
        assert_eq!(opts.machine, Machine::C64);
        assert!(!opts.fix_play_speed);
        assert!(!opts.debug);
        assert!(opts.tap.is_none());
    }

    #[test]
    fn parses_all_flags() {
        let Action::Run(opts) = parse(&args(&[
            "--input",
            "tape.wav",
            "--output",
            "out2",
            "--tap",
            "tape.tap",
            "--machine",
            "plus4",
            "--fix-play-speed",
            "--debug",
        ]))
        .unwrap() else {
            panic!("expected Run");
        };
        assert_eq!(opts.output, PathBuf::from("out2"));
        assert_eq!(opts.tap, Some(PathBuf::from("tape.tap")));
        assert_eq!(opts.machine, Machine::Plus4);
        assert!(opts.fix_play_speed);
        assert!(opts.debug);
    }

    #[test]
    fn help_short_circuits() {
        assert!(matches!(parse(&args(&["--help"])).unwrap(), Action::Help));
    }

    #[test]
    fn unknown_machine_is_rejected() {
        let err = parse(&args(&["--input", "t.wav", "--machine", "spectrum"])).unwrap_err();
        assert!(err.contains("spectrum"));
    }

    #[test]
    fn unrecognized_flag_is_rejected() {
        let err = parse(&args(&["--bogus"])).unwrap_err();
        assert!(err.contains("--bogus"));
    }
}
