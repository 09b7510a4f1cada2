//! Recovers KERNAL-encoded files from a WAV recording of a Commodore
//! datasette tape.

mod cli;
mod error;
mod export;
mod wav;

use std::process;
use std::sync::Arc;

use format_c64_tap_audio::{reconcile, tap, MachineProfile, PassId};

use cli::{Action, Options};
use error::TapeRecoverError;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let options = match cli::parse(&args) {
        Ok(Action::Help) => {
            eprint!("{}", cli::USAGE);
            process::exit(0);
        }
        Ok(Action::Run(options)) => options,
        Err(message) => {
            eprintln!("{message}");
            eprint!("{}", cli::USAGE);
            process::exit(1);
        }
    };

    match run(&options) {
        Ok(()) => process::exit(0),
        Err(TapeRecoverError::Io(err)) => {
            eprintln!("output error: {err}");
            process::exit(2);
        }
        Err(err @ TapeRecoverError::Wav(_)) => {
            eprintln!("input error: {err}");
            process::exit(1);
        }
    }
}

fn run(options: &Options) -> Result<(), TapeRecoverError> {
    let channels = wav::load(&options.input)?;
    let profile = MachineProfile::for_machine(options.machine);

    let passes = run_passes(&channels, profile, options.debug);
    let reconciled = reconcile::reconcile(passes);

    if options.debug {
        eprintln!(
            "recovered {} block(s) across {} channel(s)",
            reconciled.blocks.len(),
            channels.len()
        );
    }

    if let Some(tap_path) = &options.tap {
        let tape_play_speed = if options.fix_play_speed { reconciled.tape_play_speed_mean } else { 1.0 };
        let bytes = tap::write(&reconciled.best_pass_pulses, tape_play_speed);
        std::fs::write(tap_path, bytes)?;
    }

    export::export(&options.output, &reconciled.blocks)?;

    Ok(())
}

/// Run every (channel, polarity) pass. Each pass only reads its shared
/// sample buffer, so all passes run concurrently on scoped threads;
/// the reconciler runs afterwards on the main thread.
fn run_passes(channels: &[format_c64_tap_audio::Channel], profile: MachineProfile, debug: bool) -> Vec<reconcile::PassResult> {
    let buffers: Vec<(u32, Arc<[f64]>, f64)> = channels
        .iter()
        .map(|channel| (channel.sample_rate, Arc::clone(&channel.samples), channel.peak_amplitude()))
        .collect();

    std::thread::scope(|scope| {
        let mut handles = Vec::new();
        let mut next_id = 0usize;

        for (sample_rate, samples, peak_amplitude) in &buffers {
            for invert in [false, true] {
                let id = PassId(next_id);
                next_id += 1;
                let samples = Arc::clone(samples);
                let sample_rate = *sample_rate;
                let peak_amplitude = *peak_amplitude;
                handles.push(scope.spawn(move || {
                    let channel = format_c64_tap_audio::Channel::new(sample_rate, samples);
                    format_c64_tap_audio::run_pass(
                        id,
                        &channel,
                        peak_amplitude,
                        invert,
                        profile,
                        format_c64_tap_audio::DEFAULT_MIN_AMP_FRAC,
                        debug,
                    )
                }));
            }
        }

        handles.into_iter().map(|handle| handle.join().expect("pass thread panicked")).collect()
    })
}
