//! WAV loading via `hound`, de-interleaved into one sample buffer per
//! channel. Samples are kept unscaled as `f64`: every downstream
//! threshold is a fraction of the peak amplitude measured from the
//! data, so absolute sample units never matter.

use std::path::Path;

use format_c64_tap_audio::Channel;
use hound::{SampleFormat, WavReader};

use crate::error::TapeRecoverError;

/// Open a WAV file and split it into one [`Channel`] per audio channel.
///
/// # Errors
/// Returns [`TapeRecoverError::Wav`] if the file can't be opened or
/// decoded.
pub fn load(path: &Path) -> Result<Vec<Channel>, TapeRecoverError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channel_count = spec.channels as usize;

    let mut buffers: Vec<Vec<f64>> = vec![Vec::new(); channel_count.max(1)];

    match spec.sample_format {
        SampleFormat::Int => {
            for (index, sample) in reader.samples::<i32>().enumerate() {
                let value = sample?;
                buffers[index % channel_count].push(f64::from(value));
            }
        }
        SampleFormat::Float => {
            for (index, sample) in reader.samples::<f32>().enumerate() {
                let value = sample?;
                buffers[index % channel_count].push(f64::from(value));
            }
        }
    }

    Ok(buffers
        .into_iter()
        .map(|samples| Channel::new(spec.sample_rate, samples))
        .collect())
}
