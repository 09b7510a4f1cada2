//! The small error type used at the I/O boundary. The core pipeline
//! crate never returns `Result`; everything fallible lives here.

use std::fmt;

#[derive(Debug)]
pub enum TapeRecoverError {
    Io(std::io::Error),
    Wav(hound::Error),
}

impl fmt::Display for TapeRecoverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Wav(err) => write!(f, "WAV error: {err}"),
        }
    }
}

impl std::error::Error for TapeRecoverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Wav(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for TapeRecoverError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<hound::Error> for TapeRecoverError {
    fn from(err: hound::Error) -> Self {
        Self::Wav(err)
    }
}
