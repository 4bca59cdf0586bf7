//! WAV channel I/O for sigexpr.
//!
//! Reads a multi-channel WAV file into one `f64` vector per channel, so
//! that file channel `n` can drive expression variable `v<n>`, and writes
//! rendered output back out.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sigexpr_core::{DiagnosticSink, ExprRenderer, ExpressionStore};
//! use sigexpr_io::{read_wav_channels, write_wav};
//!
//! let (channels, spec) = read_wav_channels("input.wav")?;
//! let slices: Vec<&[f64]> = channels.iter().map(Vec::as_slice).collect();
//!
//! let store = ExpressionStore::default();
//! store.set("0.5 * (v0 + v1)")?;
//! let mut renderer = ExprRenderer::new(store, DiagnosticSink::disabled());
//! let mixed = renderer.render_block(&slices, channels[0].len());
//!
//! write_wav("mix.wav", &mixed, spec)?;
//! ```

mod wav;

pub use wav::{
    WavFormat, WavInfo, WavSpec, read_wav_channels, read_wav_info, write_wav, write_wav_channels,
};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Channels passed for writing differ in length.
    #[error("Channel length mismatch: expected {expected} samples, found {found}")]
    ChannelLength {
        /// Length of the first channel.
        expected: usize,
        /// Length of the first channel that differs.
        found: usize,
    },
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
