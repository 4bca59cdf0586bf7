//! Out-of-band diagnostic reporting.
//!
//! The render loop cannot log, block, or allocate, so problems found there
//! are pushed into a bounded [`crossbeam_channel`] with `try_send`. When the
//! channel is full the diagnostic is counted and dropped. The control side
//! polls a [`DiagnosticReceiver`] and forwards messages to its log.
//!
//! Evaluation diagnostics carry an `Arc` of the offending [`Expression`]
//! instead of a formatted string; cloning the `Arc` is the only work done
//! on the audio thread. Formatting happens on the receiving side.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::error::EvalError;
use crate::store::Expression;

/// Default channel capacity.
pub const DEFAULT_DIAGNOSTIC_CAPACITY: usize = 64;

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Informational.
    Info,
    /// Recoverable problem; audio keeps flowing.
    Warning,
    /// Output for the affected samples is the NaN sentinel.
    Error,
}

/// A single reported event.
#[derive(Debug, Clone)]
pub enum Diagnostic {
    /// Evaluation failed at `sample`; that sample was written as NaN.
    Evaluation {
        /// Expression being rendered.
        expression: Arc<Expression>,
        /// What went wrong.
        error: EvalError,
        /// Sample index within the block.
        sample: usize,
    },
    /// A `set` was rejected because the text is too long.
    ExpressionTooLong {
        /// Rejected length in bytes.
        len: usize,
        /// Configured maximum.
        max: usize,
    },
    /// A control token of unsupported type was skipped.
    UnsupportedAtom {
        /// Zero-based position in the token list.
        index: usize,
        /// Host type tag of the token.
        type_tag: u8,
    },
    /// The renderer was prepared for a new stream configuration.
    Prepared {
        /// Sample rate in Hz.
        sample_rate: f64,
        /// Largest block the host will render.
        max_block_len: usize,
    },
}

impl Diagnostic {
    /// Severity of this diagnostic.
    pub fn level(&self) -> Level {
        match self {
            Self::Evaluation { .. } => Level::Error,
            Self::ExpressionTooLong { .. } | Self::UnsupportedAtom { .. } => Level::Warning,
            Self::Prepared { .. } => Level::Info,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Evaluation {
                expression,
                error,
                sample,
            } => {
                let reason = match (expression.program(), error) {
                    (Err(parse), _) => parse.to_string(),
                    (Ok(program), error) => program.describe(error),
                };
                write!(
                    f,
                    "expression '{}' failed at sample {sample}: {reason}, returning nan",
                    expression.text()
                )
            }
            Self::ExpressionTooLong { len, max } => {
                write!(f, "expression of {len} bytes exceeds maximum of {max}, keeping previous")
            }
            Self::UnsupportedAtom { index, type_tag } => {
                write!(f, "token {}: unsupported type ({type_tag}), skipped", index + 1)
            }
            Self::Prepared {
                sample_rate,
                max_block_len,
            } => write!(f, "sample rate is {sample_rate}, max block {max_block_len}"),
        }
    }
}

/// Sending half. Cheap to clone; never blocks.
#[derive(Debug, Clone)]
pub struct DiagnosticSink {
    tx: Option<Sender<Diagnostic>>,
    dropped: Arc<AtomicU64>,
}

impl DiagnosticSink {
    /// A sink that discards everything.
    pub fn disabled() -> Self {
        Self {
            tx: None,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Try to enqueue `diagnostic`. Returns `false` if it was dropped.
    #[inline]
    pub fn report(&self, diagnostic: Diagnostic) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        match tx.try_send(diagnostic) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Receiving half, polled from the control side.
///
/// Poll with [`try_recv`](Self::try_recv) or [`drain`](Self::drain); a
/// receiver parked in a blocking wait would make senders take the wake-up
/// path.
#[derive(Debug)]
pub struct DiagnosticReceiver {
    rx: Receiver<Diagnostic>,
    dropped: Arc<AtomicU64>,
}

impl DiagnosticReceiver {
    /// Next pending diagnostic, if any.
    pub fn try_recv(&self) -> Option<Diagnostic> {
        self.rx.try_recv().ok()
    }

    /// Take every pending diagnostic.
    pub fn drain(&self) -> Vec<Diagnostic> {
        self.rx.try_iter().collect()
    }

    /// Number of diagnostics dropped on a full channel since the last call.
    pub fn take_dropped(&self) -> u64 {
        self.dropped.swap(0, Ordering::Relaxed)
    }

    /// Forward pending diagnostics to `tracing`. Returns how many were logged.
    #[cfg(feature = "tracing")]
    pub fn log_pending(&self) -> usize {
        let mut count = 0;
        for diagnostic in self.rx.try_iter() {
            match diagnostic.level() {
                Level::Info => tracing::info!("{diagnostic}"),
                Level::Warning => tracing::warn!("{diagnostic}"),
                Level::Error => tracing::error!("{diagnostic}"),
            }
            count += 1;
        }
        let dropped = self.take_dropped();
        if dropped > 0 {
            tracing::warn!("{dropped} diagnostic(s) dropped, channel full");
        }
        count
    }
}

/// Create a connected sink/receiver pair holding at most `capacity` entries.
pub fn diagnostic_channel(capacity: usize) -> (DiagnosticSink, DiagnosticReceiver) {
    let (tx, rx) = bounded(capacity.max(1));
    let dropped = Arc::new(AtomicU64::new(0));
    (
        DiagnosticSink {
            tx: Some(tx),
            dropped: Arc::clone(&dropped),
        },
        DiagnosticReceiver { rx, dropped },
    )
}
