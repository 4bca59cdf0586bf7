//! sigexpr core - per-sample expression evaluation over audio channels
//!
//! Evaluates a user-supplied arithmetic expression once per sample, binding
//! `v0`..`v9` to the current sample of the matching input channel, and writes
//! the result to a single output. The expression can be replaced from a
//! control thread at any time while the audio thread keeps rendering.
//!
//! # Components
//!
//! - [`ExpressionStore`] - holds the active [`Expression`] snapshot; `set` on
//!   the control thread, wait-free `current` on the audio thread
//! - [`VariableResolver`] / [`ChannelResolver`] - name to value lookup at the
//!   current sample cursor, bounds-checked
//! - [`EvaluationEngine`] - runs a compiled [`Program`], substituting
//!   [`NAN_SENTINEL`] and reporting a [`Diagnostic`] on failure
//! - [`ExprRenderer`] - the per-block loop that drives everything
//! - [`expr`] - the expression language: parse once, evaluate many times
//!
//! # Example
//!
//! ```rust
//! use sigexpr_core::{ExprRenderer, ExpressionStore, diagnostic_channel};
//!
//! let (sink, diagnostics) = diagnostic_channel(64);
//! let store = ExpressionStore::new(sink.clone());
//! let mut renderer = ExprRenderer::new(store.clone(), sink);
//!
//! // Control thread
//! store.set("v0 + v1").unwrap();
//!
//! // Audio thread
//! let channels: [&[f64]; 2] = [&[1.0, 2.0], &[10.0, 20.0]];
//! let mut out = [0.0; 2];
//! renderer.render(&channels, &mut out);
//! assert_eq!(out, [11.0, 22.0]);
//! assert!(diagnostics.try_recv().is_none());
//! ```
//!
//! # Real-time guarantees
//!
//! - `render` performs no allocation, takes no lock, and does no I/O
//! - Expressions are compiled on the control thread, never per sample
//! - Replaced expressions are freed on the control thread
//! - Failures become NaN samples plus a bounded, non-blocking diagnostic

pub mod control;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod expr;
pub mod render;
pub mod resolver;
pub mod store;

pub use control::{Assembled, Atom, DEFAULT_FLOAT_PRECISION, assemble_expression};
pub use diagnostics::{
    DEFAULT_DIAGNOSTIC_CAPACITY, Diagnostic, DiagnosticReceiver, DiagnosticSink, Level,
    diagnostic_channel,
};
pub use engine::{EvaluationEngine, NAN_SENTINEL};
pub use error::{EvalError, ExprError, ParseError};
pub use expr::{Evaluation, Program, evaluate};
pub use render::{DEFAULT_INPUT_CHANNELS, ExprRenderer};
pub use resolver::{
    ChannelResolver, FunctionResolver, MapResolver, NoFunctions, VariableResolver, channel_index,
};
pub use store::{
    DEFAULT_EXPRESSION, DEFAULT_MAX_EXPRESSION_LEN, Expression, ExpressionStore,
    MAX_EXPRESSION_LEN,
};
