//! Lock-free expression store shared between control and audio threads.
//!
//! The active expression is an immutable [`Expression`] published through an
//! [`ArcSwap`]. The control thread builds a complete new snapshot (text plus
//! compiled program) and swaps it in; the audio thread's [`current`] is a
//! wait-free load that sees either the previous snapshot or the new one,
//! never a mix.
//!
//! Replaced snapshots are parked in a writer-side retire list and freed on a
//! later `set` once no reader holds them, so the audio thread never runs a
//! deallocation.
//!
//! [`current`]: ExpressionStore::current

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::{ArcSwap, Guard};
use parking_lot::Mutex;

use crate::control::{Atom, assemble_expression};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{ExprError, ParseError};
use crate::expr::Program;

/// Default maximum expression length in bytes.
pub const DEFAULT_MAX_EXPRESSION_LEN: usize = 255;

/// Largest length limit a configuration may choose.
pub const MAX_EXPRESSION_LEN: usize = 4096;

/// Expression active on a freshly created store: pass input 0 through.
pub const DEFAULT_EXPRESSION: &str = "v0";

/// Immutable snapshot of an expression and its compiled form.
///
/// Compilation happens when the snapshot is built. A snapshot whose text
/// does not compile is still publishable; it renders as NaN.
#[derive(Debug)]
pub struct Expression {
    text: Box<str>,
    program: Result<Program, ParseError>,
    generation: u64,
}

impl Expression {
    /// Build a snapshot, compiling `text`.
    pub fn new(text: &str, generation: u64) -> Self {
        Self {
            text: text.into(),
            program: Program::compile(text),
            generation,
        }
    }

    /// Source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Compiled program, or the reason compilation failed.
    pub fn program(&self) -> Result<&Program, &ParseError> {
        self.program.as_ref()
    }

    /// Whether the text compiled.
    pub fn is_valid(&self) -> bool {
        self.program.is_ok()
    }

    /// Sequence number assigned by the store; increases with every `set`.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct StoreData {
    current: ArcSwap<Expression>,
    /// Snapshots swapped out but possibly still referenced by a reader.
    retired: Mutex<Vec<Arc<Expression>>>,
    generation: AtomicU64,
    max_len: usize,
    diagnostics: DiagnosticSink,
}

/// Holder of the active expression.
///
/// Cheap to clone; clones share the same slot. Hand one to the control
/// thread and one to the renderer.
#[derive(Clone)]
pub struct ExpressionStore {
    inner: Arc<StoreData>,
}

impl std::fmt::Debug for ExpressionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpressionStore")
            .field("current", &self.current().text())
            .field("max_len", &self.inner.max_len)
            .finish_non_exhaustive()
    }
}

impl Default for ExpressionStore {
    fn default() -> Self {
        Self::new(DiagnosticSink::disabled())
    }
}

impl ExpressionStore {
    /// Store holding [`DEFAULT_EXPRESSION`] with the default length limit.
    pub fn new(diagnostics: DiagnosticSink) -> Self {
        Self::build(DEFAULT_EXPRESSION, DEFAULT_MAX_EXPRESSION_LEN, diagnostics)
    }

    /// Store holding `initial` with a custom length limit.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::TooLong`] if `initial` exceeds `max_len`.
    pub fn with_limit(
        initial: &str,
        max_len: usize,
        diagnostics: DiagnosticSink,
    ) -> Result<Self, ExprError> {
        check_len(initial, max_len)?;
        Ok(Self::build(initial, max_len, diagnostics))
    }

    fn build(initial: &str, max_len: usize, diagnostics: DiagnosticSink) -> Self {
        Self {
            inner: Arc::new(StoreData {
                current: ArcSwap::from_pointee(Expression::new(initial, 0)),
                retired: Mutex::new(Vec::new()),
                generation: AtomicU64::new(0),
                max_len,
                diagnostics,
            }),
        }
    }

    /// Maximum accepted expression length in bytes.
    pub fn max_len(&self) -> usize {
        self.inner.max_len
    }

    /// Replace the active expression (control thread).
    ///
    /// Compiles `text` before publishing. Compile failures are not reported
    /// here; the snapshot is published and renders as NaN.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::TooLong`] and keeps the previous expression if
    /// `text` exceeds [`max_len`](Self::max_len). A diagnostic is reported
    /// as well.
    pub fn set(&self, text: &str) -> Result<(), ExprError> {
        if let Err(e) = check_len(text, self.inner.max_len) {
            self.inner.diagnostics.report(Diagnostic::ExpressionTooLong {
                len: text.len(),
                max: self.inner.max_len,
            });
            #[cfg(feature = "tracing")]
            tracing::warn!("expression_set: rejected, {e}");
            return Err(e);
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let next = Arc::new(Expression::new(text, generation));
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "expression_set: gen {generation} '{text}' ({})",
            if next.is_valid() { "ok" } else { "invalid" }
        );

        let mut retired = self.inner.retired.lock();
        let previous = self.inner.current.swap(next);
        retired.push(previous);
        retired.retain(|snapshot| Arc::strong_count(snapshot) > 1);
        Ok(())
    }

    /// Replace the active expression from control-message tokens.
    ///
    /// Unsupported tokens are reported and skipped; the remaining tokens are
    /// joined as described in [`assemble_expression`].
    ///
    /// # Errors
    ///
    /// See [`set`](Self::set).
    pub fn set_atoms(&self, atoms: &[Atom], float_precision: usize) -> Result<(), ExprError> {
        let assembled = assemble_expression(atoms, float_precision);
        for &(index, type_tag) in &assembled.skipped {
            self.inner
                .diagnostics
                .report(Diagnostic::UnsupportedAtom { index, type_tag });
        }
        self.set(&assembled.text)
    }

    /// Active expression (audio thread, wait-free).
    ///
    /// Hold the guard for one render pass, not longer.
    #[inline]
    pub fn current(&self) -> Guard<Arc<Expression>> {
        self.inner.current.load()
    }

    /// Active expression as an owned `Arc`.
    pub fn snapshot(&self) -> Arc<Expression> {
        self.inner.current.load_full()
    }

    /// Number of replaced snapshots not yet freed.
    pub fn retired_len(&self) -> usize {
        self.inner.retired.lock().len()
    }

    /// Sink used for store-level diagnostics.
    pub fn diagnostics(&self) -> &DiagnosticSink {
        &self.inner.diagnostics
    }
}

fn check_len(text: &str, max: usize) -> Result<(), ExprError> {
    if text.len() > max {
        return Err(ExprError::TooLong {
            len: text.len(),
            max,
        });
    }
    Ok(())
}
