//! Per-sample evaluation with NaN substitution and out-of-band reporting.

use std::sync::Arc;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::EvalError;
use crate::resolver::{FunctionResolver, VariableResolver};
use crate::store::Expression;

/// Value written for any sample whose evaluation fails.
pub const NAN_SENTINEL: f64 = f64::NAN;

/// Evaluates a compiled expression snapshot one sample at a time.
///
/// Failures never escape: [`evaluate`](Self::evaluate) returns
/// [`NAN_SENTINEL`] and reports a [`Diagnostic::Evaluation`]. At most one
/// diagnostic is reported per block (see [`begin_block`](Self::begin_block))
/// so a broken expression cannot flood the channel at audio rate.
#[derive(Debug, Clone, Default)]
pub struct EvaluationEngine {
    diagnostics: DiagnosticSink,
    reported: bool,
    failures: usize,
}

impl EvaluationEngine {
    /// Engine reporting to `diagnostics`.
    pub fn new(diagnostics: DiagnosticSink) -> Self {
        Self {
            diagnostics,
            reported: false,
            failures: 0,
        }
    }

    /// Start a new block: re-arm the per-block diagnostic and reset the
    /// failure count.
    #[inline]
    pub fn begin_block(&mut self) {
        self.reported = false;
        self.failures = 0;
    }

    /// Samples that failed since the last [`begin_block`](Self::begin_block).
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Evaluate `expression` once.
    ///
    /// `sample` is only used to label a diagnostic. Allocation-free apart
    /// from what the resolvers do.
    #[inline]
    pub fn evaluate<V, F>(
        &mut self,
        expression: &Arc<Expression>,
        variables: &V,
        functions: &F,
        sample: usize,
    ) -> f64
    where
        V: VariableResolver + ?Sized,
        F: FunctionResolver + ?Sized,
    {
        let result = match expression.program() {
            Ok(program) => program.eval(variables, functions),
            Err(_) => Err(EvalError::InvalidExpression),
        };
        match result {
            Ok(value) => value,
            Err(error) => {
                self.fail(expression, error, sample);
                NAN_SENTINEL
            }
        }
    }

    #[cold]
    fn fail(&mut self, expression: &Arc<Expression>, error: EvalError, sample: usize) {
        self.failures += 1;
        if !self.reported {
            self.reported = true;
            self.diagnostics.report(Diagnostic::Evaluation {
                expression: Arc::clone(expression),
                error,
                sample,
            });
        }
    }
}
