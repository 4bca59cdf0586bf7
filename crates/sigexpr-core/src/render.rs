//! Per-block render loop.
//!
//! [`ExprRenderer`] is the audio-thread half of an expression object. Each
//! [`render`](ExprRenderer::render) call loads the active expression once,
//! walks the sample cursor across the block, evaluates, and writes one
//! output value per sample. The loop performs no allocation, takes no lock,
//! and always fills the whole output buffer.

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::engine::EvaluationEngine;
use crate::resolver::{ChannelResolver, FunctionResolver, NoFunctions};
use crate::store::ExpressionStore;

/// Default number of signal inputs.
pub const DEFAULT_INPUT_CHANNELS: usize = 4;

/// Audio-thread renderer bound to an [`ExpressionStore`].
///
/// Generic over the function resolver; the default knows no external
/// functions, leaving only built-ins.
#[derive(Debug)]
pub struct ExprRenderer<F = NoFunctions> {
    store: ExpressionStore,
    engine: EvaluationEngine,
    functions: F,
    diagnostics: DiagnosticSink,
    sample_rate: f64,
    max_block_len: usize,
}

impl ExprRenderer<NoFunctions> {
    /// Renderer reading `store`, reporting evaluation problems to `diagnostics`.
    pub fn new(store: ExpressionStore, diagnostics: DiagnosticSink) -> Self {
        Self::with_functions(store, diagnostics, NoFunctions)
    }
}

impl<F: FunctionResolver> ExprRenderer<F> {
    /// Renderer with a custom function resolver.
    pub fn with_functions(store: ExpressionStore, diagnostics: DiagnosticSink, functions: F) -> Self {
        Self {
            store,
            engine: EvaluationEngine::new(diagnostics.clone()),
            functions,
            diagnostics,
            sample_rate: 0.0,
            max_block_len: 0,
        }
    }

    /// Store this renderer reads from.
    pub fn store(&self) -> &ExpressionStore {
        &self.store
    }

    /// Announce the stream configuration. Reports an informational
    /// diagnostic; rendering does not depend on either value.
    pub fn prepare(&mut self, sample_rate: f64, max_block_len: usize) {
        self.sample_rate = sample_rate;
        self.max_block_len = max_block_len;
        self.diagnostics.report(Diagnostic::Prepared {
            sample_rate,
            max_block_len,
        });
    }

    /// Sample rate from the last [`prepare`](Self::prepare), 0.0 before.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Block size limit from the last [`prepare`](Self::prepare).
    pub fn max_block_len(&self) -> usize {
        self.max_block_len
    }

    /// Samples that rendered as NaN in the most recent block.
    pub fn last_block_failures(&self) -> usize {
        self.engine.failures()
    }

    /// Render `output.len()` samples from `channels`.
    ///
    /// Channel `n` backs variable `v<n>`. Channels shorter than the block
    /// are unresolved past their end. Real-time safe.
    pub fn render(&mut self, channels: &[&[f64]], output: &mut [f64]) {
        let expression = self.store.current();
        let mut resolver = ChannelResolver::new(channels);
        self.engine.begin_block();

        for (cursor, out) in output.iter_mut().enumerate() {
            resolver.set_cursor(cursor);
            *out = self
                .engine
                .evaluate(&expression, &resolver, &self.functions, cursor);
        }
    }

    /// Render `block_len` samples into a newly allocated buffer.
    ///
    /// Convenience for offline use; the real-time path is
    /// [`render`](Self::render).
    pub fn render_block(&mut self, channels: &[&[f64]], block_len: usize) -> Vec<f64> {
        let mut output = vec![0.0; block_len];
        self.render(channels, &mut output);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::diagnostic_channel;

    fn renderer(expression: &str) -> ExprRenderer {
        let store = ExpressionStore::default();
        store.set(expression).unwrap();
        ExprRenderer::new(store, DiagnosticSink::disabled())
    }

    #[test]
    fn sums_two_channels() {
        let mut r = renderer("v0 + v1");
        let channels: [&[f64]; 2] = [&[1.0, 2.0], &[10.0, 20.0]];
        let out = r.render_block(&channels, 2);
        assert_eq!(out, vec![11.0, 22.0]);
    }

    #[test]
    fn scales_one_channel() {
        let mut r = renderer("2 * v0");
        let channels: [&[f64]; 1] = [&[3.0]];
        let out = r.render_block(&channels, 1);
        assert_eq!(out, vec![6.0]);
    }

    #[test]
    fn default_expression_passes_input_through() {
        let mut r = ExprRenderer::new(ExpressionStore::default(), DiagnosticSink::disabled());
        let channels: [&[f64]; 1] = [&[0.1, -0.2, 0.3]];
        let out = r.render_block(&channels, 3);
        assert_eq!(out, vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn missing_channel_renders_nan_with_diagnostic() {
        let (sink, rx) = diagnostic_channel(8);
        let store = ExpressionStore::default();
        store.set("v9").unwrap();
        let mut r = ExprRenderer::new(store, sink);

        let input: &[f64] = &[0.5; 16];
        let out = r.render_block(&[input, input, input, input], 16);
        assert_eq!(out.len(), 16);
        assert!(out.iter().all(|v| v.is_nan()));
        assert_eq!(r.last_block_failures(), 16);
        assert!(matches!(rx.try_recv(), Some(Diagnostic::Evaluation { .. })));
    }

    #[test]
    fn short_channel_is_unresolved_past_end() {
        let mut r = renderer("v0");
        let channels: [&[f64]; 1] = [&[1.0]];
        let out = r.render_block(&channels, 3);
        assert_eq!(out[0], 1.0);
        assert!(out[1].is_nan());
        assert!(out[2].is_nan());
    }

    #[test]
    fn empty_block_renders_nothing() {
        let mut r = renderer("v0");
        assert!(r.render_block(&[], 0).is_empty());
    }

    #[test]
    fn prepare_reports_sample_rate() {
        let (sink, rx) = diagnostic_channel(4);
        let mut r = ExprRenderer::new(ExpressionStore::default(), sink);
        r.prepare(44100.0, 512);
        assert_eq!(r.sample_rate(), 44100.0);
        assert_eq!(r.max_block_len(), 512);
        let diagnostic = rx.try_recv().unwrap();
        assert_eq!(diagnostic.to_string(), "sample rate is 44100, max block 512");
    }

    #[test]
    fn picks_up_replacement_on_next_block() {
        let store = ExpressionStore::default();
        let mut r = ExprRenderer::new(store.clone(), DiagnosticSink::disabled());
        let input: &[f64] = &[2.0];
        assert_eq!(r.render_block(&[input], 1), vec![2.0]);
        store.set("v0 * 10").unwrap();
        assert_eq!(r.render_block(&[input], 1), vec![20.0]);
    }

    #[test]
    fn custom_functions_reach_the_evaluator() {
        struct Halve;
        impl FunctionResolver for Halve {
            fn call(&self, name: &str, args: &[f64]) -> Option<f64> {
                (name == "halve").then(|| args.first().copied().unwrap_or(0.0) / 2.0)
            }
        }
        let store = ExpressionStore::default();
        store.set("halve(v0)").unwrap();
        let mut r = ExprRenderer::with_functions(store, DiagnosticSink::disabled(), Halve);
        let channels: [&[f64]; 1] = [&[8.0]];
        assert_eq!(r.render_block(&channels, 1), vec![4.0]);
    }
}
