//! Property-based tests for the render loop.
//!
//! Generates random expressions over `v0`..`v3` and random channel data,
//! checking output length, determinism, and agreement with the one-shot
//! evaluator.

use proptest::prelude::*;
use sigexpr_core::{
    DiagnosticSink, ExprRenderer, ExpressionStore, MapResolver, NoFunctions, evaluate,
};

/// Random arithmetic expression over four channel variables.
fn arb_expression() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        (0usize..4).prop_map(|i| format!("v{i}")),
        (-100i32..100).prop_map(|n| format!("{n}")),
        (-10.0f64..10.0).prop_map(|x| format!("{x:.3}")),
    ];
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone(), prop::sample::select(vec!["+", "-", "*", "/"]))
                .prop_map(|(a, b, op)| format!("({a} {op} {b})")),
            inner.prop_map(|a| format!("-({a})")),
        ]
    })
}

fn render(expression: &str, channels: &[Vec<f64>], block_len: usize) -> Vec<f64> {
    let store = ExpressionStore::default();
    store.set(expression).unwrap();
    let mut renderer = ExprRenderer::new(store, DiagnosticSink::disabled());
    let slices: Vec<&[f64]> = channels.iter().map(Vec::as_slice).collect();
    renderer.render_block(&slices, block_len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any expression over v0..v3 renders exactly block_len values.
    #[test]
    fn output_length_matches_block(
        expression in arb_expression(),
        block_len in 1usize..128,
        seed in prop::collection::vec(-1.0f64..=1.0, 4),
    ) {
        prop_assume!(expression.len() <= 255);
        let channels: Vec<Vec<f64>> = seed
            .iter()
            .map(|&s| (0..block_len).map(|i| s * (i as f64 + 1.0) / 64.0).collect())
            .collect();
        let out = render(&expression, &channels, block_len);
        prop_assert_eq!(out.len(), block_len);
    }

    /// Two renders of the same inputs are bit-identical.
    #[test]
    fn render_twice_is_identical(
        expression in arb_expression(),
        data in prop::collection::vec(prop::collection::vec(-1.0f64..=1.0, 16), 4),
    ) {
        prop_assume!(expression.len() <= 255);
        let a = render(&expression, &data, 16);
        let b = render(&expression, &data, 16);
        let a_bits: Vec<u64> = a.iter().map(|v| v.to_bits()).collect();
        let b_bits: Vec<u64> = b.iter().map(|v| v.to_bits()).collect();
        prop_assert_eq!(a_bits, b_bits);
    }

    /// The compiled render path agrees with the one-shot evaluator.
    #[test]
    fn render_matches_one_shot_evaluate(
        expression in arb_expression(),
        data in prop::collection::vec(prop::collection::vec(-1.0f64..=1.0, 8), 4),
    ) {
        prop_assume!(expression.len() <= 255);
        let out = render(&expression, &data, 8);
        for (i, &got) in out.iter().enumerate() {
            let vars = MapResolver::new()
                .with("v0", data[0][i])
                .with("v1", data[1][i])
                .with("v2", data[2][i])
                .with("v3", data[3][i]);
            let expected = evaluate(&expression, &vars, &NoFunctions);
            prop_assert!(expected.is_ok(), "{:?}", expected.error);
            prop_assert_eq!(got.to_bits(), expected.value.to_bits(), "sample {} of '{}'", i, expression);
        }
    }

    /// A constant expression fills every sample with the same value.
    #[test]
    fn constant_fills_block(n in -1000i32..1000, block_len in 1usize..64) {
        let channels: Vec<Vec<f64>> = Vec::new();
        let out = render(&format!("{n} * 2"), &channels, block_len);
        prop_assert!(out.iter().all(|&v| v == f64::from(n) * 2.0));
    }
}
