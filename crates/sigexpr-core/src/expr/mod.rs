//! Arithmetic expression language.
//!
//! Two-phase design: [`Program::compile`] parses text once into a flat
//! program, then [`Program::eval`] runs it as often as needed against
//! caller-supplied resolvers. [`evaluate`] does both in one call for
//! control-rate use where convenience beats speed.
//!
//! ```rust
//! use sigexpr_core::expr::{Program, evaluate};
//! use sigexpr_core::{MapResolver, NoFunctions};
//!
//! let vars = MapResolver::new().with("v0", 0.25);
//! let result = evaluate("4 * v0 + 1", &vars, &NoFunctions);
//! assert_eq!(result.value, 2.0);
//! assert!(result.error.is_none());
//!
//! let program = Program::compile("v0 > 0.5").unwrap();
//! assert_eq!(program.eval(&vars, &NoFunctions), Ok(0.0));
//! ```

mod builtins;
mod lexer;
mod parser;
mod program;

pub use parser::{BinaryOp, MAX_NESTING, MAX_NODES, Node, UnaryOp, parse};
pub use program::{MAX_CALL_ARGS, MAX_STACK_DEPTH, Program};

use crate::resolver::{FunctionResolver, VariableResolver};

/// Outcome of a one-shot [`evaluate`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Result, or NaN when `error` is set.
    pub value: f64,
    /// Description of the parse or evaluation failure, if any.
    pub error: Option<String>,
}

impl Evaluation {
    /// Whether evaluation succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Parse and evaluate `text` in one step.
///
/// Never fails: errors yield a NaN value plus a message. Allocates, so keep
/// it off the audio thread; the render loop evaluates precompiled
/// [`Program`]s instead.
pub fn evaluate<V, F>(text: &str, variables: &V, functions: &F) -> Evaluation
where
    V: VariableResolver + ?Sized,
    F: FunctionResolver + ?Sized,
{
    let program = match Program::compile(text) {
        Ok(program) => program,
        Err(e) => {
            return Evaluation {
                value: f64::NAN,
                error: Some(e.to_string()),
            };
        }
    };
    match program.eval(variables, functions) {
        Ok(value) => Evaluation { value, error: None },
        Err(e) => Evaluation {
            value: f64::NAN,
            error: Some(program.describe(&e)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{MapResolver, NoFunctions};

    #[test]
    fn evaluate_success() {
        let vars = MapResolver::new().with("v0", 3.0);
        let result = evaluate("2 * v0", &vars, &NoFunctions);
        assert_eq!(result.value, 6.0);
        assert!(result.is_ok());
    }

    #[test]
    fn evaluate_parse_failure_is_nan() {
        let result = evaluate("2 *", &MapResolver::new(), &NoFunctions);
        assert!(result.value.is_nan());
        assert_eq!(result.error.as_deref(), Some("unexpected end of expression"));
    }

    #[test]
    fn evaluate_unresolved_is_nan() {
        let result = evaluate("v9", &MapResolver::new(), &NoFunctions);
        assert!(result.value.is_nan());
        assert_eq!(result.error.as_deref(), Some("unresolved variable 'v9'"));
    }
}
