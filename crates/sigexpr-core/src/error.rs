//! Error types for expression parsing, evaluation, and replacement.

use thiserror::Error;

/// Errors raised on the control path when replacing the active expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    /// Expression text exceeds the configured maximum length.
    #[error("expression is {len} bytes, maximum is {max}")]
    TooLong {
        /// Length of the rejected text in bytes.
        len: usize,
        /// Configured maximum in bytes.
        max: usize,
    },
}

/// Syntax errors produced while compiling expression text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Expression contains nothing but whitespace.
    #[error("empty expression")]
    Empty,

    /// Character that cannot start any token.
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar {
        /// Byte position in the input.
        pos: usize,
        /// The offending character.
        ch: char,
    },

    /// Token that is valid on its own but not where it appears.
    #[error("unexpected '{found}' at position {pos}")]
    UnexpectedToken {
        /// Byte position in the input.
        pos: usize,
        /// Source text of the token.
        found: String,
    },

    /// Input ended while an operand or closing token was expected.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// Opening parenthesis without a matching `)`.
    #[error("unclosed parenthesis at position {pos}")]
    UnclosedParen {
        /// Position of the opening `(`.
        pos: usize,
    },

    /// Numeric literal that does not parse as a float.
    #[error("invalid number '{text}' at position {pos}")]
    InvalidNumber {
        /// Byte position in the input.
        pos: usize,
        /// Literal text.
        text: String,
    },

    /// Built-in function called with the wrong number of arguments.
    #[error("function '{name}' expects {expected} argument(s), got {found}")]
    WrongArity {
        /// Function name.
        name: String,
        /// Required argument count.
        expected: usize,
        /// Supplied argument count.
        found: usize,
    },

    /// More tree nodes than the compiler accepts.
    #[error("expression has more than {max} terms and operators")]
    TooLarge {
        /// Supported maximum.
        max: usize,
    },

    /// Nesting or evaluation stack depth beyond what the evaluator supports.
    #[error("expression nests deeper than {max} levels")]
    TooDeep {
        /// Supported maximum.
        max: usize,
    },
}

/// Evaluation failures on the audio path.
///
/// `Copy` and free of heap data so it can be produced and reported from the
/// render loop. Symbol indices refer to the compiled
/// [`Program`](crate::expr::Program) that raised the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    /// The variable resolver returned nothing for this variable.
    UnresolvedVariable {
        /// Index into the program's variable table.
        symbol: u32,
    },
    /// Neither the built-ins nor the function resolver know this call.
    UnresolvedFunction {
        /// Index into the program's function table.
        symbol: u32,
        /// Number of arguments at the call site.
        argc: u8,
    },
    /// The active expression failed to compile.
    InvalidExpression,
}
