//! Assembly of expression text from control-message tokens.
//!
//! A `set` command arrives as a list of host tokens. Integers print plainly,
//! floats print with a fixed number of decimals, symbols print verbatim, and
//! each printed token is preceded by a single space. Tokens of any other type
//! are skipped and reported.

use std::fmt::Write as _;

/// Default decimals used when printing float tokens.
pub const DEFAULT_FLOAT_PRECISION: usize = 2;

/// A single control-message token.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    /// Integer token.
    Int(i64),
    /// Floating-point token.
    Float(f64),
    /// Symbol token (operator, identifier, or any other text).
    Symbol(String),
    /// Token of a type the assembler does not understand, with its host tag.
    Unsupported(u8),
}

impl Atom {
    /// Classify a raw text token: integer, float, or symbol.
    ///
    /// ```rust
    /// use sigexpr_core::Atom;
    ///
    /// assert_eq!(Atom::parse("3"), Atom::Int(3));
    /// assert_eq!(Atom::parse("0.5"), Atom::Float(0.5));
    /// assert_eq!(Atom::parse("v0"), Atom::Symbol("v0".into()));
    /// ```
    pub fn parse(token: &str) -> Self {
        if let Ok(i) = token.parse::<i64>() {
            return Self::Int(i);
        }
        // Rejects "inf"/"nan", which would otherwise parse as floats.
        if token.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
            && let Ok(f) = token.parse::<f64>()
        {
            return Self::Float(f);
        }
        Self::Symbol(token.to_string())
    }
}

/// Result of assembling a token list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    /// Expression text.
    pub text: String,
    /// Zero-based indices of skipped tokens with their type tags.
    pub skipped: Vec<(usize, u8)>,
}

/// Join `atoms` into expression text, one space before each token.
///
/// ```rust
/// use sigexpr_core::{Atom, assemble_expression};
///
/// let atoms = [Atom::Int(2), Atom::Symbol("*".into()), Atom::Symbol("v0".into())];
/// assert_eq!(assemble_expression(&atoms, 2).text, " 2 * v0");
/// ```
pub fn assemble_expression(atoms: &[Atom], float_precision: usize) -> Assembled {
    let mut text = String::new();
    let mut skipped = Vec::new();

    for (index, atom) in atoms.iter().enumerate() {
        if let Atom::Unsupported(tag) = atom {
            skipped.push((index, *tag));
            continue;
        }
        text.push(' ');
        // Writing into a String cannot fail.
        let _ = match atom {
            Atom::Int(i) => write!(text, "{i}"),
            Atom::Float(f) => write!(text, "{f:.float_precision$}"),
            Atom::Symbol(s) => write!(text, "{s}"),
            Atom::Unsupported(_) => Ok(()),
        };
    }

    Assembled { text, skipped }
}
