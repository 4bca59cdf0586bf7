//! Built-in math functions and constants.

/// Functions compiled directly into a [`Program`](super::Program).
///
/// Names not in this table are deferred to the caller's
/// [`FunctionResolver`](crate::FunctionResolver) at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Abs,
    Sqrt,
    Exp,
    Ln,
    Log10,
    Log2,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Floor,
    Ceil,
    Round,
    Sign,
    Atan2,
    Pow,
    Min,
    Max,
    Fmod,
    Clamp,
}

const TABLE: &[(&str, Builtin)] = &[
    ("abs", Builtin::Abs),
    ("sqrt", Builtin::Sqrt),
    ("exp", Builtin::Exp),
    ("ln", Builtin::Ln),
    ("log", Builtin::Ln),
    ("log10", Builtin::Log10),
    ("log2", Builtin::Log2),
    ("sin", Builtin::Sin),
    ("cos", Builtin::Cos),
    ("tan", Builtin::Tan),
    ("asin", Builtin::Asin),
    ("acos", Builtin::Acos),
    ("atan", Builtin::Atan),
    ("sinh", Builtin::Sinh),
    ("cosh", Builtin::Cosh),
    ("tanh", Builtin::Tanh),
    ("floor", Builtin::Floor),
    ("ceil", Builtin::Ceil),
    ("round", Builtin::Round),
    ("sign", Builtin::Sign),
    ("atan2", Builtin::Atan2),
    ("pow", Builtin::Pow),
    ("min", Builtin::Min),
    ("max", Builtin::Max),
    ("fmod", Builtin::Fmod),
    ("clamp", Builtin::Clamp),
];

impl Builtin {
    /// Look up a built-in by name.
    pub fn lookup(name: &str) -> Option<Self> {
        TABLE.iter().find(|(n, _)| *n == name).map(|&(_, b)| b)
    }

    /// Number of arguments the function takes.
    pub fn arity(self) -> usize {
        match self {
            Self::Atan2 | Self::Pow | Self::Min | Self::Max | Self::Fmod => 2,
            Self::Clamp => 3,
            _ => 1,
        }
    }

    /// Apply to `args`, which must hold exactly [`arity`](Self::arity) values.
    #[inline]
    pub fn apply(self, args: &[f64]) -> f64 {
        let a = args[0];
        match self {
            Self::Abs => a.abs(),
            Self::Sqrt => a.sqrt(),
            Self::Exp => a.exp(),
            Self::Ln => a.ln(),
            Self::Log10 => a.log10(),
            Self::Log2 => a.log2(),
            Self::Sin => a.sin(),
            Self::Cos => a.cos(),
            Self::Tan => a.tan(),
            Self::Asin => a.asin(),
            Self::Acos => a.acos(),
            Self::Atan => a.atan(),
            Self::Sinh => a.sinh(),
            Self::Cosh => a.cosh(),
            Self::Tanh => a.tanh(),
            Self::Floor => a.floor(),
            Self::Ceil => a.ceil(),
            Self::Round => a.round(),
            Self::Sign => {
                if a > 0.0 {
                    1.0
                } else if a < 0.0 {
                    -1.0
                } else {
                    a
                }
            }
            Self::Atan2 => a.atan2(args[1]),
            Self::Pow => a.powf(args[1]),
            Self::Min => a.min(args[1]),
            Self::Max => a.max(args[1]),
            Self::Fmod => a % args[1],
            // min/max rather than f64::clamp, which panics when lo > hi.
            Self::Clamp => a.max(args[1]).min(args[2]),
        }
    }
}

/// Named constants substituted at compile time.
pub fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        _ => None,
    }
}
