//! Compiled expression programs.
//!
//! A [`Program`] is a flat postfix op list produced once from a parse tree.
//! Evaluation walks the list with a fixed-size stack on the call frame, so
//! per-sample evaluation neither allocates nor recurses.

use super::builtins::{self, Builtin};
use super::parser::{self, BinaryOp, Node, UnaryOp, truth};
use crate::error::{EvalError, ParseError};
use crate::resolver::{FunctionResolver, VariableResolver};

/// Maximum operand stack depth a program may need.
pub const MAX_STACK_DEPTH: usize = 64;

/// Maximum argument count at a single call site.
pub const MAX_CALL_ARGS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Const(f64),
    Var(u32),
    Unary(UnaryOp),
    Binary(BinaryOp),
    Builtin(Builtin),
    Call { symbol: u32, argc: u8 },
}

/// Compiled, immutable form of an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    ops: Box<[Op]>,
    variables: Box<[Box<str>]>,
    functions: Box<[Box<str>]>,
    max_depth: usize,
}

impl Program {
    /// Parse and compile expression text.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for syntax errors, wrong built-in arity, too
    /// many call arguments, or stack depth beyond [`MAX_STACK_DEPTH`].
    pub fn compile(src: &str) -> Result<Self, ParseError> {
        let tree = parser::parse(src)?;
        Self::from_tree(&tree)
    }

    /// Compile an already parsed tree.
    ///
    /// # Errors
    ///
    /// See [`Program::compile`].
    pub fn from_tree(tree: &Node) -> Result<Self, ParseError> {
        let mut compiler = Compiler::default();
        compiler.emit(tree)?;
        Ok(Self {
            ops: compiler.ops.into_boxed_slice(),
            variables: compiler.variables.into_boxed_slice(),
            functions: compiler.functions.into_boxed_slice(),
            max_depth: compiler.max_depth,
        })
    }

    /// Distinct variable names referenced, in first-use order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|s| &**s)
    }

    /// Distinct function names deferred to the function resolver.
    pub fn functions(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|s| &**s)
    }

    /// Deepest operand stack this program reaches.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether the program references no variables and no external functions.
    pub fn is_constant(&self) -> bool {
        self.variables.is_empty() && self.functions.is_empty()
    }

    /// Name of variable `symbol`, as carried by [`EvalError::UnresolvedVariable`].
    pub fn variable_name(&self, symbol: u32) -> Option<&str> {
        self.variables.get(symbol as usize).map(|s| &**s)
    }

    /// Name of function `symbol`, as carried by [`EvalError::UnresolvedFunction`].
    pub fn function_name(&self, symbol: u32) -> Option<&str> {
        self.functions.get(symbol as usize).map(|s| &**s)
    }

    /// Human-readable description of an error raised by this program.
    pub fn describe(&self, error: &EvalError) -> String {
        match *error {
            EvalError::UnresolvedVariable { symbol } => format!(
                "unresolved variable '{}'",
                self.variable_name(symbol).unwrap_or("?")
            ),
            EvalError::UnresolvedFunction { symbol, argc } => format!(
                "unresolved function '{}' with {argc} argument(s)",
                self.function_name(symbol).unwrap_or("?")
            ),
            EvalError::InvalidExpression => "invalid expression".to_string(),
        }
    }

    /// Evaluate once.
    ///
    /// Calls `variables` for every variable reference and `functions` for
    /// every non-built-in call. Real-time safe as long as both resolvers are.
    ///
    /// # Errors
    ///
    /// Returns the first [`EvalError`] encountered; remaining ops are skipped.
    pub fn eval<V, F>(&self, variables: &V, functions: &F) -> Result<f64, EvalError>
    where
        V: VariableResolver + ?Sized,
        F: FunctionResolver + ?Sized,
    {
        let mut stack = [0.0_f64; MAX_STACK_DEPTH];
        let mut sp = 0usize;

        for op in &self.ops {
            match *op {
                Op::Const(value) => {
                    stack[sp] = value;
                    sp += 1;
                }
                Op::Var(symbol) => {
                    let name = &self.variables[symbol as usize];
                    stack[sp] = variables
                        .resolve(name)
                        .ok_or(EvalError::UnresolvedVariable { symbol })?;
                    sp += 1;
                }
                Op::Unary(op) => {
                    let a = stack[sp - 1];
                    stack[sp - 1] = match op {
                        UnaryOp::Neg => -a,
                        UnaryOp::Not => truth(a == 0.0),
                    };
                }
                Op::Binary(op) => {
                    sp -= 1;
                    stack[sp - 1] = op.apply(stack[sp - 1], stack[sp]);
                }
                Op::Builtin(builtin) => {
                    let base = sp - builtin.arity();
                    stack[base] = builtin.apply(&stack[base..sp]);
                    sp = base + 1;
                }
                Op::Call { symbol, argc } => {
                    let base = sp - usize::from(argc);
                    let name = &self.functions[symbol as usize];
                    stack[base] = functions
                        .call(name, &stack[base..sp])
                        .ok_or(EvalError::UnresolvedFunction { symbol, argc })?;
                    sp = base + 1;
                }
            }
        }

        debug_assert_eq!(sp, 1, "compiled program must leave exactly one value");
        Ok(stack[0])
    }
}

#[derive(Default)]
struct Compiler {
    ops: Vec<Op>,
    variables: Vec<Box<str>>,
    functions: Vec<Box<str>>,
    depth: usize,
    max_depth: usize,
}

impl Compiler {
    fn emit(&mut self, node: &Node) -> Result<(), ParseError> {
        match node {
            Node::Number(value) => self.push(Op::Const(*value))?,
            Node::Ident(name) => match builtins::constant(name) {
                Some(value) => self.push(Op::Const(value))?,
                None => {
                    let symbol = intern(&mut self.variables, name);
                    self.push(Op::Var(symbol))?;
                }
            },
            Node::Unary(op, operand) => {
                self.emit(operand)?;
                self.ops.push(Op::Unary(*op));
            }
            Node::Binary(op, lhs, rhs) => {
                self.emit(lhs)?;
                self.emit(rhs)?;
                self.ops.push(Op::Binary(*op));
                self.depth -= 1;
            }
            Node::Call { name, args } => {
                if args.len() > MAX_CALL_ARGS {
                    return Err(ParseError::WrongArity {
                        name: name.clone(),
                        expected: MAX_CALL_ARGS,
                        found: args.len(),
                    });
                }
                let builtin = Builtin::lookup(name);
                if let Some(b) = builtin
                    && b.arity() != args.len()
                {
                    return Err(ParseError::WrongArity {
                        name: name.clone(),
                        expected: b.arity(),
                        found: args.len(),
                    });
                }
                for arg in args {
                    self.emit(arg)?;
                }
                let op = match builtin {
                    Some(b) => Op::Builtin(b),
                    None => Op::Call {
                        symbol: intern(&mut self.functions, name),
                        argc: args.len() as u8,
                    },
                };
                self.ops.push(op);
                // Arguments collapse into one result.
                self.depth = self.depth + 1 - args.len();
                if args.is_empty() {
                    self.bump()?;
                }
            }
        }
        Ok(())
    }

    fn push(&mut self, op: Op) -> Result<(), ParseError> {
        self.ops.push(op);
        self.depth += 1;
        self.bump()
    }

    fn bump(&mut self) -> Result<(), ParseError> {
        if self.depth > MAX_STACK_DEPTH {
            return Err(ParseError::TooDeep {
                max: MAX_STACK_DEPTH,
            });
        }
        self.max_depth = self.max_depth.max(self.depth);
        Ok(())
    }
}

fn intern(table: &mut Vec<Box<str>>, name: &str) -> u32 {
    if let Some(i) = table.iter().position(|n| &**n == name) {
        return i as u32;
    }
    table.push(name.into());
    (table.len() - 1) as u32
}
