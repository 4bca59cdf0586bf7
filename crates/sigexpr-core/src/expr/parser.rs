//! Recursive descent parser producing an expression tree.
//!
//! ## Grammar
//!
//! ```text
//! expr    ::= or
//! or      ::= and ( '||' and )*
//! and     ::= cmp ( '&&' cmp )*
//! cmp     ::= sum ( ( '<' | '<=' | '>' | '>=' | '==' | '!=' ) sum )*
//! sum     ::= product ( ( '+' | '-' ) product )*
//! product ::= unary ( ( '*' | '/' | '%' ) unary )*
//! unary   ::= ( '-' | '+' | '!' ) unary | power
//! power   ::= primary ( '^' unary )?
//! primary ::= number | ident | ident '(' args? ')' | '(' expr ')'
//! args    ::= expr ( ',' expr )*
//! ```
//!
//! `^` is right-associative and binds tighter than unary minus, so `-2^2`
//! is `-(2^2)`.

use super::lexer::{Token, TokenKind, tokenize};
use crate::error::ParseError;

/// Maximum nesting of parentheses, calls, and unary chains.
pub const MAX_NESTING: usize = 64;

/// Maximum number of tree nodes in one expression.
///
/// Compiling and dropping a tree recurse once per level, and a flat chain
/// such as `1 + 1 + ...` is as deep as it is long, so the node count bounds
/// the stack those passes use.
pub const MAX_NODES: usize = 1024;

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Neg,
    /// Logical not: 1.0 when the operand is 0.0, else 0.0.
    Not,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%` (truncated remainder)
    Rem,
    /// `^`
    Pow,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinaryOp {
    /// Apply the operator. Comparisons and logic return 1.0 / 0.0.
    #[inline]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
            Self::Rem => a % b,
            Self::Pow => a.powf(b),
            Self::Lt => truth(a < b),
            Self::Le => truth(a <= b),
            Self::Gt => truth(a > b),
            Self::Ge => truth(a >= b),
            Self::Eq => truth(a == b),
            Self::Ne => truth(a != b),
            Self::And => truth(a != 0.0 && b != 0.0),
            Self::Or => truth(a != 0.0 || b != 0.0),
        }
    }
}

#[inline]
pub(crate) fn truth(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Numeric literal.
    Number(f64),
    /// Named identifier, resolved at compile or evaluation time.
    Ident(String),
    /// Unary operation.
    Unary(UnaryOp, Box<Node>),
    /// Binary operation.
    Binary(BinaryOp, Box<Node>, Box<Node>),
    /// Function call.
    Call {
        /// Function name.
        name: String,
        /// Argument expressions in call order.
        args: Vec<Node>,
    },
}

/// Parse expression text into a [`Node`] tree.
///
/// # Errors
///
/// Returns [`ParseError`] on empty input, lexical errors, misplaced tokens,
/// unbalanced parentheses, nesting beyond [`MAX_NESTING`], or more than
/// [`MAX_NODES`] nodes.
pub fn parse(src: &str) -> Result<Node, ParseError> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut parser = Parser {
        src,
        tokens: &tokens,
        pos: 0,
        depth: 0,
        nodes: 0,
    };
    let node = parser.parse_or()?;
    if let Some(tok) = parser.peek() {
        return Err(parser.unexpected(tok));
    }
    Ok(node)
}

struct Parser<'a> {
    src: &'a str,
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    nodes: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn unexpected(&self, tok: Token) -> ParseError {
        ParseError::UnexpectedToken {
            pos: tok.start,
            found: tok.text(self.src).to_string(),
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ParseError::TooDeep { max: MAX_NESTING });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Count one tree node against [`MAX_NODES`].
    fn node(&mut self) -> Result<(), ParseError> {
        self.nodes += 1;
        if self.nodes > MAX_NODES {
            return Err(ParseError::TooLarge { max: MAX_NODES });
        }
        Ok(())
    }

    /// Parse a left-associative chain of the operators `map` accepts.
    fn binary_chain(
        &mut self,
        operand: fn(&mut Self) -> Result<Node, ParseError>,
        map: fn(TokenKind) -> Option<BinaryOp>,
    ) -> Result<Node, ParseError> {
        let mut lhs = operand(self)?;
        while let Some(op) = self.peek_kind().and_then(map) {
            self.advance();
            self.node()?;
            let rhs = operand(self)?;
            lhs = Node::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_or(&mut self) -> Result<Node, ParseError> {
        self.binary_chain(Self::parse_and, |k| {
            (k == TokenKind::OrOr).then_some(BinaryOp::Or)
        })
    }

    fn parse_and(&mut self) -> Result<Node, ParseError> {
        self.binary_chain(Self::parse_cmp, |k| {
            (k == TokenKind::AndAnd).then_some(BinaryOp::And)
        })
    }

    fn parse_cmp(&mut self) -> Result<Node, ParseError> {
        self.binary_chain(Self::parse_sum, |k| match k {
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::Le => Some(BinaryOp::Le),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::Ge => Some(BinaryOp::Ge),
            TokenKind::EqEq => Some(BinaryOp::Eq),
            TokenKind::NotEq => Some(BinaryOp::Ne),
            _ => None,
        })
    }

    fn parse_sum(&mut self) -> Result<Node, ParseError> {
        self.binary_chain(Self::parse_product, |k| match k {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn parse_product(&mut self) -> Result<Node, ParseError> {
        self.binary_chain(Self::parse_unary, |k| match k {
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Percent => Some(BinaryOp::Rem),
            _ => None,
        })
    }

    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        let op = match self.peek_kind() {
            Some(TokenKind::Minus) => Some(UnaryOp::Neg),
            Some(TokenKind::Bang) => Some(UnaryOp::Not),
            Some(TokenKind::Plus) => None,
            _ => return self.parse_power(),
        };
        self.advance();
        if op.is_some() {
            self.node()?;
        }
        self.enter()?;
        let operand = self.parse_unary();
        self.leave();
        let operand = operand?;
        Ok(match op {
            Some(op) => Node::Unary(op, Box::new(operand)),
            None => operand,
        })
    }

    fn parse_power(&mut self) -> Result<Node, ParseError> {
        let base = self.parse_primary()?;
        if self.peek_kind() == Some(TokenKind::Caret) {
            self.advance();
            self.node()?;
            self.enter()?;
            let exponent = self.parse_unary();
            self.leave();
            return Ok(Node::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent?)));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let tok = self.advance().ok_or(ParseError::UnexpectedEnd)?;
        match tok.kind {
            TokenKind::Number(value) => {
                self.node()?;
                Ok(Node::Number(value))
            }
            TokenKind::Ident => {
                self.node()?;
                let name = tok.text(self.src).to_string();
                if self.peek_kind() == Some(TokenKind::LParen) {
                    let open = self.advance().map_or(tok.end, |t| t.start);
                    self.enter()?;
                    let args = self.parse_args(open);
                    self.leave();
                    return Ok(Node::Call { name, args: args? });
                }
                Ok(Node::Ident(name))
            }
            TokenKind::LParen => {
                self.enter()?;
                let inner = self.parse_or();
                self.leave();
                let inner = inner?;
                self.expect_close(tok.start)?;
                Ok(inner)
            }
            _ => Err(self.unexpected(tok)),
        }
    }

    /// Parse call arguments after the opening `(` at byte `open`.
    fn parse_args(&mut self, open: usize) -> Result<Vec<Node>, ParseError> {
        let mut args = Vec::new();
        if self.peek_kind() == Some(TokenKind::RParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_or()?);
            match self.peek_kind() {
                Some(TokenKind::Comma) => {
                    self.advance();
                }
                _ => break,
            }
        }
        self.expect_close(open)?;
        Ok(args)
    }

    fn expect_close(&mut self, open: usize) -> Result<(), ParseError> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::RParen => {
                self.advance();
                Ok(())
            }
            Some(t) => Err(self.unexpected(t)),
            None => Err(ParseError::UnclosedParen { pos: open }),
        }
    }
}
