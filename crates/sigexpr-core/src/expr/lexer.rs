//! Tokenizer for expression text.

use crate::error::ParseError;

/// Lexical token kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    /// Numeric literal.
    Number(f64),
    /// Identifier: `[A-Za-z_][A-Za-z0-9_]*`.
    Ident,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `^`
    Caret,
    /// `!`
    Bang,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
}

/// A token with its byte span in the source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Token {
    /// Source text covered by this token.
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }
}

/// Split `src` into tokens.
///
/// Whitespace separates tokens and is otherwise ignored. All structural
/// characters are ASCII, so byte positions are valid char boundaries for
/// every token produced.
pub fn tokenize(src: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];

        if b.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;

        if b.is_ascii_digit() || (b == b'.' && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit))
        {
            pos = scan_number(bytes, pos);
            let text = &src[start..pos];
            let value: f64 = text.parse().map_err(|_| ParseError::InvalidNumber {
                pos: start,
                text: text.to_string(),
            })?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                start,
                end: pos,
            });
            continue;
        }

        if b.is_ascii_alphabetic() || b == b'_' {
            while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
                pos += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident,
                start,
                end: pos,
            });
            continue;
        }

        let next = bytes.get(pos + 1).copied();
        let (kind, width) = match (b, next) {
            (b'<', Some(b'=')) => (TokenKind::Le, 2),
            (b'>', Some(b'=')) => (TokenKind::Ge, 2),
            (b'=', Some(b'=')) => (TokenKind::EqEq, 2),
            (b'!', Some(b'=')) => (TokenKind::NotEq, 2),
            (b'&', Some(b'&')) => (TokenKind::AndAnd, 2),
            (b'|', Some(b'|')) => (TokenKind::OrOr, 2),
            (b'(', _) => (TokenKind::LParen, 1),
            (b')', _) => (TokenKind::RParen, 1),
            (b',', _) => (TokenKind::Comma, 1),
            (b'+', _) => (TokenKind::Plus, 1),
            (b'-', _) => (TokenKind::Minus, 1),
            (b'*', _) => (TokenKind::Star, 1),
            (b'/', _) => (TokenKind::Slash, 1),
            (b'%', _) => (TokenKind::Percent, 1),
            (b'^', _) => (TokenKind::Caret, 1),
            (b'!', _) => (TokenKind::Bang, 1),
            (b'<', _) => (TokenKind::Lt, 1),
            (b'>', _) => (TokenKind::Gt, 1),
            _ => {
                let ch = src[start..].chars().next().unwrap_or('\u{fffd}');
                return Err(ParseError::UnexpectedChar { pos: start, ch });
            }
        };
        pos += width;
        tokens.push(Token {
            kind,
            start,
            end: pos,
        });
    }

    Ok(tokens)
}

/// Advance over `digits [. digits] [(e|E) [+|-] digits]`.
///
/// The exponent is only consumed when at least one digit follows it, so
/// `2e` lexes as the number `2` followed by the identifier `e`.
fn scan_number(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            pos = exp;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn numbers_and_operators() {
        assert_eq!(
            kinds("1 + 2.5*3e2"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Plus,
                TokenKind::Number(2.5),
                TokenKind::Star,
                TokenKind::Number(300.0),
            ]
        );
    }

    #[test]
    fn leading_dot_number() {
        assert_eq!(kinds(".5"), vec![TokenKind::Number(0.5)]);
    }

    #[test]
    fn dangling_exponent_is_identifier() {
        assert_eq!(kinds("2e"), vec![TokenKind::Number(2.0), TokenKind::Ident]);
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(
            kinds("<= >= == != && || < > !"),
            vec![
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Bang,
            ]
        );
    }

    #[test]
    fn identifier_spans() {
        let src = " v0+ sin_2 ";
        let tokens = tokenize(src).unwrap();
        assert_eq!(tokens[0].text(src), "v0");
        assert_eq!(tokens[2].text(src), "sin_2");
    }

    #[test]
    fn rejects_unknown_character() {
        let err = tokenize("v0 # 1").unwrap_err();
        assert_eq!(err, ParseError::UnexpectedChar { pos: 3, ch: '#' });
    }

    #[test]
    fn single_ampersand_is_error() {
        assert!(matches!(
            tokenize("1 & 2"),
            Err(ParseError::UnexpectedChar { ch: '&', .. })
        ));
    }
}
