//! Resin lexer: converts source text into tokens.
//!
//! Recognition works in decreasing precedence: numeric literals, then the
//! reserved-word table, then identifiers. The identifier alphabet is
//! `[0-9A-Z_a-z]` and permits a leading digit, so literals are told apart
//! from digit-led identifiers purely by whether the whole candidate decodes
//! as a number.

use resin_syntax::error::{Error, Result};
use resin_syntax::token::{Token, TokenKind};

/// Reserved words, scanned front to back. Words that are prefixes of other
/// words must come later in the table.
const KEYWORDS: [(&str, TokenKind); 13] = [
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("defun", TokenKind::Defun),
    ("let", TokenKind::Let),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("ifzero", TokenKind::IfZero),
    ("ifneg", TokenKind::IfNeg),
    ("print", TokenKind::Print),
    ("readi32", TokenKind::ReadI32),
    ("readf32", TokenKind::ReadF32),
];

fn is_separator(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Byte scanner over a source buffer, producing tokens with 0-based
/// row/column positions.
pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    row: u32,
    col: u32,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer over the given source text.
    pub fn new(input: &'a str) -> Self {
        Self {
            src: input.as_bytes(),
            pos: 0,
            row: 0,
            col: 0,
        }
    }

    /// Scan a numeric literal at the current position: an optional sign, an
    /// optional `0x`/`0X` prefix, hex-or-decimal digits and at most one
    /// decimal point. The candidate is a literal only if it sits on a word
    /// boundary and the whole lexeme decodes.
    fn scan_literal(&self) -> Option<(usize, TokenKind)> {
        let s = &self.src[self.pos..];
        let mut i = 0;
        let negative = match s.first() {
            Some(b'-') => {
                i += 1;
                true
            }
            Some(b'+') => {
                i += 1;
                false
            }
            _ => false,
        };
        let signed = i == 1;
        let mut hex = false;
        if s[i..].starts_with(b"0x") || s[i..].starts_with(b"0X") {
            i += 2;
            hex = true;
        }
        while i < s.len() && s[i].is_ascii_hexdigit() {
            i += 1;
        }
        if i < s.len() && s[i] == b'.' {
            i += 1;
            while i < s.len() && s[i].is_ascii_hexdigit() {
                i += 1;
            }
        }
        if i == 0 {
            return None;
        }
        // a second sign or decimal point voids the literal; so does an
        // identifier character on both sides of the boundary
        match s.get(i) {
            Some(b'+') | Some(b'-') | Some(b'.') => return None,
            next => {
                let next_ident = next.is_some_and(|&b| is_ident_byte(b));
                if is_ident_byte(s[i - 1]) && next_ident {
                    return None;
                }
            }
        }
        let text = std::str::from_utf8(&s[..i]).ok()?;
        if hex {
            // decode by absolute value, then apply the stored sign
            let body = &text[if signed { 3 } else { 2 }..];
            if !body.contains('.') {
                if let Ok(v) = u32::from_str_radix(body, 16) {
                    let v = v as i32;
                    return Some((i, TokenKind::LitI32(if negative { v.wrapping_neg() } else { v })));
                }
            }
        } else if let Ok(v) = text.parse::<i32>() {
            return Some((i, TokenKind::LitI32(v)));
        }
        if let Ok(v) = text.parse::<f32>() {
            return Some((i, TokenKind::LitF32(v)));
        }
        None
    }

    /// Scan a reserved word at the current position. A word that ends in an
    /// identifier character must not be followed by another one, so that
    /// e.g. `print1` lexes as an identifier.
    fn scan_keyword(&self) -> Option<(usize, TokenKind)> {
        let s = &self.src[self.pos..];
        for (word, kind) in KEYWORDS.iter() {
            let w = word.as_bytes();
            if s.starts_with(w) {
                let wordlike = is_ident_byte(w[w.len() - 1]);
                let next_ident = s.get(w.len()).is_some_and(|&b| is_ident_byte(b));
                if !wordlike || !next_ident {
                    return Some((w.len(), kind.clone()));
                }
            }
        }
        None
    }

    /// Scan a maximal identifier run at the current position.
    fn scan_ident(&self) -> Option<(usize, TokenKind)> {
        let s = &self.src[self.pos..];
        let n = s.iter().take_while(|&&b| is_ident_byte(b)).count();
        if n == 0 {
            return None;
        }
        let text = std::str::from_utf8(&s[..n]).ok()?;
        Some((n, TokenKind::Ident(text.to_string())))
    }

    /// Tokenize the entire input. Separators are discarded; a newline
    /// advances the row counter and resets the column.
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while self.pos < self.src.len() {
            let b = self.src[self.pos];
            if is_separator(b) {
                if b == b'\n' {
                    self.row += 1;
                    self.col = 0;
                } else {
                    self.col += 1;
                }
                self.pos += 1;
                continue;
            }
            let (len, kind) = self
                .scan_literal()
                .or_else(|| self.scan_keyword())
                .or_else(|| self.scan_ident())
                .ok_or_else(|| Error::with_span("syntax error", self.row, self.col))?;
            tokens.push(Token {
                kind,
                offset: self.pos,
                len,
                row: self.row,
                col: self.col,
            });
            self.pos += len;
            self.col += len as u32;
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .expect("lexing should succeed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_keywords_and_parens() {
        assert_eq!(
            kinds("(defun let + - * / ifzero ifneg print readi32 readf32)"),
            vec![
                TokenKind::LParen,
                TokenKind::Defun,
                TokenKind::Let,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::IfZero,
                TokenKind::IfNeg,
                TokenKind::Print,
                TokenKind::ReadI32,
                TokenKind::ReadF32,
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn lexes_integer_literals() {
        assert_eq!(kinds("42"), vec![TokenKind::LitI32(42)]);
        assert_eq!(kinds("+42"), vec![TokenKind::LitI32(42)]);
        assert_eq!(kinds("-7"), vec![TokenKind::LitI32(-7)]);
        assert_eq!(kinds("0"), vec![TokenKind::LitI32(0)]);
    }

    #[test]
    fn lexes_hex_literals() {
        assert_eq!(kinds("0x10"), vec![TokenKind::LitI32(16)]);
        assert_eq!(kinds("0XFF"), vec![TokenKind::LitI32(255)]);
        assert_eq!(kinds("-0x10"), vec![TokenKind::LitI32(-16)]);
        assert_eq!(kinds("0xffffffff"), vec![TokenKind::LitI32(-1)]);
    }

    #[test]
    fn lexes_float_literals() {
        assert_eq!(kinds("1.5"), vec![TokenKind::LitF32(1.5)]);
        assert_eq!(kinds("-2.25"), vec![TokenKind::LitF32(-2.25)]);
        assert_eq!(kinds("3."), vec![TokenKind::LitF32(3.0)]);
        assert_eq!(kinds(".5"), vec![TokenKind::LitF32(0.5)]);
    }

    #[test]
    fn keyword_prefixed_identifiers() {
        assert_eq!(kinds("print1"), vec![TokenKind::Ident("print1".into())]);
        assert_eq!(kinds("letter"), vec![TokenKind::Ident("letter".into())]);
        assert_eq!(kinds("defunct"), vec![TokenKind::Ident("defunct".into())]);
    }

    #[test]
    fn digit_led_identifiers() {
        // digits are identifier characters; these fail numeric decoding
        assert_eq!(kinds("12ab"), vec![TokenKind::Ident("12ab".into())]);
        assert_eq!(kinds("3x"), vec![TokenKind::Ident("3x".into())]);
        assert_eq!(kinds("0x"), vec![TokenKind::Ident("0x".into())]);
    }

    #[test]
    fn sign_is_an_operator_when_not_glued_to_digits() {
        assert_eq!(
            kinds("(+ 1 2)"),
            vec![
                TokenKind::LParen,
                TokenKind::Plus,
                TokenKind::LitI32(1),
                TokenKind::LitI32(2),
                TokenKind::RParen,
            ]
        );
        // glued sign belongs to the literal
        assert_eq!(
            kinds("(- -1)"),
            vec![
                TokenKind::LParen,
                TokenKind::Minus,
                TokenKind::LitI32(-1),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn tracks_rows_and_columns() {
        let tokens = Lexer::new("(let\n  (x 1))").tokenize().unwrap();
        let positions: Vec<(u32, u32)> = tokens.iter().map(|t| (t.row, t.col)).collect();
        assert_eq!(
            positions,
            vec![(0, 0), (0, 1), (1, 2), (1, 3), (1, 5), (1, 6), (1, 7)]
        );
    }

    #[test]
    fn rejects_unknown_bytes() {
        let err = Lexer::new("(print @)").tokenize().unwrap_err();
        assert_eq!(err.msg, "syntax error");
        assert_eq!((err.row, err.col), (Some(0), Some(7)));
    }
}
