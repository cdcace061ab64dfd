//! Lexer for GraphQL documents.

use crate::token::{Token, TokenKind};
use gqlapi_core::{Interner, Span, Text};

/// A lexer over GraphQL source text.
///
/// Whitespace, commas, comments and a leading byte-order mark are ignored,
/// as the GraphQL grammar treats them all as insignificant.
pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: u32,
    interner: &'a Interner,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer.
    pub fn new(source: &'a str, interner: &'a Interner) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            interner,
        }
    }

    /// Returns the current position.
    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos as usize).copied()
    }

    #[inline]
    fn peek_at(&self, offset: u32) -> Option<u8> {
        self.bytes.get((self.pos + offset) as usize).copied()
    }

    #[inline]
    fn advance(&mut self) {
        self.pos += 1;
    }

    #[inline]
    fn advance_by(&mut self, n: u32) {
        self.pos += n;
    }

    /// Scans the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();

        let start = self.pos;

        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, Span::empty(start));
        };

        let kind = match c {
            b'{' => self.single(TokenKind::LBrace),
            b'}' => self.single(TokenKind::RBrace),
            b'(' => self.single(TokenKind::LParen),
            b')' => self.single(TokenKind::RParen),
            b'[' => self.single(TokenKind::LBracket),
            b']' => self.single(TokenKind::RBracket),
            b':' => self.single(TokenKind::Colon),
            b'=' => self.single(TokenKind::Eq),
            b'|' => self.single(TokenKind::Pipe),
            b'&' => self.single(TokenKind::Amp),
            b'@' => self.single(TokenKind::At),
            b'!' => self.single(TokenKind::Bang),
            b'$' => self.single(TokenKind::Dollar),
            b'.' => {
                if self.peek_at(1) == Some(b'.') && self.peek_at(2) == Some(b'.') {
                    self.advance_by(3);
                    TokenKind::Spread
                } else {
                    self.single(TokenKind::Error)
                }
            }
            b'"' => self.scan_string(),
            b'-' | b'0'..=b'9' => self.scan_number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_name(),
            _ => {
                // Skip the whole UTF-8 sequence so spans stay on char boundaries.
                #[allow(clippy::cast_possible_truncation)]
                let width = self.source[self.pos as usize..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8) as u32;
                self.advance_by(width);
                TokenKind::Error
            }
        };

        Token::new(kind, Span::new(start, self.pos))
    }

    #[inline]
    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n' | b',') => {
                    self.advance();
                }
                Some(b'#') => {
                    let rest = &self.bytes[self.pos as usize..];
                    #[allow(clippy::cast_possible_truncation)]
                    let skip = memchr::memchr(b'\n', rest).unwrap_or(rest.len()) as u32;
                    self.advance_by(skip);
                }
                Some(0xEF) if self.peek_at(1) == Some(0xBB) && self.peek_at(2) == Some(0xBF) => {
                    self.advance_by(3);
                }
                _ => break,
            }
        }
    }

    fn scan_name(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        TokenKind::from_keyword(self.span_text(Span::new(start, self.pos)))
            .unwrap_or(TokenKind::Ident)
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn scan_number(&mut self) -> TokenKind {
        let mut is_float = false;

        if self.peek() == Some(b'-') {
            self.advance();
        }
        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return TokenKind::Error;
        }
        self.skip_digits();

        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            self.skip_digits();
        }

        if let Some(b'e' | b'E') = self.peek() {
            is_float = true;
            self.advance();
            if let Some(b'+' | b'-') = self.peek() {
                self.advance();
            }
            self.skip_digits();
        }

        if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntLiteral
        }
    }

    fn scan_string(&mut self) -> TokenKind {
        self.advance();

        if self.peek() == Some(b'"') && self.peek_at(1) == Some(b'"') {
            self.advance_by(2);
            return self.scan_block_string();
        }

        loop {
            match self.peek() {
                None | Some(b'\n') => return TokenKind::Error,
                Some(b'"') => {
                    self.advance();
                    return TokenKind::StringLiteral;
                }
                Some(b'\\') => self.advance_by(2),
                _ => self.advance(),
            }
        }
    }

    fn scan_block_string(&mut self) -> TokenKind {
        loop {
            match self.peek() {
                None => return TokenKind::Error,
                Some(b'"') if self.peek_at(1) == Some(b'"') && self.peek_at(2) == Some(b'"') => {
                    self.advance_by(3);
                    return TokenKind::BlockStringLiteral;
                }
                Some(b'\\')
                    if self.peek_at(1) == Some(b'"')
                        && self.peek_at(2) == Some(b'"')
                        && self.peek_at(3) == Some(b'"') =>
                {
                    self.advance_by(4);
                }
                _ => self.advance(),
            }
        }
    }

    /// Interns the text at the given span.
    pub fn intern_span(&self, span: Span) -> Text {
        self.interner.intern(self.span_text(span))
    }

    /// Gets the text at the given span.
    pub fn span_text(&self, span: Span) -> &'a str {
        span.slice(self.source)
    }
}

/// Tokenizes the entire source.
pub fn tokenize(source: &str, interner: &Interner) -> Vec<Token> {
    let mut lexer = Lexer::new(source, interner);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token();
        let is_eof = token.is_eof();
        tokens.push(token);
        if is_eof {
            break;
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let interner = Interner::new();
        tokenize(source, &interner).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("{ } ( ) [ ] : ... = | & @ ! $"),
            vec![
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Colon,
                TokenKind::Spread,
                TokenKind::Eq,
                TokenKind::Pipe,
                TokenKind::Amp,
                TokenKind::At,
                TokenKind::Bang,
                TokenKind::Dollar,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_commas_and_comments_are_insignificant() {
        assert_eq!(
            kinds("a, b # trailing comment\n, c"),
            vec![
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_operation_keywords() {
        assert_eq!(
            kinds("query mutation subscription fragment on profile"),
            vec![
                TokenKind::Query,
                TokenKind::Mutation,
                TokenKind::Subscription,
                TokenKind::Fragment,
                TokenKind::On,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 -17 3.14 1e10 2.5e-3"),
            vec![
                TokenKind::IntLiteral,
                TokenKind::IntLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            kinds(r#""hello" """block "string" """ "unterminated"#),
            vec![
                TokenKind::StringLiteral,
                TokenKind::BlockStringLiteral,
                TokenKind::Error,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_non_ascii_is_one_error_token() {
        let interner = Interner::new();
        let tokens = tokenize("é a", &interner);
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].span, Span::new(0, 2));
        assert_eq!(tokens[1].kind, TokenKind::Ident);
    }
}
