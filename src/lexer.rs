use crate::ast::{Span, Token, TokenKind};

/// On-demand tokenizer.
///
/// `next_token` scans exactly one token, skipping whitespace, newlines, and
/// `#`-to-end-of-line comments. The lexer never aborts the process: an
/// unterminated string becomes a [`TokenKind::MalformedStr`] token and an
/// unrecognized character a [`LexError`], both carrying their span.
pub struct Lexer<'src> {
    source: &'src str,
    input: &'src [u8],
    position: usize,
    saw_newline: bool,
}

/// A recoverable lexical error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// A character with no role in the language.
    UnexpectedCharacter { ch: char, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedCharacter { span, .. } => *span,
        }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexError::UnexpectedCharacter { ch, span } => {
                write!(f, "Unexpected character '{}' at byte {}", ch, span.start)
            }
        }
    }
}

impl std::error::Error for LexError {}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'$' || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'$' || b == b'_'
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Lexer {
            source: input,
            input: input.as_bytes(),
            position: 0,
            saw_newline: false,
        }
    }

    /// The full source buffer this lexer scans.
    pub fn source(&self) -> &'src str {
        self.source
    }

    fn current_byte(&self) -> Option<u8> {
        self.input.get(self.position).copied()
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(b) = self.current_byte() {
            if b == b'\n' {
                self.saw_newline = true;
                self.advance();
            } else if b.is_ascii_whitespace() {
                self.advance();
            } else if b == b'#' {
                while let Some(b) = self.current_byte() {
                    if b == b'\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) {
        while let Some(b) = self.current_byte() {
            if is_ident_continue(b) {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) {
        let mut seen_dot = false;
        while let Some(b) = self.current_byte() {
            if b.is_ascii_digit() {
                self.advance();
            } else if b == b'.' && !seen_dot {
                seen_dot = true;
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Scans past the opening quote. A backslash escapes the following byte
    /// verbatim; the escape is kept raw in the source and resolved when the
    /// literal is decoded. Missing closing quote yields `MalformedStr`.
    fn read_string(&mut self, quote: u8) -> TokenKind {
        self.advance(); // opening quote
        while let Some(b) = self.current_byte() {
            if b == quote {
                self.advance();
                return TokenKind::Str;
            }
            if b == b'\\' {
                self.advance();
                if self.current_byte().is_none() {
                    break;
                }
            }
            self.advance();
        }
        TokenKind::MalformedStr
    }

    /// Scans and returns the next token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments();
        let newline_before = std::mem::take(&mut self.saw_newline);
        let start = self.position;

        let kind = match self.current_byte() {
            None => TokenKind::Eof,
            Some(b'(') => {
                self.advance();
                TokenKind::LParen
            }
            Some(b')') => {
                self.advance();
                TokenKind::RParen
            }
            Some(b'[') => {
                self.advance();
                TokenKind::LBracket
            }
            Some(b']') => {
                self.advance();
                TokenKind::RBracket
            }
            Some(b'{') => {
                self.advance();
                TokenKind::LBrace
            }
            Some(b'}') => {
                self.advance();
                TokenKind::RBrace
            }
            Some(b',') => {
                self.advance();
                TokenKind::Comma
            }
            Some(b'+') => {
                self.advance();
                TokenKind::Plus
            }
            Some(b'-') => {
                self.advance();
                TokenKind::Minus
            }
            Some(b'*') => {
                self.advance();
                TokenKind::Star
            }
            Some(b'/') => {
                self.advance();
                TokenKind::Slash
            }
            Some(b'%') => {
                self.advance();
                TokenKind::Percent
            }
            Some(b'=') => {
                self.advance();
                TokenKind::Eq
            }
            Some(b'<') => {
                if self.peek_byte(1) == Some(b'-') {
                    self.advance();
                    self.advance();
                    TokenKind::Assign
                } else if self.peek_byte(1) == Some(b'=') {
                    self.advance();
                    self.advance();
                    TokenKind::LtEq
                } else {
                    self.advance();
                    TokenKind::Lt
                }
            }
            Some(b'>') => {
                if self.peek_byte(1) == Some(b'=') {
                    self.advance();
                    self.advance();
                    TokenKind::GtEq
                } else {
                    self.advance();
                    TokenKind::Gt
                }
            }
            Some(b'!') if self.peek_byte(1) == Some(b'=') => {
                self.advance();
                self.advance();
                TokenKind::NotEq
            }
            Some(q @ (b'"' | b'\'')) => self.read_string(q),
            Some(b) if b.is_ascii_digit() => {
                self.read_number();
                TokenKind::Number
            }
            Some(b) if is_ident_start(b) => {
                self.read_identifier();
                let text = std::str::from_utf8(&self.input[start..self.position])
                    .unwrap_or_default();
                TokenKind::keyword(text).unwrap_or(TokenKind::Identifier)
            }
            Some(b) => {
                let span = Span::new(start, start + 1);
                // Report with the byte consumed so a retrying caller makes progress.
                self.advance();
                return Err(LexError::UnexpectedCharacter { ch: b as char, span });
            }
        };

        Ok(Token {
            kind,
            span: Span::new(start, self.position),
            newline_before,
        })
    }
}
