use crate::ast::Span;

/// A single lexical token: a closed tag plus the source span it covers.
///
/// `newline_before` records whether at least one newline was skipped
/// immediately before this token. It is tracked for future
/// statement-separation use and is not consulted by the current grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub newline_before: bool,
}

/// The closed set of token tags.
///
/// Literal tokens carry no decoded payload; the number or string text is
/// recovered from the token's span when needed. Keywords are recognized in
/// exactly two spellings each (all-uppercase and all-lowercase); any
/// mixed-case spelling lexes as a plain [`TokenKind::Identifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    /// Number literal: a digit sequence with at most one decimal point.
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// ```
    Number,

    /// String literal in single or double quotes.
    ///
    /// A backslash escapes the following character verbatim; no escape
    /// sequences are interpreted.
    Str,

    /// A string literal whose closing quote was never found.
    ///
    /// Produced instead of aborting the scan so the parser can report a
    /// proper diagnostic.
    MalformedStr,

    /// `TRUE` / `true`
    True,
    /// `FALSE` / `false`
    False,

    /// Variable, procedure, or builtin name.
    ///
    /// ASCII letters, digits, `$`, and `_`, not starting with a digit.
    Identifier,

    // Keywords
    /// `PROCEDURE` / `procedure`
    Procedure,
    /// `RETURN` / `return`
    Return,
    /// `REPEAT` / `repeat`
    Repeat,
    /// `TIMES` / `times`
    Times,
    /// `UNTIL` / `until`
    Until,
    /// `IF` / `if`
    If,
    /// `ELSE` / `else`
    Else,
    /// `AND` / `and` - short-circuit logical and
    And,
    /// `OR` / `or` - short-circuit logical or
    Or,
    /// `NOT` / `not` - logical negation
    Not,
    /// `FOR` / `for` - reserved, no statement production yet
    For,
    /// `EACH` / `each` - reserved, no statement production yet
    Each,
    /// `IN` / `in` - reserved, no statement production yet
    In,

    // Operators
    /// `<-` assignment arrow
    Assign,
    /// `=` equality (single `=`; there is no `==` in this language)
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%` or keyword `MOD` / `mod` (one token, floored modulo)
    Percent,

    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Left binding power for the Pratt expression parser.
    ///
    /// Returns `0` (the "not an operator" sentinel) for every token that
    /// cannot appear in infix position.
    pub fn lbp(self) -> u8 {
        match self {
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 5,
            TokenKind::Plus | TokenKind::Minus => 4,
            TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::LtEq
            | TokenKind::GtEq => 3,
            TokenKind::And => 2,
            TokenKind::Or => 1,
            _ => 0,
        }
    }

    /// Human-readable description used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Number => "a number",
            TokenKind::Str => "a string",
            TokenKind::MalformedStr => "an unterminated string",
            TokenKind::True => "'TRUE'",
            TokenKind::False => "'FALSE'",
            TokenKind::Identifier => "an identifier",
            TokenKind::Procedure => "'PROCEDURE'",
            TokenKind::Return => "'RETURN'",
            TokenKind::Repeat => "'REPEAT'",
            TokenKind::Times => "'TIMES'",
            TokenKind::Until => "'UNTIL'",
            TokenKind::If => "'IF'",
            TokenKind::Else => "'ELSE'",
            TokenKind::And => "'AND'",
            TokenKind::Or => "'OR'",
            TokenKind::Not => "'NOT'",
            TokenKind::For => "'FOR'",
            TokenKind::Each => "'EACH'",
            TokenKind::In => "'IN'",
            TokenKind::Assign => "'<-'",
            TokenKind::Eq => "'='",
            TokenKind::NotEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::Eof => "end of input",
        }
    }

    /// Keyword lookup: maps exactly the all-uppercase and all-lowercase
    /// spelling of each keyword. Mixed-case spellings are not keywords and
    /// fall through as identifiers.
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        let kind = match ident {
            "TRUE" | "true" => TokenKind::True,
            "FALSE" | "false" => TokenKind::False,
            "FOR" | "for" => TokenKind::For,
            "EACH" | "each" => TokenKind::Each,
            "IN" | "in" => TokenKind::In,
            "PROCEDURE" | "procedure" => TokenKind::Procedure,
            "RETURN" | "return" => TokenKind::Return,
            "REPEAT" | "repeat" => TokenKind::Repeat,
            "TIMES" | "times" => TokenKind::Times,
            "UNTIL" | "until" => TokenKind::Until,
            "IF" | "if" => TokenKind::If,
            "ELSE" | "else" => TokenKind::Else,
            "MOD" | "mod" => TokenKind::Percent,
            "AND" | "and" => TokenKind::And,
            "NOT" | "not" => TokenKind::Not,
            "OR" | "or" => TokenKind::Or,
            _ => return None,
        };
        Some(kind)
    }
}
