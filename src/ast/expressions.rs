use crate::ast::{BinOp, Span, UnaryOp};

/// An expression node: a tagged variant plus the span covering its full text.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// Expression variants.
///
/// Number and string literals carry no decoded payload; the value is
/// recovered from the expression's span text at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Number literal, e.g. `42` or `3.14`. Decoded lazily from the span.
    Number,

    /// String literal. The span covers the quotes; the content between them
    /// is decoded lazily (backslash escapes kept verbatim).
    Str,

    /// Boolean literal `TRUE` / `FALSE`.
    Boolean(bool),

    /// Variable, procedure, or builtin reference.
    Identifier(String),

    /// Array literal, e.g. `[1, 2, 3]`. Elements evaluate left-to-right
    /// into a new owned array.
    Array(Vec<Expr>),

    /// Prefix operation: `-x`, `+x`, `NOT x`.
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Binary operation.
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Call, e.g. `add(2, 3)` or `DISPLAY(x)`. The callee is always a plain
    /// name resolved in the environment at call time.
    Call {
        name: String,
        name_span: Span,
        args: Vec<Expr>,
    },
}
