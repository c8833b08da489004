use crate::ast::{Expr, Span};

/// A statement node: a tagged variant plus the span covering its full text.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

/// Statement variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Assignment: `name <- expr`.
    Assign {
        name: String,
        name_span: Span,
        value: Expr,
    },

    /// Expression statement. The grammar only admits calls here; the result
    /// is discarded.
    Expr(Expr),

    /// Procedure definition. Only valid at the top level.
    Procedure(Procedure),

    /// `RETURN expr`. Only valid inside a procedure body; unwinds to the
    /// nearest enclosing call as its result.
    Return(Expr),

    /// `IF (cond) { .. } ELSE IF (cond) { .. } ELSE { .. }`.
    ///
    /// `arms` holds the primary condition and every `ELSE IF` in order;
    /// exactly one arm (or the `ELSE` block, or nothing) executes.
    If {
        arms: Vec<IfArm>,
        else_body: Option<Block>,
    },

    /// `REPEAT count TIMES { .. }`. The count is evaluated once, before the
    /// first iteration.
    RepeatTimes { count: Expr, body: Block },

    /// `REPEAT UNTIL (cond) { .. }`. The condition is evaluated before each
    /// iteration, so zero iterations are possible.
    RepeatUntil { condition: Expr, body: Block },
}

/// One `IF` / `ELSE IF` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct IfArm {
    pub condition: Expr,
    pub body: Block,
}

/// A braced scope: a sequence of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// A procedure definition.
///
/// Runtime procedure values reference this node directly; two procedure
/// values compare equal only if they reference the same definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    pub name: String,
    pub name_span: Span,
    pub params: Vec<String>,
    pub body: Block,
}
