pub mod ast;
pub mod cli;
pub mod evaluator;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod value;

pub use ast::{
    BinOp, Block, Expr, ExprKind, IfArm, Procedure, Program, Span, Stmt, StmtKind, Token,
    TokenKind, UnaryOp,
};
pub use evaluator::{DEFAULT_MAX_DEPTH, Evaluator, RuntimeError};
pub use lexer::{LexError, Lexer};
pub use output::format_value;
pub use parser::{ParseContext, ParseError, Parser};
pub use value::{Builtin, Value};
