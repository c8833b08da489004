//! # Pseudo Language - Abstract Syntax Tree
//!
//! This module defines the token set and Abstract Syntax Tree (AST) for
//! pseudo-lang, a small teaching pseudocode language with variables,
//! arithmetic, booleans, strings, arrays, procedures, conditionals, and two
//! loop forms.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[span]** - Byte-offset ranges into the source buffer
//! - **[tokens]** - Lexical tokens produced by the lexer, with binding powers
//! - **[operators]** - Binary and unary operators
//! - **[expressions]** - Expression nodes (literals, calls, operations)
//! - **[statements]** - Statement nodes (assignment, procedures, loops)
//! - **[program]** - A complete parsed program
//!
//! ## Quick Start
//!
//! ```text
//! age <- 23
//! DISPLAY("You are", age, "years old.")
//! ```
//!
//! ## Core Concepts
//!
//! ### Source spans
//!
//! Every token, expression, and statement carries a [`Span`] into the
//! original source buffer. Literal expressions carry *only* their span; the
//! number or string payload is decoded from the source text at evaluation
//! time.
//!
//! ### Statements
//!
//! A program is a sequence of statements:
//!
//! ```text
//! x <- 1                                  # assignment
//! DISPLAY(x)                              # call statement
//! PROCEDURE double(n) { RETURN n * 2 }    # procedure definition
//! IF (x > 0) { ... } ELSE { ... }         # conditional
//! REPEAT 3 TIMES { ... }                  # counted loop
//! REPEAT UNTIL (done = TRUE) { ... }      # conditional loop
//! ```
//!
//! ### Expressions
//!
//! Expressions cover arithmetic (`+ - * / MOD`), comparison
//! (`= != < > <= >=`), short-circuit logic (`AND`, `OR`, `NOT`), unary
//! `+`/`-`, array literals, and calls. Same-precedence binary operators
//! associate right-to-left; see [`parser`](crate::parser) for the grammar.
pub mod span;
pub mod tokens;
pub mod operators;
pub mod expressions;
pub mod statements;
pub mod program;

pub use span::Span;
pub use tokens::{Token, TokenKind};
pub use operators::{BinOp, UnaryOp};
pub use expressions::{Expr, ExprKind};
pub use statements::{Block, IfArm, Procedure, Stmt, StmtKind};
pub use program::Program;
