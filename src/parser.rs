use crate::{
    ast::{
        BinOp, Block, Expr, ExprKind, IfArm, Procedure, Program, Span, Stmt, StmtKind, Token,
        TokenKind, UnaryOp,
    },
    lexer::{LexError, Lexer},
};

/// Pratt expression parser plus recursive-descent statement grammar.
///
/// Tokens are pulled from the lexer on demand; there is no separate
/// tokenization pass. Parsing is fail-fast: the first diagnostic aborts the
/// parse and is returned to the caller (and recorded in [`Parser::diagnostics`],
/// whose list form leaves room for multi-error recovery later).
///
/// # Associativity
///
/// The infix rule parses its right operand one binding power below its own,
/// so chains of equal-precedence operators associate right-to-left
/// (`10 - 3 - 2` parses as `10 - (3 - 2)`), while operators of differing
/// precedence nest by natural recursion depth (`1 + 2 * 3` is `1 + (2 * 3)`).
pub struct Parser<'src> {
    source: &'src str,
    lexer: Lexer<'src>,
    current: Token,
    /// Block nesting depth; procedure definitions are only legal at 0.
    depth: usize,
    in_procedure: bool,
    diagnostics: Vec<ParseError>,
}

/// A structured parse diagnostic: what went wrong, where, and (for token
/// mismatches) which grammar rule was being parsed at the time.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The grammar required one token and found another.
    UnexpectedToken {
        expected: &'static str,
        found: TokenKind,
        span: Span,
        context: Option<ParseContext>,
    },
    /// `RETURN` used outside a procedure body.
    ReturnOutsideProcedure { span: Span },
    /// `PROCEDURE` used anywhere but the top level.
    ProcedureNotTopLevel { span: Span },
    /// A string literal reached end of input before its closing quote.
    MalformedString { span: Span },
    /// Lexical error.
    Lex(LexError),
}

impl ParseError {
    /// The source range the diagnostic points at.
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::ReturnOutsideProcedure { span }
            | ParseError::ProcedureNotTopLevel { span }
            | ParseError::MalformedString { span } => *span,
            ParseError::Lex(e) => e.span(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::UnexpectedToken {
                expected,
                found,
                context,
                ..
            } => {
                write!(f, "Expected {}, found {}", expected, found.describe())?;
                if let Some(context) = context {
                    write!(f, " when parsing {}", context)?;
                }
                Ok(())
            }
            ParseError::ReturnOutsideProcedure { .. } => {
                write!(f, "'RETURN' is only allowed inside a procedure body")
            }
            ParseError::ProcedureNotTopLevel { .. } => {
                write!(f, "Procedure definitions are only allowed at the top level")
            }
            ParseError::MalformedString { .. } => {
                write!(f, "Unterminated string literal")
            }
            ParseError::Lex(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e)
    }
}

/// Names the grammar rule a token-mismatch diagnostic occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseContext {
    IfStatement,
    RepeatStatement,
    ProcedureDefinition,
    Assignment,
    ArgumentList,
    ArrayLiteral,
    Grouping,
    Block,
}

impl std::fmt::Display for ParseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ParseContext::IfStatement => "an if statement",
            ParseContext::RepeatStatement => "a repeat statement",
            ParseContext::ProcedureDefinition => "a procedure definition",
            ParseContext::Assignment => "an assignment",
            ParseContext::ArgumentList => "an argument list",
            ParseContext::ArrayLiteral => "an array literal",
            ParseContext::Grouping => "a parenthesized expression",
            ParseContext::Block => "a block",
        };
        write!(f, "{}", name)
    }
}

impl<'src> Parser<'src> {
    /// Primes the parser with the first token.
    pub fn new(mut lexer: Lexer<'src>) -> Result<Self, ParseError> {
        let source = lexer.source();
        let current = lexer.next_token()?;
        if current.kind == TokenKind::MalformedStr {
            return Err(ParseError::MalformedString { span: current.span });
        }
        Ok(Parser {
            source,
            lexer,
            current,
            depth: 0,
            in_procedure: false,
            diagnostics: Vec::new(),
        })
    }

    /// Diagnostics collected so far. Fail-fast parsing records at most one,
    /// but the list form is the stable interface.
    pub fn diagnostics(&self) -> &[ParseError] {
        &self.diagnostics
    }

    fn fail<T>(&mut self, err: ParseError) -> Result<T, ParseError> {
        self.diagnostics.push(err.clone());
        Err(err)
    }

    /// Consumes the current token and returns it, pulling the next one from
    /// the lexer. Lexical errors and unterminated strings surface here.
    fn bump(&mut self) -> Result<Token, ParseError> {
        let next = match self.lexer.next_token() {
            Ok(token) => token,
            Err(e) => return self.fail(ParseError::Lex(e)),
        };
        if next.kind == TokenKind::MalformedStr {
            return self.fail(ParseError::MalformedString { span: next.span });
        }
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn expect(&mut self, kind: TokenKind, context: ParseContext) -> Result<Token, ParseError> {
        if self.current.kind == kind {
            self.bump()
        } else {
            let err = ParseError::UnexpectedToken {
                expected: kind.describe(),
                found: self.current.kind,
                span: self.current.span,
                context: Some(context),
            };
            self.fail(err)
        }
    }

    fn text_of(&self, span: Span) -> String {
        span.slice(self.source).to_string()
    }

    /// Parses the whole top-level scope.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current.kind {
            TokenKind::Identifier => self.parse_call_or_assignment(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Procedure => self.parse_procedure(),
            TokenKind::If => self.parse_if(),
            TokenKind::Repeat => self.parse_repeat(),
            _ => {
                let err = ParseError::UnexpectedToken {
                    expected: "a statement",
                    found: self.current.kind,
                    span: self.current.span,
                    context: None,
                };
                self.fail(err)
            }
        }
    }

    /// `ident(args)` call statement, or `ident <- expr` assignment.
    fn parse_call_or_assignment(&mut self) -> Result<Stmt, ParseError> {
        let name_token = self.bump()?;
        let name = self.text_of(name_token.span);

        if self.check(TokenKind::LParen) {
            let call = self.parse_call(name, name_token.span)?;
            let span = call.span;
            return Ok(Stmt::new(StmtKind::Expr(call), span));
        }

        self.expect(TokenKind::Assign, ParseContext::Assignment)?;
        let value = self.parse_expression()?;
        let span = name_token.span.to(value.span);
        Ok(Stmt::new(
            StmtKind::Assign {
                name,
                name_span: name_token.span,
                value,
            },
            span,
        ))
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let ret_token = self.bump()?;
        if !self.in_procedure {
            return self.fail(ParseError::ReturnOutsideProcedure {
                span: ret_token.span,
            });
        }
        let value = self.parse_expression()?;
        let span = ret_token.span.to(value.span);
        Ok(Stmt::new(StmtKind::Return(value), span))
    }

    fn parse_procedure(&mut self) -> Result<Stmt, ParseError> {
        let proc_token = self.bump()?;
        if self.depth > 0 {
            return self.fail(ParseError::ProcedureNotTopLevel {
                span: proc_token.span,
            });
        }

        let name_token = self.expect(TokenKind::Identifier, ParseContext::ProcedureDefinition)?;
        let name = self.text_of(name_token.span);

        self.expect(TokenKind::LParen, ParseContext::ProcedureDefinition)?;
        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) {
            let param = self.expect(TokenKind::Identifier, ParseContext::ProcedureDefinition)?;
            params.push(self.text_of(param.span));
            if !self.check(TokenKind::RParen) {
                self.expect(TokenKind::Comma, ParseContext::ProcedureDefinition)?;
            }
        }
        self.expect(TokenKind::RParen, ParseContext::ProcedureDefinition)?;

        self.in_procedure = true;
        let body = self.parse_block(ParseContext::ProcedureDefinition);
        self.in_procedure = false;
        let body = body?;

        let span = proc_token.span.to(body.span);
        Ok(Stmt::new(
            StmtKind::Procedure(Procedure {
                name,
                name_span: name_token.span,
                params,
                body,
            }),
            span,
        ))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let if_token = self.bump()?;

        let mut arms = vec![self.parse_if_arm()?];
        let mut else_body = None;
        let mut end = arms[0].body.span;

        while self.check(TokenKind::Else) {
            self.bump()?;
            if self.check(TokenKind::If) {
                self.bump()?;
                let arm = self.parse_if_arm()?;
                end = arm.body.span;
                arms.push(arm);
            } else {
                let body = self.parse_block(ParseContext::IfStatement)?;
                end = body.span;
                else_body = Some(body);
                break;
            }
        }

        let span = if_token.span.to(end);
        Ok(Stmt::new(StmtKind::If { arms, else_body }, span))
    }

    /// `(cond) { scope }` - shared by `IF` and `ELSE IF`.
    fn parse_if_arm(&mut self) -> Result<IfArm, ParseError> {
        self.expect(TokenKind::LParen, ParseContext::IfStatement)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, ParseContext::IfStatement)?;
        let body = self.parse_block(ParseContext::IfStatement)?;
        Ok(IfArm { condition, body })
    }

    fn parse_repeat(&mut self) -> Result<Stmt, ParseError> {
        let repeat_token = self.bump()?;

        if self.check(TokenKind::Until) {
            self.bump()?;
            self.expect(TokenKind::LParen, ParseContext::RepeatStatement)?;
            let condition = self.parse_expression()?;
            self.expect(TokenKind::RParen, ParseContext::RepeatStatement)?;
            let body = self.parse_block(ParseContext::RepeatStatement)?;
            let span = repeat_token.span.to(body.span);
            return Ok(Stmt::new(StmtKind::RepeatUntil { condition, body }, span));
        }

        let count = self.parse_expression()?;
        self.expect(TokenKind::Times, ParseContext::RepeatStatement)?;
        let body = self.parse_block(ParseContext::RepeatStatement)?;
        let span = repeat_token.span.to(body.span);
        Ok(Stmt::new(StmtKind::RepeatTimes { count, body }, span))
    }

    /// `{ statement* }`. Only `}` terminates a block; end of input inside
    /// one is a diagnostic.
    fn parse_block(&mut self, context: ParseContext) -> Result<Block, ParseError> {
        let open = self.expect(TokenKind::LBrace, context)?;
        self.depth += 1;

        let mut statements = Vec::new();
        let result = loop {
            if self.check(TokenKind::RBrace) {
                break self.bump();
            }
            if self.check(TokenKind::Eof) {
                let err = ParseError::UnexpectedToken {
                    expected: "'}'",
                    found: TokenKind::Eof,
                    span: self.current.span,
                    context: Some(context),
                };
                break self.fail(err);
            }
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(e) => break Err(e),
            }
        };

        self.depth -= 1;
        let close = result?;
        Ok(Block {
            statements,
            span: open.span.to(close.span),
        })
    }

    /// Parses a full expression (lowest binding power).
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(0)
    }

    /// The Pratt loop. `min_bp` is the binding power the next infix operator
    /// must exceed; the right operand is parsed at `lbp - 1`, which makes
    /// equal-precedence chains fold to the right.
    fn parse_binary(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_prefix()?;

        while self.current.kind.lbp() > min_bp {
            let Some(op) = BinOp::from_token(self.current.kind) else {
                break;
            };
            let rbp = self.current.kind.lbp() - 1;
            self.bump()?;

            let right = self.parse_binary(rbp)?;
            let span = left.span.to(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    /// Prefix rule: literals, identifiers, calls, array literals, unary
    /// operators, and parenthesized sub-expressions.
    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        match self.current.kind {
            TokenKind::Number => {
                let token = self.bump()?;
                Ok(Expr::new(ExprKind::Number, token.span))
            }
            TokenKind::Str => {
                let token = self.bump()?;
                Ok(Expr::new(ExprKind::Str, token.span))
            }
            TokenKind::True => {
                let token = self.bump()?;
                Ok(Expr::new(ExprKind::Boolean(true), token.span))
            }
            TokenKind::False => {
                let token = self.bump()?;
                Ok(Expr::new(ExprKind::Boolean(false), token.span))
            }
            TokenKind::Identifier => {
                let token = self.bump()?;
                let name = self.text_of(token.span);
                if self.check(TokenKind::LParen) {
                    self.parse_call(name, token.span)
                } else {
                    Ok(Expr::new(ExprKind::Identifier(name), token.span))
                }
            }
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::Plus | TokenKind::Minus | TokenKind::Not => {
                let token = self.bump()?;
                let op = match token.kind {
                    TokenKind::Plus => UnaryOp::Plus,
                    TokenKind::Minus => UnaryOp::Negate,
                    _ => UnaryOp::Not,
                };
                // Unary operators bind tighter than any binary operator.
                let operand = self.parse_prefix()?;
                let span = token.span.to(operand.span);
                Ok(Expr::new(
                    ExprKind::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    span,
                ))
            }
            TokenKind::LParen => {
                self.bump()?;
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, ParseContext::Grouping)?;
                // Literal nodes decode their payload from their span text,
                // so the inner expression keeps its own span; widening it
                // over the parentheses would corrupt the decoded literal.
                Ok(inner)
            }
            _ => {
                let err = ParseError::UnexpectedToken {
                    expected: "an expression",
                    found: self.current.kind,
                    span: self.current.span,
                    context: None,
                };
                self.fail(err)
            }
        }
    }

    /// `name(arg, arg, ...)` with the callee name already consumed.
    fn parse_call(&mut self, name: String, name_span: Span) -> Result<Expr, ParseError> {
        self.expect(TokenKind::LParen, ParseContext::ArgumentList)?;

        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) {
            args.push(self.parse_expression()?);
            if !self.check(TokenKind::RParen) {
                self.expect(TokenKind::Comma, ParseContext::ArgumentList)?;
            }
        }
        let close = self.expect(TokenKind::RParen, ParseContext::ArgumentList)?;

        Ok(Expr::new(
            ExprKind::Call {
                name,
                name_span,
                args,
            },
            name_span.to(close.span),
        ))
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let open = self.bump()?;

        let mut elements = Vec::new();
        while !self.check(TokenKind::RBracket) {
            elements.push(self.parse_expression()?);
            if !self.check(TokenKind::RBracket) {
                self.expect(TokenKind::Comma, ParseContext::ArrayLiteral)?;
            }
        }
        let close = self.expect(TokenKind::RBracket, ParseContext::ArrayLiteral)?;

        Ok(Expr::new(
            ExprKind::Array(elements),
            open.span.to(close.span),
        ))
    }
}
