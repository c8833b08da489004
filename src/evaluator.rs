use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    ast::{BinOp, Block, Expr, ExprKind, Procedure, Program, Span, Stmt, StmtKind, UnaryOp},
    output::format_value,
    value::{Builtin, Value, type_name},
};

/// Default procedure recursion limit, in frames.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// The tree-walking evaluator.
///
/// Walks a parsed [`Program`] against one environment: a global frame plus
/// one local frame per active procedure call, resolved local-first. Names
/// first assigned inside a call live in that call's frame and vanish when it
/// returns; assignments to names already visible outside write through.
/// Frames are discarded on both normal return and error propagation, so a
/// failed call never leaks parameter bindings into the caller.
///
/// `DISPLAY` and `INPUT` go through injectable `Write`/`BufRead`
/// collaborators (stdout/stdin by default), so programs are runnable against
/// in-memory buffers in tests.
pub struct Evaluator<'p> {
    source: &'p str,
    globals: HashMap<String, Value<'p>>,
    frames: Vec<HashMap<String, Value<'p>>>,
    depth: usize,
    max_depth: usize,
    rng: StdRng,
    output: Box<dyn Write + 'p>,
    input: Box<dyn BufRead + 'p>,
}

/// Errors that abort evaluation.
///
/// Every variant carries the span of the expression or statement that
/// raised it. Failure short-circuits immediately through every enclosing
/// evaluation; there is no catch construct in the language.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Name not bound in the environment.
    UndefinedIdentifier { name: String, span: Span },

    /// Call target resolved to a non-callable value.
    NotCallable { name: String, span: Span },

    /// Wrong number of call arguments.
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
        span: Span,
    },

    /// Operator or builtin applied to the wrong kind of value.
    TypeError { message: String, span: Span },

    /// Division or modulus with a zero divisor.
    DivisionByZero { span: Span },

    /// Procedure definition over an already-bound name.
    Redefinition { name: String, span: Span },

    /// Assignment to a name bound to a procedure or builtin.
    AssignToCallable { name: String, span: Span },

    /// Procedure recursion exceeded the configured depth limit.
    StackDepthExceeded { span: Span },

    /// `ASSERT` received no argument or a non-TRUE value.
    AssertionFailed { detail: String, span: Span },

    /// The output or input collaborator failed.
    Io { message: String, span: Span },
}

impl RuntimeError {
    /// The source range the error points at.
    pub fn span(&self) -> Span {
        match self {
            RuntimeError::UndefinedIdentifier { span, .. }
            | RuntimeError::NotCallable { span, .. }
            | RuntimeError::ArityMismatch { span, .. }
            | RuntimeError::TypeError { span, .. }
            | RuntimeError::DivisionByZero { span }
            | RuntimeError::Redefinition { span, .. }
            | RuntimeError::AssignToCallable { span, .. }
            | RuntimeError::StackDepthExceeded { span }
            | RuntimeError::AssertionFailed { span, .. }
            | RuntimeError::Io { span, .. } => *span,
        }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::UndefinedIdentifier { name, .. } => {
                write!(f, "Undefined identifier '{}'", name)
            }
            RuntimeError::NotCallable { name, .. } => {
                write!(f, "'{}' is not a procedure or builtin", name)
            }
            RuntimeError::ArityMismatch {
                name,
                expected,
                got,
                ..
            } => write!(
                f,
                "'{}' expects {} argument(s), got {}",
                name, expected, got
            ),
            RuntimeError::TypeError { message, .. } => write!(f, "{}", message),
            RuntimeError::DivisionByZero { .. } => write!(f, "Division or modulus by zero"),
            RuntimeError::Redefinition { name, .. } => {
                write!(f, "'{}' is already defined", name)
            }
            RuntimeError::AssignToCallable { name, .. } => write!(
                f,
                "Cannot assign to '{}': it names a procedure or builtin",
                name
            ),
            RuntimeError::StackDepthExceeded { .. } => write!(f, "Stack depth exceeded"),
            RuntimeError::AssertionFailed { detail, .. } => {
                write!(f, "Assertion failed: {}", detail)
            }
            RuntimeError::Io { message, .. } => write!(f, "I/O error: {}", message),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Statement-level control flow.
enum Flow<'p> {
    Normal,
    Return(Value<'p>),
}

impl<'p> Evaluator<'p> {
    /// Evaluator wired to stdout/stdin with a process-seeded generator.
    pub fn new(source: &'p str) -> Self {
        Self::with_io(
            source,
            Box::new(io::stdout()),
            Box::new(io::stdin().lock()),
        )
    }

    /// Evaluator with injected I/O collaborators.
    pub fn with_io(
        source: &'p str,
        output: Box<dyn Write + 'p>,
        input: Box<dyn BufRead + 'p>,
    ) -> Self {
        let mut globals = HashMap::new();
        for builtin in Builtin::ALL {
            globals.insert(builtin.name().to_string(), Value::BuiltinRef(builtin));
            globals.insert(
                builtin.lowercase_name().to_string(),
                Value::BuiltinRef(builtin),
            );
        }
        Evaluator {
            source,
            globals,
            frames: Vec::new(),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            rng: StdRng::from_entropy(),
            output,
            input,
        }
    }

    /// Replaces the process-seeded generator with a fixed-seed one, making
    /// `RANDOM` deterministic.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Overrides the procedure recursion limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Runs the whole program. A top-level scope that completes yields the
    /// sentinel value `0`, like any other scope.
    pub fn run(&mut self, program: &'p Program) -> Result<Value<'p>, RuntimeError> {
        for stmt in &program.statements {
            // RETURN at the top level is rejected by the parser, so the
            // flow result here is always Normal.
            self.eval_stmt(stmt)?;
        }
        Ok(Value::Number(0.0))
    }

    fn eval_stmt(&mut self, stmt: &'p Stmt) -> Result<Flow<'p>, RuntimeError> {
        match &stmt.kind {
            StmtKind::Assign {
                name,
                name_span,
                value,
            } => {
                let value = self.eval_expr(value)?;
                self.assign(name, *name_span, value)?;
                Ok(Flow::Normal)
            }
            StmtKind::Expr(expr) => {
                self.eval_expr(expr)?;
                Ok(Flow::Normal)
            }
            StmtKind::Procedure(proc) => {
                self.define_procedure(proc)?;
                Ok(Flow::Normal)
            }
            StmtKind::Return(expr) => {
                let value = self.eval_expr(expr)?;
                Ok(Flow::Return(value))
            }
            StmtKind::If { arms, else_body } => {
                for arm in arms {
                    let condition = self.eval_expr(&arm.condition)?;
                    if self.boolean_condition(&condition, arm.condition.span)? {
                        return self.eval_block(&arm.body);
                    }
                }
                match else_body {
                    Some(body) => self.eval_block(body),
                    None => Ok(Flow::Normal),
                }
            }
            StmtKind::RepeatTimes { count, body } => {
                // The count is evaluated once, before the first iteration.
                let value = self.eval_expr(count)?;
                let Some(n) = value.as_number() else {
                    return Err(RuntimeError::TypeError {
                        message: format!(
                            "REPEAT count must be a number, got {}",
                            type_name(&value)
                        ),
                        span: count.span,
                    });
                };
                let iterations = n.floor() as i64;
                for _ in 0..iterations.max(0) {
                    if let Flow::Return(v) = self.eval_block(body)? {
                        return Ok(Flow::Return(v));
                    }
                }
                Ok(Flow::Normal)
            }
            StmtKind::RepeatUntil { condition, body } => {
                // Tested before each iteration; zero iterations are possible.
                loop {
                    let value = self.eval_expr(condition)?;
                    if self.boolean_condition(&value, condition.span)? {
                        return Ok(Flow::Normal);
                    }
                    if let Flow::Return(v) = self.eval_block(body)? {
                        return Ok(Flow::Return(v));
                    }
                }
            }
        }
    }

    fn eval_block(&mut self, block: &'p Block) -> Result<Flow<'p>, RuntimeError> {
        for stmt in &block.statements {
            if let Flow::Return(v) = self.eval_stmt(stmt)? {
                return Ok(Flow::Return(v));
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_expr(&mut self, expr: &'p Expr) -> Result<Value<'p>, RuntimeError> {
        match &expr.kind {
            ExprKind::Number => {
                let text = expr.span.slice(self.source);
                text.parse::<f32>()
                    .map(Value::Number)
                    .map_err(|_| RuntimeError::TypeError {
                        message: format!("Invalid number literal '{}'", text),
                        span: expr.span,
                    })
            }
            ExprKind::Str => Ok(Value::Str(self.decode_string(expr.span))),
            ExprKind::Boolean(b) => Ok(Value::Boolean(*b)),
            ExprKind::Identifier(name) => match self.lookup(name) {
                Some(value) => Ok(value.clone()),
                None => Err(RuntimeError::UndefinedIdentifier {
                    name: name.clone(),
                    span: expr.span,
                }),
            },
            ExprKind::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expr(element)?);
                }
                Ok(Value::Array(values))
            }
            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                self.apply_unary(*op, &value, expr.span)
            }
            ExprKind::Binary { op, left, right } => self.apply_binary(*op, left, right, expr.span),
            ExprKind::Call {
                name,
                name_span,
                args,
            } => {
                let callee = match self.lookup(name) {
                    Some(value) => value.clone(),
                    None => {
                        return Err(RuntimeError::UndefinedIdentifier {
                            name: name.clone(),
                            span: *name_span,
                        });
                    }
                };

                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg)?);
                }

                match callee {
                    Value::BuiltinRef(builtin) => self.call_builtin(builtin, values, expr.span),
                    Value::ProcedureRef(proc) => self.call_procedure(proc, values, expr.span),
                    _ => Err(RuntimeError::NotCallable {
                        name: name.clone(),
                        span: *name_span,
                    }),
                }
            }
        }
    }

    /// Strips the surrounding quotes and resolves backslash escapes: the
    /// escaped character is kept verbatim, no escape sequences are
    /// interpreted.
    fn decode_string(&self, span: Span) -> String {
        let text = span.slice(self.source);
        let inner = &text[1..text.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    fn apply_unary(
        &self,
        op: UnaryOp,
        value: &Value<'p>,
        span: Span,
    ) -> Result<Value<'p>, RuntimeError> {
        match op {
            UnaryOp::Plus => {
                let n = self.number_operand(value, span, "+")?;
                Ok(Value::Number(n))
            }
            UnaryOp::Negate => {
                let n = self.number_operand(value, span, "-")?;
                Ok(Value::Number(-n))
            }
            UnaryOp::Not => match value.as_bool() {
                Some(b) => Ok(Value::Boolean(!b)),
                None => Err(RuntimeError::TypeError {
                    message: format!("'NOT' requires a boolean, got {}", type_name(value)),
                    span,
                }),
            },
        }
    }

    fn apply_binary(
        &mut self,
        op: BinOp,
        left: &'p Expr,
        right: &'p Expr,
        span: Span,
    ) -> Result<Value<'p>, RuntimeError> {
        // AND/OR short-circuit: the right operand is only evaluated when
        // the left one does not decide the result.
        if op == BinOp::And || op == BinOp::Or {
            let lhs = self.eval_expr(left)?;
            let lb = self.boolean_operand(&lhs, left.span, op)?;
            if (op == BinOp::And && !lb) || (op == BinOp::Or && lb) {
                return Ok(Value::Boolean(lb));
            }
            let rhs = self.eval_expr(right)?;
            let rb = self.boolean_operand(&rhs, right.span, op)?;
            return Ok(Value::Boolean(rb));
        }

        let lhs = self.eval_expr(left)?;
        let rhs = self.eval_expr(right)?;

        match op {
            BinOp::Equal => Ok(Value::Boolean(self.values_equal(&lhs, &rhs, span)?)),
            BinOp::NotEqual => Ok(Value::Boolean(!self.values_equal(&lhs, &rhs, span)?)),
            BinOp::LessThan
            | BinOp::GreaterThan
            | BinOp::LessEqual
            | BinOp::GreaterEqual => {
                let a = self.number_operand(&lhs, left.span, op.symbol())?;
                let b = self.number_operand(&rhs, right.span, op.symbol())?;
                let result = match op {
                    BinOp::LessThan => a < b,
                    BinOp::GreaterThan => a > b,
                    BinOp::LessEqual => a <= b,
                    _ => a >= b,
                };
                Ok(Value::Boolean(result))
            }
            BinOp::Add | BinOp::Subtract | BinOp::Multiply | BinOp::Divide | BinOp::Modulo => {
                let a = self.number_operand(&lhs, left.span, op.symbol())?;
                let b = self.number_operand(&rhs, right.span, op.symbol())?;
                match op {
                    BinOp::Add => Ok(Value::Number(a + b)),
                    BinOp::Subtract => Ok(Value::Number(a - b)),
                    BinOp::Multiply => Ok(Value::Number(a * b)),
                    BinOp::Divide => {
                        if b == 0.0 {
                            Err(RuntimeError::DivisionByZero { span })
                        } else {
                            Ok(Value::Number(a / b))
                        }
                    }
                    _ => {
                        if b == 0.0 {
                            Err(RuntimeError::DivisionByZero { span })
                        } else {
                            // Floored modulo: the result's sign follows the
                            // divisor's, so -7 MOD 3 = 2 and 7 MOD -3 = -2.
                            Ok(Value::Number(a - b * (a / b).floor()))
                        }
                    }
                }
            }
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
    }

    /// Partial equality. Arrays compare deeply (length, then elementwise);
    /// an array against a non-array, or a string against a non-string, is
    /// an exception. Remaining mixed kinds compare unequal.
    fn values_equal(
        &self,
        a: &Value<'p>,
        b: &Value<'p>,
        span: Span,
    ) -> Result<bool, RuntimeError> {
        match (a, b) {
            (Value::Array(x), Value::Array(y)) => {
                if x.len() != y.len() {
                    return Ok(false);
                }
                for (xe, ye) in x.iter().zip(y) {
                    if !self.values_equal(xe, ye, span)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Value::Array(_), other) | (other, Value::Array(_)) => {
                Err(RuntimeError::TypeError {
                    message: format!("Cannot compare an array with a {}", type_name(other)),
                    span,
                })
            }
            (Value::Str(_), Value::Str(_)) => Ok(a == b),
            (Value::Str(_), other) | (other, Value::Str(_)) => Err(RuntimeError::TypeError {
                message: format!("Cannot compare a string with a {}", type_name(other)),
                span,
            }),
            _ => Ok(a == b),
        }
    }

    fn call_procedure(
        &mut self,
        proc: &'p Procedure,
        args: Vec<Value<'p>>,
        span: Span,
    ) -> Result<Value<'p>, RuntimeError> {
        if args.len() != proc.params.len() {
            return Err(RuntimeError::ArityMismatch {
                name: proc.name.clone(),
                expected: proc.params.len(),
                got: args.len(),
                span,
            });
        }
        if self.depth >= self.max_depth {
            return Err(RuntimeError::StackDepthExceeded { span });
        }

        let frame: HashMap<String, Value<'p>> =
            proc.params.iter().cloned().zip(args).collect();
        self.frames.push(frame);
        self.depth += 1;

        let result = self.eval_block(&proc.body);

        // The frame is dropped on the error path too, so a failed call
        // never leaks bindings into the caller.
        self.depth -= 1;
        self.frames.pop();

        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Number(0.0)),
        }
    }

    fn define_procedure(&mut self, proc: &'p Procedure) -> Result<(), RuntimeError> {
        if self.globals.contains_key(&proc.name) {
            return Err(RuntimeError::Redefinition {
                name: proc.name.clone(),
                span: proc.name_span,
            });
        }
        self.globals
            .insert(proc.name.clone(), Value::ProcedureRef(proc));
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<&Value<'p>> {
        self.frames
            .last()
            .and_then(|frame| frame.get(name))
            .or_else(|| self.globals.get(name))
    }

    /// Binds `name`, local-first: an existing local binding is updated in
    /// place, an existing outer binding is written through, and a brand-new
    /// name lands in the innermost frame.
    fn assign(
        &mut self,
        name: &str,
        name_span: Span,
        value: Value<'p>,
    ) -> Result<(), RuntimeError> {
        if let Some(existing) = self.lookup(name)
            && existing.is_callable()
        {
            return Err(RuntimeError::AssignToCallable {
                name: name.to_string(),
                span: name_span,
            });
        }

        match self.frames.last_mut() {
            Some(frame) if frame.contains_key(name) || !self.globals.contains_key(name) => {
                frame.insert(name.to_string(), value);
            }
            _ => {
                self.globals.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: Vec<Value<'p>>,
        span: Span,
    ) -> Result<Value<'p>, RuntimeError> {
        match builtin {
            Builtin::Display => {
                let line: Vec<String> = args.iter().map(format_value).collect();
                writeln!(self.output, "{}", line.join(" "))
                    .and_then(|_| self.output.flush())
                    .map_err(|e| RuntimeError::Io {
                        message: e.to_string(),
                        span,
                    })?;
                Ok(Value::Number(0.0))
            }
            Builtin::Input => {
                let prompt = if args.is_empty() {
                    "Input: ".to_string()
                } else {
                    let parts: Vec<String> = args.iter().map(format_value).collect();
                    parts.join(" ")
                };
                write!(self.output, "{}", prompt)
                    .and_then(|_| self.output.flush())
                    .map_err(|e| RuntimeError::Io {
                        message: e.to_string(),
                        span,
                    })?;

                let mut line = String::new();
                match self.input.read_line(&mut line) {
                    Ok(0) | Err(_) => return Ok(Value::Str(String::new())),
                    Ok(_) => {}
                }
                let line = line.trim_end_matches(['\n', '\r']);
                match line.parse::<f32>() {
                    Ok(n) => Ok(Value::Number(n)),
                    Err(_) => Ok(Value::Str(line.to_string())),
                }
            }
            Builtin::Length => {
                let [arg] = self.expect_args::<1>(builtin, args, span)?;
                match arg {
                    Value::Array(elements) => Ok(Value::Number(elements.len() as f32)),
                    other => Err(RuntimeError::TypeError {
                        message: format!("LENGTH expects an array, got {}", type_name(&other)),
                        span,
                    }),
                }
            }
            Builtin::Random => {
                let [lo, hi] = self.expect_args::<2>(builtin, args, span)?;
                let lo = self.number_operand(&lo, span, "RANDOM")? as i64;
                let hi = self.number_operand(&hi, span, "RANDOM")? as i64;
                if lo > hi {
                    return Err(RuntimeError::TypeError {
                        message: format!("RANDOM range [{}, {}] is empty", lo, hi),
                        span,
                    });
                }
                let n = self.rng.gen_range(lo..=hi);
                Ok(Value::Number(n as f32))
            }
            Builtin::Assert => match args.first() {
                Some(Value::Boolean(true)) => Ok(Value::Number(0.0)),
                Some(other) => Err(RuntimeError::AssertionFailed {
                    detail: format_value(other),
                    span,
                }),
                None => Err(RuntimeError::AssertionFailed {
                    detail: "no condition given".to_string(),
                    span,
                }),
            },
            Builtin::Append => {
                let [list, value] = self.expect_args::<2>(builtin, args, span)?;
                match list {
                    Value::Array(mut elements) => {
                        // The argument is already an independent snapshot,
                        // so the caller's array is untouched.
                        elements.push(value);
                        Ok(Value::Array(elements))
                    }
                    other => Err(RuntimeError::TypeError {
                        message: format!(
                            "APPEND expects an array first, got {}",
                            type_name(&other)
                        ),
                        span,
                    }),
                }
            }
        }
    }

    fn expect_args<const N: usize>(
        &self,
        builtin: Builtin,
        args: Vec<Value<'p>>,
        span: Span,
    ) -> Result<[Value<'p>; N], RuntimeError> {
        let got = args.len();
        args.try_into().map_err(|_| RuntimeError::ArityMismatch {
            name: builtin.name().to_string(),
            expected: N,
            got,
            span,
        })
    }

    fn number_operand(
        &self,
        value: &Value<'p>,
        span: Span,
        op: &str,
    ) -> Result<f32, RuntimeError> {
        value.as_number().ok_or_else(|| RuntimeError::TypeError {
            message: format!("'{}' requires numbers, got {}", op, type_name(value)),
            span,
        })
    }

    fn boolean_operand(
        &self,
        value: &Value<'p>,
        span: Span,
        op: BinOp,
    ) -> Result<bool, RuntimeError> {
        value.as_bool().ok_or_else(|| RuntimeError::TypeError {
            message: format!(
                "'{}' requires booleans, got {}",
                op.symbol(),
                type_name(value)
            ),
            span,
        })
    }

    fn boolean_condition(&self, value: &Value<'p>, span: Span) -> Result<bool, RuntimeError> {
        value.as_bool().ok_or_else(|| RuntimeError::TypeError {
            message: format!("Condition must be a boolean, got {}", type_name(value)),
            span,
        })
    }
}
