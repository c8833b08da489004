use crate::ast::Procedure;

/// A runtime value.
///
/// Values are transient: they are produced and consumed during one program
/// run and freed along with the evaluator. Arrays are owned, fixed-length
/// snapshots - cloning one deep-copies its elements, so no two bindings ever
/// alias the same array storage. Procedure values borrow their defining AST
/// node and compare by identity.
#[derive(Debug, Clone)]
pub enum Value<'p> {
    /// `TRUE` / `FALSE`
    Boolean(bool),

    /// 32-bit IEEE-754 float; the only numeric type in the language.
    Number(f32),

    /// Owned string, decoded from a literal or produced by `INPUT`.
    Str(String),

    /// Owned array snapshot.
    Array(Vec<Value<'p>>),

    /// Reference to a user procedure's defining AST node.
    ProcedureRef(&'p Procedure),

    /// One of the fixed builtin functions.
    BuiltinRef(Builtin),
}

/// Structural equality for tests and internal bookkeeping.
///
/// Procedure references compare by identity (same defining node), builtins
/// by tag, everything else by value; differing kinds compare unequal. The
/// language-level `=` operator layers its cross-type exceptions on top of
/// this in the evaluator.
impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::ProcedureRef(a), Value::ProcedureRef(b)) => std::ptr::eq(*a, *b),
            (Value::BuiltinRef(a), Value::BuiltinRef(b)) => a == b,
            _ => false,
        }
    }
}

impl Value<'_> {
    /// The number this value holds, if it is one.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean this value holds, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether this value can appear as a call target.
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::ProcedureRef(_) | Value::BuiltinRef(_))
    }
}

/// Returns a human-readable type name for a Value.
pub fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Boolean(_) => "boolean",
        Value::Number(_) => "number",
        Value::Str(_) => "string",
        Value::Array(_) => "array",
        Value::ProcedureRef(_) => "procedure",
        Value::BuiltinRef(_) => "builtin",
    }
}

/// The fixed set of builtin functions.
///
/// Each builtin is registered in the environment under both its uppercase
/// and lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `DISPLAY(v, ...)` - write space-separated values and a newline
    Display,
    /// `INPUT([prompt...])` - prompt, read a line, return number or string
    Input,
    /// `LENGTH(arr)` - element count of an array
    Length,
    /// `RANDOM(lo, hi)` - uniform integer in the inclusive range
    Random,
    /// `ASSERT(cond)` - fail unless the argument is boolean TRUE
    Assert,
    /// `APPEND(list, value)` - new array with the value appended
    Append,
}

impl Builtin {
    pub const ALL: [Builtin; 6] = [
        Builtin::Display,
        Builtin::Input,
        Builtin::Length,
        Builtin::Random,
        Builtin::Assert,
        Builtin::Append,
    ];

    /// Canonical (uppercase) name.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Display => "DISPLAY",
            Builtin::Input => "INPUT",
            Builtin::Length => "LENGTH",
            Builtin::Random => "RANDOM",
            Builtin::Assert => "ASSERT",
            Builtin::Append => "APPEND",
        }
    }

    /// Lowercase alias.
    pub fn lowercase_name(self) -> &'static str {
        match self {
            Builtin::Display => "display",
            Builtin::Input => "input",
            Builtin::Length => "length",
            Builtin::Random => "random",
            Builtin::Assert => "assert",
            Builtin::Append => "append",
        }
    }
}
