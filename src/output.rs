//! Value formatting for `DISPLAY` output and diagnostic snippets.
//!
//! Formatting rules:
//!
//! - boolean → `TRUE` / `FALSE`
//! - number → default decimal rendering (`23`, `3.14`)
//! - string → raw content, no quotes
//! - array → `[e1, e2, ...]` using each element's own formatting
//! - procedure / builtin → opaque tags `<proc NAME>` / `<builtin NAME>`

use crate::value::Value;

/// Formats a value the way `DISPLAY` prints it.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Boolean(true) => "TRUE".to_string(),
        Value::Boolean(false) => "FALSE".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Str(s) => s.clone(),
        Value::Array(elements) => {
            let items: Vec<String> = elements.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::ProcedureRef(proc) => format!("<proc {}>", proc.name),
        Value::BuiltinRef(builtin) => format!("<builtin {}>", builtin.name()),
    }
}
