//! Go literal synthesis for JSON values.
//!
//! [`synthesize`] is total: every (value, kind) pair yields a non-empty Go
//! expression. Values that do not fit their declared kind fall back to that
//! kind's zero literal, so a sloppy fixture still produces a test file that
//! compiles and the failure shows up when the test runs.
//!
//! Nested JSON has no declared schema, so values inside objects and arrays
//! are synthesized with [`infer_kind`], which reads the kind off the value
//! itself (numbers are always floats).

use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::schema::Kind;

const NIL: &str = "nil";

pub fn synthesize(value: &Value, kind: Kind, type_spelling: &str) -> String {
    match kind {
        Kind::String => match value {
            Value::String(s) => go_quote(s),
            _ => r#""""#.to_string(),
        },
        Kind::Int => int_literal(value, true),
        Kind::Uint => int_literal(value, false),
        Kind::Float => match value.as_f64() {
            Some(f) => format!("{f:.6}"),
            None => "0.0".to_string(),
        },
        Kind::Bool => match value {
            Value::Bool(b) => b.to_string(),
            _ => "false".to_string(),
        },
        Kind::Struct => match value {
            Value::Object(map) => struct_literal(map, type_spelling),
            _ => format!("{type_spelling}{{}}"),
        },
        Kind::Slice => match value {
            Value::Array(items) if !items.is_empty() => slice_literal(items, type_spelling),
            // empty and missing slices are both nil, never `T{}`
            _ => NIL.to_string(),
        },
        Kind::Pointer | Kind::Opaque => raw_message(value),
    }
}

/// Kind of a JSON value judged by its shape alone.
pub fn infer_kind(value: &Value) -> Kind {
    match value {
        Value::String(_) => Kind::String,
        Value::Number(_) => Kind::Float,
        Value::Bool(_) => Kind::Bool,
        Value::Object(_) => Kind::Struct,
        Value::Array(_) => Kind::Slice,
        Value::Null => Kind::Opaque,
    }
}

// ------------------------------- Scalars --------------------------------- //

static NUMERIC_LOOKING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?\.?[0-9]").expect("valid numeric regex")
});

fn int_literal(value: &Value, signed: bool) -> String {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if signed || i >= 0 { i.to_string() } else { "0".to_string() }
            } else if let Some(u) = n.as_u64() {
                // only reached above i64::MAX
                if signed { i64::MAX.to_string() } else { u.to_string() }
            } else {
                let f = n.as_f64().unwrap_or_default().trunc();
                // `as` saturates at the integer bounds
                if signed { (f as i64).to_string() } else { (f as u64).to_string() }
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if NUMERIC_LOOKING.is_match(s) && (signed || !s.starts_with('-')) {
                s.to_string()
            } else {
                "0".to_string()
            }
        }
        _ => "0".to_string(),
    }
}

/// Double-quoted Go string literal.
pub fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// ------------------------------ Composites ------------------------------- //

fn struct_literal(map: &Map<String, Value>, type_name: &str) -> String {
    let fields = map
        .iter()
        .map(|(key, value)| format!("{}: {}", go_title(key), synthesize(value, infer_kind(value), "")))
        .collect::<Vec<_>>();
    format!("{type_name}{{{}}}", fields.join(", "))
}

fn slice_literal(items: &[Value], type_name: &str) -> String {
    let element_type = type_name.strip_prefix("[]").unwrap_or(type_name);
    let elements = items
        .iter()
        .map(|value| synthesize(value, infer_kind(value), element_type))
        .collect::<Vec<_>>();
    format!("{type_name}{{{}}}", elements.join(", "))
}

fn raw_message(value: &Value) -> String {
    match serde_json::to_string(value) {
        Ok(json) => format!("json.RawMessage({})", go_string_literal(&json)),
        Err(_) => NIL.to_string(),
    }
}

/// Raw (backquoted) Go string literal, or a double-quoted one when `s`
/// contains a backquote.
pub fn go_string_literal(s: &str) -> String {
    if s.contains('`') { go_quote(s) } else { format!("`{s}`") }
}

/// Title-cases a JSON key the way Go's `strings.Title` does: the first
/// letter after every word separator is upper-cased.
pub fn go_title(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut at_word_start = true;
    for c in key.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = is_word_separator(c);
    }
    out
}

/// ASCII punctuation and Unicode whitespace separate words. Other
/// non-ASCII runes (`€`, `·`) continue one.
fn is_word_separator(c: char) -> bool {
    if c.is_ascii() {
        return !(c.is_ascii_alphanumeric() || c == '_');
    }
    if c.is_alphanumeric() {
        return false;
    }
    c.is_whitespace()
}

// -------------------------------- Tests ---------------------------------- //
