//! Conversion of raw JSON column values into [`Value`]s.
//!
//! A converter is picked once per column: by the `[type]` hint in the column
//! name when `parse_colnames` is on, by the declared type when
//! `parse_decltypes` is on, and otherwise by the SQLite affinity of the
//! declared type. Columns without a converter pass through structurally.

use std::{collections::HashMap, fmt};

use base64::Engine as _;
use serde_json::Value as JsonValue;

use super::types::Value;

pub type Converter = fn(&JsonValue) -> Result<Value, String>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseFlags {
    pub parse_decltypes: bool,
    pub parse_colnames: bool,
}

#[derive(Clone)]
pub struct ConverterRegistry {
    converters: HashMap<String, Converter>,
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.converters.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ConverterRegistry").field("types", &names).finish()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        let mut r = Self {
            converters: HashMap::new(),
        };
        for name in ["INTEGER", "INT", "BIGINT"] {
            r.register(name, to_integer);
        }
        for name in ["REAL", "FLOAT", "DOUBLE"] {
            r.register(name, to_real);
        }
        r.register("NUMERIC", to_numeric);
        for name in ["TEXT", "VARCHAR"] {
            r.register(name, to_text);
        }
        r.register("BLOB", to_blob);
        for name in ["BOOL", "BOOLEAN"] {
            r.register(name, to_boolean);
        }
        r.register("NULL", to_null);
        r
    }
}

impl ConverterRegistry {
    /// Registers `converter` under `name`; names match case-insensitively.
    pub fn register(&mut self, name: &str, converter: Converter) {
        self.converters.insert(name.trim().to_ascii_uppercase(), converter);
    }

    pub fn get(&self, name: &str) -> Option<Converter> {
        self.converters.get(&name.trim().to_ascii_uppercase()).copied()
    }

    pub fn converter_for(
        &self,
        column_name: &str,
        decl_type: &str,
        flags: ParseFlags,
    ) -> Option<Converter> {
        if flags.parse_colnames {
            if let Some(hint) = column_type_hint(column_name) {
                if let Some(c) = self.get(hint) {
                    return Some(c);
                }
            }
        }

        if flags.parse_decltypes {
            if let Some(c) = decl_type_base(decl_type).and_then(|base| self.get(base)) {
                return Some(c);
            }
        }

        let decl_upper = if decl_type.trim().is_empty() {
            infer_type_from_name(column_name)?.to_string()
        } else {
            decl_type.to_ascii_uppercase()
        };
        affinity_converter(&decl_upper)
    }
}

/// Removes a `[type]` annotation from a column name when `parse_colnames` is on.
pub fn strip_column_name(name: &str, parse_colnames: bool) -> &str {
    if !parse_colnames {
        return name;
    }
    match name.find('[') {
        Some(i) => name[..i].trim_end(),
        None => name,
    }
}

/// Structural mapping used when a column has no converter.
pub fn passthrough(raw: &JsonValue) -> Value {
    match raw {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

fn column_type_hint(column_name: &str) -> Option<&str> {
    let start = column_name.find('[')? + 1;
    let len = column_name[start..].find(']')?;
    let hint = column_name[start..start + len].trim();
    (!hint.is_empty()).then_some(hint)
}

// "VARCHAR(20) NOT NULL" -> "VARCHAR"
fn decl_type_base(decl_type: &str) -> Option<&str> {
    let first = decl_type.split_whitespace().next()?;
    let base = first.split('(').next().unwrap_or(first);
    (!base.is_empty()).then_some(base)
}

// Expressions like `SELECT 3.0` come back without a declared type, named after the literal.
fn infer_type_from_name(column_name: &str) -> Option<&'static str> {
    let name = column_name.trim();
    if name.is_empty() {
        return None;
    }
    if name.chars().all(|c| c.is_ascii_digit()) {
        return Some("INTEGER");
    }
    let dots = name.chars().filter(|c| *c == '.').count();
    if dots == 1 && name.len() > 1 && name.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Some("REAL");
    }
    None
}

// SQLite type affinity rules, in SQLite's precedence order.
fn affinity_converter(decl_upper: &str) -> Option<Converter> {
    if decl_upper.contains("INT") {
        Some(to_integer)
    } else if decl_upper.contains("CHAR") || decl_upper.contains("CLOB") || decl_upper.contains("TEXT") {
        None
    } else if decl_upper.contains("BLOB") {
        Some(to_blob)
    } else if decl_upper.contains("REAL") || decl_upper.contains("FLOA") || decl_upper.contains("DOUB") {
        Some(to_real)
    } else {
        None
    }
}

fn unexpected(kind: &str, raw: &JsonValue) -> String {
    format!("cannot read {raw} as {kind}")
}

pub fn to_integer(raw: &JsonValue) -> Result<Value, String> {
    match raw {
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else {
                float_to_integer(n.as_f64(), raw)
            }
        }
        JsonValue::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(i) => Ok(Value::Integer(i)),
                Err(_) => float_to_integer(s.parse::<f64>().ok(), raw),
            }
        }
        JsonValue::Bool(b) => Ok(Value::Integer(i64::from(*b))),
        _ => Err(unexpected("integer", raw)),
    }
}

fn float_to_integer(f: Option<f64>, raw: &JsonValue) -> Result<Value, String> {
    match f {
        Some(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Ok(Value::Integer(f.trunc() as i64)),
        _ => Err(unexpected("integer", raw)),
    }
}

pub fn to_real(raw: &JsonValue) -> Result<Value, String> {
    match raw {
        JsonValue::Number(n) => n
            .as_f64()
            .map(Value::Real)
            .ok_or_else(|| unexpected("real", raw)),
        JsonValue::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Real)
            .map_err(|_| unexpected("real", raw)),
        JsonValue::Bool(b) => Ok(Value::Real(if *b { 1.0 } else { 0.0 })),
        _ => Err(unexpected("real", raw)),
    }
}

pub fn to_numeric(raw: &JsonValue) -> Result<Value, String> {
    match to_integer(raw) {
        Ok(Value::Integer(i)) if to_real(raw).ok() == Some(Value::Real(i as f64)) => Ok(Value::Integer(i)),
        _ => to_real(raw),
    }
}

pub fn to_text(raw: &JsonValue) -> Result<Value, String> {
    Ok(match raw {
        JsonValue::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    })
}

/// The server sends BLOB columns base64-encoded.
pub fn to_blob(raw: &JsonValue) -> Result<Value, String> {
    match raw {
        JsonValue::String(s) => base64::engine::general_purpose::STANDARD
            .decode(s.as_bytes())
            .map(Value::Blob)
            .map_err(|e| format!("invalid base64 blob: {e}")),
        JsonValue::Array(items) => items
            .iter()
            .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(Value::Blob)
            .ok_or_else(|| unexpected("blob", raw)),
        _ => Err(unexpected("blob", raw)),
    }
}

pub fn to_boolean(raw: &JsonValue) -> Result<Value, String> {
    match raw {
        JsonValue::Bool(b) => Ok(Value::Boolean(*b)),
        JsonValue::Number(n) => Ok(Value::Boolean(n.as_f64().is_some_and(|f| f != 0.0))),
        JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => Ok(Value::Boolean(true)),
            "0" | "false" => Ok(Value::Boolean(false)),
            _ => Err(unexpected("boolean", raw)),
        },
        _ => Err(unexpected("boolean", raw)),
    }
}

pub fn to_null(_raw: &JsonValue) -> Result<Value, String> {
    Ok(Value::Null)
}
