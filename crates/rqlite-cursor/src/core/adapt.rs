//! Rendering of client values as SQLite literals.
//!
//! SQLite natively supports only TEXT, INTEGER, REAL, BLOB and NULL; booleans
//! go over the wire as integers.

use super::types::Value;

pub fn adapt(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(x) => x.to_string(),
        Value::Real(x) => adapt_real(*x),
        Value::Text(s) => quote_text(s),
        Value::Blob(b) => format!("X'{}'", hex::encode_upper(b)),
        Value::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
    }
}

fn adapt_real(x: f64) -> String {
    if x.is_nan() {
        // SQLite stores NaN as NULL.
        "NULL".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "9e999" } else { "-9e999" }.to_string()
    } else {
        // `{:?}` keeps the fractional part ("1.0"), so the server sees a REAL.
        format!("{x:?}")
    }
}

fn quote_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
    out
}
