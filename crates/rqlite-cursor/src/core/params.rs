use super::{adapt::adapt, types::Value};
use crate::error::{DbError, DbResult};

/// Splices adapted literals into each `?` of `operation`, left to right.
///
/// This is textual substitution: every `?` counts, including ones inside
/// quoted literals, and the result is sent to the server as plain SQL.
pub fn substitute_params(operation: &str, parameters: &[Value]) -> DbResult<String> {
    let parts: Vec<&str> = operation.split('?').collect();
    let placeholders = parts.len() - 1;
    if placeholders != parameters.len() {
        return Err(DbError::InvalidArgument(format!(
            "incorrect number of parameters ({} != {}): {} {:?}",
            placeholders,
            parameters.len(),
            operation,
            parameters
        )));
    }

    let mut out = String::with_capacity(operation.len() + parameters.len() * 8);
    for (i, part) in parts.iter().enumerate() {
        out.push_str(part);
        if let Some(p) = parameters.get(i) {
            out.push_str(&adapt(p));
        }
    }
    Ok(out)
}

/// The uppercased leading keyword of a statement.
pub fn sql_command(sql: &str) -> DbResult<String> {
    sql.split_whitespace()
        .next()
        .map(str::to_ascii_uppercase)
        .ok_or_else(|| DbError::InvalidArgument("empty SQL statement".into()))
}

/// Statements served by the read-only query endpoint.
pub fn is_query_command(command: &str) -> bool {
    matches!(command, "SELECT" | "PRAGMA")
}
