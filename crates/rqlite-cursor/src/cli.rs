use std::time::Duration;

use clap::Parser;
use rqlite_cursor::{ConnectOptions, DbError, DbResult, Scheme, Value};

#[derive(Parser, Debug, Clone)]
#[command(name = "rqlite-cursor")]
pub struct Args {
    /// SQL statement; `?` placeholders are filled from --param or --batch.
    pub sql: String,

    #[arg(long, default_value = "localhost")]
    pub host: String,

    #[arg(long, default_value_t = 4001)]
    pub port: u16,

    /// Talk to the server over https.
    #[arg(long)]
    pub https: bool,

    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,

    /// Overall timeout for a single request.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Convert columns by their declared type.
    #[arg(long)]
    pub parse_decltypes: bool,

    /// Convert columns by a `name [type]` hint in the column name.
    #[arg(long)]
    pub parse_colnames: bool,

    /// Logging level (stderr). Also supports RUST_LOG.
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Positional parameter as a JSON scalar; bare words are taken as text (repeatable).
    #[arg(short = 'p', long = "param")]
    pub params: Vec<String>,

    /// One parameter set as a JSON array (repeatable). Runs the statement once per set.
    #[arg(long)]
    pub batch: Vec<String>,
}

impl Args {
    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.host.clone(), self.port)
            .scheme(if self.https { Scheme::Https } else { Scheme::Http })
            .parse_decltypes(self.parse_decltypes)
            .parse_colnames(self.parse_colnames);
        if let Some(ms) = self.connect_timeout_ms {
            options = options.connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.timeout_ms {
            options = options.timeout(Duration::from_millis(ms));
        }
        options
    }

    pub fn parameters(&self) -> DbResult<Vec<Value>> {
        self.params.iter().map(String::as_str).map(parse_param).collect()
    }

    pub fn parameter_sets(&self) -> DbResult<Vec<Vec<Value>>> {
        self.batch.iter().map(String::as_str).map(parse_param_set).collect()
    }
}

pub fn parse_param(raw: &str) -> DbResult<Value> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => json_scalar(json),
        Err(_) => Ok(Value::Text(raw.to_string())),
    }
}

pub fn parse_param_set(raw: &str) -> DbResult<Vec<Value>> {
    match serde_json::from_str::<serde_json::Value>(raw)? {
        serde_json::Value::Array(items) => items.into_iter().map(json_scalar).collect(),
        other => Err(DbError::InvalidArgument(format!(
            "parameter set must be a JSON array: {other}"
        ))),
    }
}

fn json_scalar(json: serde_json::Value) -> DbResult<Value> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Text(s),
        other => {
            return Err(DbError::InvalidArgument(format!(
                "parameter must be a JSON scalar: {other}"
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Value::Integer(1))]
    #[case("1.5", Value::Real(1.5))]
    #[case("null", Value::Null)]
    #[case("true", Value::Boolean(true))]
    #[case("\"quoted\"", Value::Text("quoted".into()))]
    #[case("bare words", Value::Text("bare words".into()))]
    fn test_parse_param(#[case] raw: &str, #[case] expected: Value) {
        assert_eq!(parse_param(raw).unwrap(), expected);
    }

    #[rstest]
    fn test_parse_param_set() {
        assert_eq!(
            parse_param_set(r#"[1, "a", null]"#).unwrap(),
            vec![Value::Integer(1), Value::Text("a".into()), Value::Null]
        );
        assert!(parse_param_set("1").is_err());
        assert!(parse_param_set("[[1]]").is_err());
    }

    #[rstest]
    fn test_connect_options_from_args() {
        let args = Args::parse_from([
            "rqlite-cursor",
            "--host",
            "db",
            "--port",
            "4003",
            "--https",
            "--parse-colnames",
            "SELECT 1",
        ]);
        let o = args.connect_options();
        assert_eq!(o.base_url(), "https://db:4003");
        assert!(o.parse_colnames);
        assert!(!o.parse_decltypes);
        assert_eq!(args.sql, "SELECT 1");
    }
}
