mod common;

use common::{connect, connect_with, ScriptedTransport};
use rqlite_cursor::{
    params, ConnectOptions, DbError, HttpRequest, Value, PARSE_COLNAMES, PARSE_DECLTYPES,
};
use serde_json::Value as JsonValue;

fn upper_text(raw: &JsonValue) -> Result<Value, String> {
    raw.as_str()
        .map(|s| Value::Text(s.to_uppercase()))
        .ok_or_else(|| format!("not text: {raw}"))
}

#[test]
fn test_execute_shorthand_returns_populated_cursor() {
    let t = ScriptedTransport::new();
    t.respond(r#"{"results":[{"columns":["n"],"types":["integer"],"values":[[42]]}]}"#);
    let conn = connect(&t);

    let mut cur = conn.execute("SELECT ?", Some(params![42].as_slice())).unwrap();
    assert_eq!(t.last_request().query_value("q"), Some("SELECT 42"));
    assert_eq!(cur.fetch_one().unwrap()["n"], Value::Integer(42));
}

#[test]
fn test_executemany_shorthand() {
    let t = ScriptedTransport::new();
    t.respond(r#"{"results":[{"rows_affected":1},{"rows_affected":1},{"rows_affected":1}]}"#);
    let conn = connect(&t);
    let sets: Vec<Vec<Value>> = (1..=3).map(|i| params![i]).collect();
    let cur = conn.executemany("DELETE FROM t WHERE id = ?", &sets).unwrap();
    assert_eq!(cur.rowcount(), 3);
    assert_eq!(t.last_statements().len(), 3);
}

#[test]
fn test_registered_converter_applies_to_declared_type() {
    let t = ScriptedTransport::new();
    t.respond(r#"{"results":[{"columns":["code"],"types":["shout"],"values":[["abc"]]}]}"#);
    let mut conn = connect_with(&t, ConnectOptions::default().detect_types(PARSE_DECLTYPES));
    conn.register_converter("SHOUT", upper_text);

    let mut cur = conn.execute("SELECT code FROM t", None).unwrap();
    assert_eq!(cur.fetch_one().unwrap()["code"], Value::Text("ABC".into()));
}

#[test]
fn test_registered_converter_ignored_without_flags() {
    let t = ScriptedTransport::new();
    t.respond(r#"{"results":[{"columns":["code [shout]"],"types":["shout"],"values":[["abc"]]}]}"#);
    let mut conn = connect(&t);
    conn.register_converter("shout", upper_text);

    let mut cur = conn.execute("SELECT code FROM t", None).unwrap();
    assert_eq!(cur.description().unwrap()[0].name, "code [shout]");
    assert_eq!(cur.fetch_one().unwrap()[0], Value::Text("abc".into()));
}

#[test]
fn test_colname_hint_uses_registered_converter() {
    let t = ScriptedTransport::new();
    t.respond(r#"{"results":[{"columns":["code [shout]"],"types":["text"],"values":[["abc"]]}]}"#);
    let mut conn = connect_with(
        &t,
        ConnectOptions::default().detect_types(PARSE_DECLTYPES | PARSE_COLNAMES),
    );
    conn.register_converter("shout", upper_text);

    let mut cur = conn.execute("SELECT code FROM t", None).unwrap();
    assert_eq!(cur.description().unwrap()[0].name, "code");
    assert_eq!(cur.fetch_one().unwrap()[0], Value::Text("ABC".into()));
}

#[test]
fn test_cursors_share_the_connection() {
    let t = ScriptedTransport::new();
    t.respond(r#"{"results":[{"columns":["a"],"types":["integer"],"values":[[1]]}]}"#);
    t.respond(r#"{"results":[{"columns":["b"],"types":["integer"],"values":[[2]]}]}"#);
    let conn = connect(&t);

    let mut first = conn.execute("SELECT a FROM t", None).unwrap();
    let mut second = conn.execute("SELECT b FROM t", None).unwrap();
    assert_eq!(first.fetch_one().unwrap()["a"], Value::Integer(1));
    assert_eq!(second.fetch_one().unwrap()["b"], Value::Integer(2));
    assert!(std::ptr::eq(first.connection(), &conn));
}

#[test]
fn test_fetch_response_hands_back_raw_response() {
    let t = ScriptedTransport::new();
    t.respond(r#"{"results":[]}"#);
    let conn = connect(&t);

    let resp = conn
        .fetch_response(&HttpRequest::get("/db/query").query_param("q", "SELECT 1"))
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, r#"{"results":[]}"#);
}

#[test]
fn test_commit_is_noop_and_rollback_unsupported() {
    let t = ScriptedTransport::new();
    let conn = connect(&t);
    conn.commit().unwrap();
    assert!(matches!(conn.rollback(), Err(DbError::NotSupported("rollback"))));
    assert!(t.requests().is_empty());
    conn.close();
}
