use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::{DbError, DbResult};

/// Top-level body of `/db/query` and `/db/execute` responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub results: Option<Vec<Map<String, JsonValue>>>,
}

/// The `columns`/`types`/`values` part of one statement result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    #[serde(default)]
    pub types: Option<Vec<String>>,
    #[serde(default)]
    pub values: Option<Vec<Vec<JsonValue>>>,
}

/// What a statement failure does to the rest of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnItemError {
    Abort,
    LogAndContinue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Sum of `rows_affected`, or -1 when no item reported it.
    pub rows_affected: i64,
    pub last_insert_id: Option<i64>,
    /// Result set of the last item that carried `columns`.
    pub result_set: Option<ResultSet>,
}

pub fn interpret(payload: Payload, on_error: OnItemError) -> DbResult<Outcome> {
    let mut rows_affected: Option<i64> = None;
    let mut last_insert_id = None;
    let mut result_set = None;

    for item in payload.results.unwrap_or_default() {
        if item.contains_key("error") {
            let item_json = serde_json::to_string(&item)?;
            tracing::error!("{item_json}");
            match on_error {
                OnItemError::Abort => return Err(DbError::Database(item_json)),
                OnItemError::LogAndContinue => {}
            }
        }

        if let Some(n) = item.get("rows_affected").and_then(JsonValue::as_i64) {
            rows_affected = Some(rows_affected.unwrap_or(0) + n);
        }
        if let Some(id) = item.get("last_insert_id").and_then(JsonValue::as_i64) {
            last_insert_id = Some(id);
        }
        if item.contains_key("columns") {
            result_set = Some(serde_json::from_value::<ResultSet>(JsonValue::Object(item))?);
        }
    }

    Ok(Outcome {
        rows_affected: rows_affected.unwrap_or(-1),
        last_insert_id,
        result_set,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn payload(body: &str) -> Payload {
        serde_json::from_str(body).unwrap()
    }

    #[rstest]
    fn test_sums_rows_affected_and_keeps_last_insert_id() {
        let p = payload(
            r#"{"results":[
                {"last_insert_id":1,"rows_affected":1,"time":0.001},
                {"last_insert_id":2,"rows_affected":2}
            ]}"#,
        );
        let o = interpret(p, OnItemError::Abort).unwrap();
        assert_eq!(o.rows_affected, 3);
        assert_eq!(o.last_insert_id, Some(2));
        assert_eq!(o.result_set, None);
    }

    #[rstest]
    #[case(r#"{}"#)]
    #[case(r#"{"results":[]}"#)]
    #[case(r#"{"results":[{"columns":["a"],"types":["text"]}]}"#)]
    fn test_rows_affected_unknown(#[case] body: &str) {
        let o = interpret(payload(body), OnItemError::Abort).unwrap();
        assert_eq!(o.rows_affected, -1);
    }

    #[rstest]
    fn test_zero_rows_affected_is_not_unknown() {
        let o = interpret(payload(r#"{"results":[{"rows_affected":0}]}"#), OnItemError::Abort).unwrap();
        assert_eq!(o.rows_affected, 0);
    }

    #[rstest]
    fn test_last_result_set_wins() {
        let p = payload(
            r#"{"results":[
                {"columns":["a"],"types":["integer"],"values":[[1]]},
                {"columns":["b"],"types":["text"],"values":[["x"]]}
            ]}"#,
        );
        let rs = interpret(p, OnItemError::Abort).unwrap().result_set.unwrap();
        assert_eq!(rs.columns, vec!["b".to_string()]);
        assert_eq!(rs.values, Some(vec![vec![JsonValue::from("x")]]));
    }

    #[rstest]
    fn test_error_aborts_with_item_json() {
        let p = payload(r#"{"results":[{"rows_affected":1},{"error":"no such table: t"},{"rows_affected":1}]}"#);
        match interpret(p, OnItemError::Abort) {
            Err(DbError::Database(msg)) => assert_eq!(msg, r#"{"error":"no such table: t"}"#),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[rstest]
    fn test_error_is_skipped_when_continuing() {
        let p = payload(r#"{"results":[{"rows_affected":1},{"error":"UNIQUE constraint failed"},{"rows_affected":1}]}"#);
        let o = interpret(p, OnItemError::LogAndContinue).unwrap();
        assert_eq!(o.rows_affected, 2);
    }
}
