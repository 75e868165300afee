use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::Level;

use crate::{
    core::{
        connection::Connection,
        convert::{passthrough, strip_column_name},
        params::{is_query_command, sql_command, substitute_params},
        response::{interpret, OnItemError, Payload, ResultSet},
        transport::HttpRequest,
        types::{ColumnDescription, Row, Value},
    },
    error::{DbError, DbResult},
};

pub const QUERY_PATH: &str = "/db/query";
pub const EXECUTE_PATH: &str = "/db/execute?transaction";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    Relative,
    Absolute,
}

/// Forward-only cursor over the result of the last `execute`/`executemany`.
#[derive(Debug)]
pub struct Cursor<'c> {
    connection: &'c Connection,
    description: Option<Vec<ColumnDescription>>,
    rowcount: i64,
    lastrowid: Option<i64>,
    arraysize: usize,
    rownumber: usize,
    rows: Option<Vec<Row>>,
}

impl<'c> Cursor<'c> {
    pub fn new(connection: &'c Connection) -> Self {
        Self {
            connection,
            description: None,
            rowcount: -1,
            lastrowid: None,
            arraysize: 1,
            rownumber: 0,
            rows: None,
        }
    }

    pub fn connection(&self) -> &'c Connection {
        self.connection
    }

    pub fn description(&self) -> Option<&[ColumnDescription]> {
        self.description.as_deref()
    }

    /// Affected rows after `UPDATE` and `executemany`, materialized rows otherwise.
    pub fn rowcount(&self) -> i64 {
        self.rowcount
    }

    pub fn lastrowid(&self) -> Option<i64> {
        self.lastrowid
    }

    pub fn rownumber(&self) -> usize {
        self.rownumber
    }

    pub fn arraysize(&self) -> usize {
        self.arraysize
    }

    pub fn set_arraysize(&mut self, size: usize) {
        self.arraysize = size;
    }

    fn reset(&mut self) {
        self.description = None;
        self.rowcount = -1;
        self.lastrowid = None;
        self.rownumber = 0;
        self.rows = None;
    }

    pub fn execute(&mut self, operation: &str, parameters: Option<&[Value]>) -> DbResult<&mut Self> {
        self.reset();

        let operation = match parameters {
            Some(p) => substitute_params(operation, p)?,
            None => operation.to_string(),
        };
        let command = sql_command(&operation)?;

        let request = if is_query_command(&command) {
            HttpRequest::get(QUERY_PATH).query_param("q", operation)
        } else {
            execute_request(&[operation])?
        };
        let outcome = interpret(self.request(&request)?, OnItemError::Abort)?;

        let rows = match outcome.result_set {
            Some(rs) => {
                let parse_colnames = self.connection.parse_colnames();
                self.description = Some(
                    rs.columns
                        .iter()
                        .map(|c| ColumnDescription::new(strip_column_name(c, parse_colnames)))
                        .collect(),
                );
                self.materialize(rs)?
            }
            None => Vec::new(),
        };

        if command == "INSERT" {
            self.lastrowid = outcome.last_insert_id;
        }
        // ORMs assert the affected-row count of each UPDATE they emit.
        self.rowcount = if command == "UPDATE" {
            outcome.rows_affected
        } else {
            rows.len() as i64
        };
        self.rows = Some(rows);
        Ok(self)
    }

    /// Runs `operation` once per parameter set in a single transactional request.
    ///
    /// Unlike [`Cursor::execute`], a failing statement is logged and the
    /// remaining results are still aggregated into `rowcount`.
    pub fn executemany<I, P>(&mut self, operation: &str, seq_of_parameters: I) -> DbResult<&mut Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[Value]>,
    {
        self.reset();

        let command = sql_command(operation)?;
        let statements = seq_of_parameters
            .into_iter()
            .map(|p| substitute_params(operation, p.as_ref()))
            .collect::<DbResult<Vec<_>>>()?;

        let outcome = interpret(self.request(&execute_request(&statements)?)?, OnItemError::LogAndContinue)?;

        if command == "INSERT" {
            self.lastrowid = outcome.last_insert_id;
        }
        self.rowcount = outcome.rows_affected;
        self.rows = Some(Vec::new());
        Ok(self)
    }

    pub fn fetch_one(&mut self) -> Option<Row> {
        let row = self.rows.as_ref()?.get(self.rownumber)?.clone();
        self.rownumber += 1;
        Some(row)
    }

    pub fn fetch_all(&mut self) -> Vec<Row> {
        std::iter::from_fn(|| self.fetch_one()).collect()
    }

    pub fn iter<'a>(&'a mut self) -> Rows<'a, 'c> {
        Rows { cursor: self }
    }

    pub fn fetch_many(&mut self, _size: Option<usize>) -> DbResult<Vec<Row>> {
        Err(DbError::NotSupported("fetchmany"))
    }

    pub fn set_input_sizes(&mut self, _sizes: &[Option<usize>]) -> DbResult<()> {
        Err(DbError::NotSupported("setinputsizes"))
    }

    pub fn set_output_size(&mut self, _size: usize, _column: Option<usize>) -> DbResult<()> {
        Err(DbError::NotSupported("setoutputsize"))
    }

    pub fn scroll(&mut self, _value: i64, _mode: ScrollMode) -> DbResult<()> {
        Err(DbError::NotSupported("scroll"))
    }

    /// Use [`Cursor::fetch_one`] or [`Cursor::iter`].
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> DbResult<Row> {
        Err(DbError::NotSupported("next"))
    }

    /// Drops buffered rows. The connection stays usable.
    pub fn close(&mut self) {
        self.rows = None;
    }

    fn request(&self, request: &HttpRequest) -> DbResult<Payload> {
        tracing::debug!(
            method = %request.method,
            uri = %describe_uri(request),
            headers = ?request.headers,
            body = ?request.body,
            "request"
        );
        let response = self.connection.fetch_response(request)?;
        tracing::debug!(status = response.status, reason = %response.reason, "response");
        tracing::debug!("raw response: {}", response.body);

        let json: JsonValue = serde_json::from_str(&response.body)?;
        if tracing::enabled!(Level::TRACE) {
            tracing::trace!("formatted response: {}", serde_json::to_string_pretty(&json)?);
        }
        Ok(serde_json::from_value(json)?)
    }

    fn materialize(&self, rs: ResultSet) -> DbResult<Vec<Row>> {
        let (Some(values), Some(types)) = (rs.values, rs.types) else {
            return Ok(Vec::new());
        };
        if values.is_empty() {
            return Ok(Vec::new());
        }

        let flags = self.connection.options().parse_flags();
        let registry = self.connection.converters();
        let converters: Vec<_> = rs
            .columns
            .iter()
            .zip(&types)
            .map(|(name, decl)| registry.converter_for(name, decl, flags))
            .collect();
        let columns: Arc<[String]> = rs.columns[..converters.len()].iter().cloned().collect();

        let mut rows = Vec::with_capacity(values.len());
        for raw_row in values {
            let mut row = Vec::with_capacity(columns.len());
            for (i, converter) in converters.iter().enumerate() {
                let raw = raw_row.get(i).unwrap_or(&JsonValue::Null);
                let value = match converter {
                    _ if raw.is_null() => Value::Null,
                    Some(convert) => convert(raw).map_err(|message| DbError::Conversion {
                        column: columns[i].clone(),
                        message,
                    })?,
                    None => passthrough(raw),
                };
                row.push(value);
            }
            rows.push(Row::new(Arc::clone(&columns), row));
        }
        Ok(rows)
    }
}

pub struct Rows<'a, 'c> {
    cursor: &'a mut Cursor<'c>,
}

impl Iterator for Rows<'_, '_> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.cursor.fetch_one()
    }
}

impl<'a, 'c> IntoIterator for &'a mut Cursor<'c> {
    type Item = Row;
    type IntoIter = Rows<'a, 'c>;

    fn into_iter(self) -> Rows<'a, 'c> {
        self.iter()
    }
}

fn execute_request(statements: &[String]) -> DbResult<HttpRequest> {
    Ok(HttpRequest::post(EXECUTE_PATH, serde_json::to_string(statements)?)
        .header("Content-Type", "application/json"))
}

fn describe_uri(request: &HttpRequest) -> String {
    if request.query.is_empty() {
        return request.path.clone();
    }
    let query: Vec<String> = request.query.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{}?{}", request.path, query.join("&"))
}
