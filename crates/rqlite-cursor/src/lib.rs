//! Cursor-style client for the rqlite HTTP API.
//!
//! Statements go out as plain HTTP requests: `SELECT`/`PRAGMA` to
//! `GET /db/query`, everything else to `POST /db/execute?transaction`.
//! Parameters are spliced into the SQL text as literals before sending.
//!
//! ```no_run
//! use rqlite_cursor::{params, ConnectOptions, Connection};
//!
//! let conn = Connection::connect(ConnectOptions::new("localhost", 4001))?;
//! let mut cur = conn.cursor();
//! cur.execute("INSERT INTO t VALUES (?,?)", Some(params![1, "a"].as_slice()))?;
//! cur.execute("SELECT * FROM t", None)?;
//! for row in &mut cur {
//!     println!("{:?}", row.get_by_name("id"));
//! }
//! # Ok::<(), rqlite_cursor::DbError>(())
//! ```

pub mod core;
pub mod error;

pub use crate::core::{
    adapt::adapt,
    connection::{ConnectOptions, Connection, Scheme, PARSE_COLNAMES, PARSE_DECLTYPES},
    convert::{strip_column_name, Converter, ConverterRegistry, ParseFlags},
    cursor::{Cursor, Rows, ScrollMode},
    transport::{HttpRequest, HttpResponse, HttpTransport, Method, Transport},
    types::{ColumnDescription, Row, Value},
};
pub use crate::error::{DbError, DbResult};
