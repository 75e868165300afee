mod cli;
mod io;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use rqlite_cursor::{Connection, DbResult};

use crate::{cli::Args, io::NdjsonOut};

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(&args.log_level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code(), "{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> DbResult<()> {
    let conn = Connection::connect(args.connect_options())?;
    let mut cursor = conn.cursor();
    if args.batch.is_empty() {
        let params = args.parameters()?;
        cursor.execute(&args.sql, (!params.is_empty()).then_some(params.as_slice()))?;
    } else {
        cursor.executemany(&args.sql, args.parameter_sets()?)?;
    }

    let mut out = NdjsonOut::new();
    if let Some(description) = cursor.description() {
        let columns: Vec<&str> = description.iter().map(|d| d.name.as_str()).collect();
        out.write_json_line(&serde_json::json!({ "columns": columns }))?;
    }
    for row in &mut cursor {
        out.write_json_line(&row)?;
    }
    out.write_json_line(&serde_json::json!({
        "rowcount": cursor.rowcount(),
        "lastrowid": cursor.lastrowid(),
    }))?;
    out.flush()
}
