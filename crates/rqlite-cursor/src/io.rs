use std::io::{BufWriter, Write};

use rqlite_cursor::DbResult;

/// Newline-delimited JSON on stdout.
pub struct NdjsonOut {
    stdout: BufWriter<std::io::Stdout>,
}

impl NdjsonOut {
    pub fn new() -> Self {
        Self {
            stdout: BufWriter::new(std::io::stdout()),
        }
    }

    pub fn write_json_line<T: serde::Serialize>(&mut self, v: &T) -> DbResult<()> {
        serde_json::to_writer(&mut self.stdout, v)?;
        self.stdout.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> DbResult<()> {
        self.stdout.flush()?;
        Ok(())
    }
}
