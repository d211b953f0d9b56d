//! JSON I/O handling for CLI
//!
//! - Input: JSON files named on the command line, UTF-8
//! - Output: a single JSON object per invocation on stdout

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read and parse a JSON file
pub fn read_json_file(path: &Path) -> CliResult<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))?;
    if content.trim().is_empty() {
        return Err(CliError::invalid_input(format!(
            "{} is empty",
            path.display()
        )));
    }
    serde_json::from_str(&content)
        .map_err(|e| CliError::invalid_input(format!("{}: {}", path.display(), e)))
}

/// Read a documents file: an array is the document list, anything else
/// is a single document
pub fn read_documents(path: &Path) -> CliResult<Vec<Value>> {
    match read_json_file(path)? {
        Value::Array(items) => Ok(items),
        single => Ok(vec![single]),
    }
}

/// Write a success response
pub fn write_response_to(out: &mut impl Write, data: Value) -> CliResult<()> {
    let response = json!({
        "status": "ok",
        "data": data
    });
    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Write an error response
pub fn write_error_to(out: &mut impl Write, code: &str, message: &str) -> CliResult<()> {
    let response = json!({
        "status": "error",
        "code": code,
        "message": message
    });
    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_response_to(&mut io::stdout().lock(), data)
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_error_to(&mut io::stdout().lock(), code, message)
}
