//! CLI module for queryspec
//!
//! Provides command-line interface for:
//! - compile: Print the compiled spec of a condition
//! - explain: Print the explain plan of a condition
//! - query: Run a condition over a documents file, one page
//! - count / exists / aggregate: Scalar results over a documents file

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, ConditionArgs, SourceArgs};
pub use commands::{
    aggregate, compile, count, exists, explain, load_config, query, run, run_command,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{
    read_documents, read_json_file, write_error, write_error_to, write_response, write_response_to,
};
