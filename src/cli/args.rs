//! CLI argument definitions using clap
//!
//! Commands:
//! - queryspec compile --condition <path>
//! - queryspec explain --condition <path>
//! - queryspec query --condition <path> --documents <path>
//! - queryspec count --condition <path> --documents <path>
//! - queryspec exists --condition <path> --documents <path>
//! - queryspec aggregate --documents <path> --field SUM:price

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// queryspec - compile and run declarative query conditions
#[derive(Parser, Debug)]
#[command(name = "queryspec")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Condition input shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ConditionArgs {
    /// Path to a condition JSON file; an empty condition when omitted
    #[arg(long)]
    pub condition: Option<PathBuf>,
}

/// Condition plus the documents it runs against
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    #[command(flatten)]
    pub condition: ConditionArgs,

    /// Path to a documents JSON file (array or single object)
    #[arg(long)]
    pub documents: PathBuf,

    /// Entity name used in messages
    #[arg(long, default_value = "documents")]
    pub entity: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a condition and print the compiled spec
    Compile {
        #[command(flatten)]
        input: ConditionArgs,

        /// Compile for a count/aggregate result (no fetch joins)
        #[arg(long)]
        scalar: bool,
    },

    /// Print the explain plan of a condition
    Explain {
        #[command(flatten)]
        input: ConditionArgs,

        #[arg(long)]
        scalar: bool,
    },

    /// Run a condition and print one page of matching documents
    Query {
        #[command(flatten)]
        source: SourceArgs,

        /// Zero-based page number
        #[arg(long)]
        page: Option<usize>,

        /// Page size
        #[arg(long)]
        size: Option<usize>,

        /// Sort key as `field` or `field:asc|desc`; repeatable
        #[arg(long = "sort")]
        sort: Vec<String>,
    },

    /// Count matching documents
    Count {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Report whether any document matches
    Exists {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Aggregate over matching documents
    Aggregate {
        #[command(flatten)]
        source: SourceArgs,

        /// Aggregate as `TYPE:path[:alias]`, e.g. `SUM:price`; repeatable
        #[arg(long = "field", required = true)]
        fields: Vec<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
