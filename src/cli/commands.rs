//! CLI command implementations
//!
//! Each command returns the `data` payload of its response; `run` wraps
//! it in the response envelope and writes it to stdout.

use std::fs;
use std::io;
use std::path::Path;

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use crate::compiler::{ExplainPlan, ResultShape, SpecCompiler};
use crate::config::EngineConfig;
use crate::executor::{SortDirection, SortField};
use crate::repository::{
    AggregationField, AggregationType, InMemoryRepository, PageRequest, SpecificationExecutor,
};
use crate::spec::QueryCondition;

use super::args::{Cli, Command, ConditionArgs, SourceArgs};
use super::errors::{CliError, CliResult};
use super::io::{read_documents, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments, loads configuration, installs the log subscriber and
/// dispatches. This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let result = load_config(cli.config.as_deref()).and_then(|config| {
        init_logging(&config);
        run_command(cli.command, &config)
    });

    match result {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command, config: &EngineConfig) -> CliResult<Value> {
    match cmd {
        Command::Compile { input, scalar } => compile(&input, scalar),
        Command::Explain { input, scalar } => explain(&input, scalar),
        Command::Query {
            source,
            page,
            size,
            sort,
        } => query(config, &source, page_request(config, page, size, &sort)?),
        Command::Count { source } => count(config, &source),
        Command::Exists { source } => exists(config, &source),
        Command::Aggregate { source, fields } => aggregate(config, &source, &fields),
    }
}

/// Loads the config file, or the defaults when none is given
pub fn load_config(path: Option<&Path>) -> CliResult<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => Ok(EngineConfig::default()),
    }
}

/// `RUST_LOG` wins over the configured filter; logs go to stderr
fn init_logging(config: &EngineConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Compile a condition and return the compiled spec
pub fn compile(input: &ConditionArgs, scalar: bool) -> CliResult<Value> {
    let condition = read_condition(input)?;
    let spec = SpecCompiler::compile_for(&condition, shape(scalar))?;
    Ok(serde_json::to_value(&spec)?)
}

/// Explain a condition; a rejected condition still yields a plan
pub fn explain(input: &ConditionArgs, scalar: bool) -> CliResult<Value> {
    let condition = read_condition(input)?;
    let plan = match SpecCompiler::compile_for(&condition, shape(scalar)) {
        Ok(spec) => ExplainPlan::from_spec(&spec),
        Err(err) => ExplainPlan::from_error(&err),
    };
    Ok(json!({
        "plan": serde_json::to_value(&plan)?,
        "text": plan.to_string(),
    }))
}

/// Run a condition and return one page of matches
pub fn query(
    config: &EngineConfig,
    source: &SourceArgs,
    request: Option<PageRequest>,
) -> CliResult<Value> {
    let (repository, condition) = open(config, source)?;
    let page = repository.find_page(&condition, request.as_ref())?;
    Ok(serde_json::to_value(&page)?)
}

pub fn count(config: &EngineConfig, source: &SourceArgs) -> CliResult<Value> {
    let (repository, condition) = open(config, source)?;
    Ok(json!({ "count": repository.count(&condition)? }))
}

pub fn exists(config: &EngineConfig, source: &SourceArgs) -> CliResult<Value> {
    let (repository, condition) = open(config, source)?;
    Ok(json!({ "exists": repository.exists(&condition)? }))
}

pub fn aggregate(config: &EngineConfig, source: &SourceArgs, fields: &[String]) -> CliResult<Value> {
    let fields = fields
        .iter()
        .map(|f| parse_aggregation(f))
        .collect::<CliResult<Vec<_>>>()?;
    let (repository, condition) = open(config, source)?;
    Ok(Value::Object(repository.aggregate(&condition, &fields)?))
}

fn shape(scalar: bool) -> ResultShape {
    if scalar {
        ResultShape::Scalar
    } else {
        ResultShape::Entity
    }
}

fn read_condition(input: &ConditionArgs) -> CliResult<QueryCondition> {
    let Some(path) = input.condition.as_deref() else {
        return Ok(QueryCondition::new());
    };
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))?;
    Ok(QueryCondition::from_json(&content)?)
}

fn open(
    config: &EngineConfig,
    source: &SourceArgs,
) -> CliResult<(InMemoryRepository, QueryCondition)> {
    let condition = read_condition(&source.condition)?;
    let documents = read_documents(&source.documents)?;
    let repository =
        InMemoryRepository::with_config(source.entity.as_str(), config).with_documents(documents);
    Ok((repository, condition))
}

/// Builds a page request; `None` when no paging option was given
fn page_request(
    config: &EngineConfig,
    page: Option<usize>,
    size: Option<usize>,
    sort: &[String],
) -> CliResult<Option<PageRequest>> {
    if page.is_none() && size.is_none() && sort.is_empty() {
        return Ok(None);
    }
    let sort_fields = sort
        .iter()
        .map(|s| parse_sort(s))
        .collect::<CliResult<Vec<_>>>()?;
    let request = PageRequest::of(
        page.unwrap_or(0),
        size.unwrap_or(config.pagination.default_page_size),
    )
    .with_sort_fields(sort_fields);
    Ok(Some(request))
}

/// `field` or `field:asc|desc`
fn parse_sort(text: &str) -> CliResult<SortField> {
    let (field, direction) = match text.split_once(':') {
        Some((field, direction)) => (field, SortDirection::parse(direction)),
        None => (text, SortDirection::Asc),
    };
    if field.trim().is_empty() {
        return Err(CliError::invalid_input(format!("empty sort field in '{}'", text)));
    }
    Ok(SortField {
        field: field.trim().to_string(),
        direction,
    })
}

/// `TYPE:path[:alias]`, or a bare `COUNT`
fn parse_aggregation(text: &str) -> CliResult<AggregationField> {
    let mut parts = text.splitn(3, ':');
    let kind = parts.next().unwrap_or_default();
    let aggregation_type = AggregationType::parse(kind)
        .ok_or_else(|| CliError::invalid_input(format!("unknown aggregation '{}'", kind)))?;

    let field = match (aggregation_type, parts.next()) {
        (AggregationType::Count, None) => AggregationField::count(),
        (_, Some(path)) if !path.trim().is_empty() => {
            AggregationField::of(path.trim(), aggregation_type)
        }
        _ => {
            return Err(CliError::invalid_input(format!(
                "aggregation '{}' needs a field path",
                text
            )))
        }
    };
    Ok(match parts.next() {
        Some(alias) if !alias.trim().is_empty() => field.with_alias(alias.trim()),
        _ => field,
    })
}
