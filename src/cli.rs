//! Command line interface.
//!
//! ```text
//! docql explain "select * from God where age > @age" --param age=12
//! docql run "select name from God order by age desc" --data gods.json
//! docql run "select * from God" --data gods.json --async --config docql.toml
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use docql_core::{FieldValue, IdentityResolver, Params, QueryParser};

use crate::config::Config;
use crate::future::callback_future;
use crate::store::MemoryStore;

#[derive(Parser, Debug)]
#[command(name = "docql")]
#[command(about = "Query JSON documents with a small SQL-like select language", long_about = None)]
pub struct CliArgs {
    /// TOML file with parser limits
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the store query a select translates to
    Explain {
        /// Query text
        query: String,

        /// Parameter binding, e.g. --param age=12 or --param 'names=["Ada","Zeus"]'
        #[arg(long = "param", short, value_parser = parse_param)]
        params: Vec<(String, FieldValue)>,
    },

    /// Run a select against documents loaded from a JSON file
    Run {
        /// Query text
        query: String,

        /// JSON file shaped like {"collection": [documents...]}
        #[arg(long)]
        data: PathBuf,

        /// Parameter binding, e.g. --param age=12
        #[arg(long = "param", short, value_parser = parse_param)]
        params: Vec<(String, FieldValue)>,

        /// Execute through the callback-based store interface
        #[arg(long = "async")]
        run_async: bool,
    },
}

/// Parse `name=value`. The value is read as JSON when it parses, otherwise
/// taken as a plain string.
pub fn parse_param(raw: &str) -> Result<(String, FieldValue), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))?;

    let name = name.trim().trim_start_matches('@');
    if name.is_empty() {
        return Err(format!("missing parameter name in '{}'", raw));
    }

    let value = match serde_json::from_str::<serde_json::Value>(value) {
        Ok(json) => FieldValue::from_json(&json).map_err(|e| e.to_string())?,
        Err(_) => FieldValue::String(value.to_string()),
    };

    Ok((name.to_string(), value))
}

/// Execute a command and return what should be printed.
pub async fn execute(args: CliArgs) -> anyhow::Result<String> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env(),
    };
    let parser = QueryParser::with_limits(config.query_limits());

    match args.command {
        Command::Explain { query, params } => cmd_explain(&parser, &query, params),
        Command::Run {
            query,
            data,
            params,
            run_async,
        } => cmd_run(&parser, &query, &data, params, run_async).await,
    }
}

fn cmd_explain(
    parser: &QueryParser,
    query: &str,
    params: Vec<(String, FieldValue)>,
) -> anyhow::Result<String> {
    let params: Params = params.into_iter().collect();
    let document_query = parser.explain(query, &params, &IdentityResolver)?;
    Ok(serde_json::to_string_pretty(&document_query)?)
}

async fn cmd_run(
    parser: &QueryParser,
    query: &str,
    data: &Path,
    params: Vec<(String, FieldValue)>,
    run_async: bool,
) -> anyhow::Result<String> {
    let store = load_store(data)?;

    let docs = if params.is_empty() {
        if run_async {
            let (callback, results) = callback_future();
            parser.query_async(query, &store, callback, &IdentityResolver)?;
            results.await?
        } else {
            parser.query(query, &store, &IdentityResolver)?
        }
    } else {
        let mut statement = parser.prepare(query, &store, &IdentityResolver)?;
        for (name, value) in params {
            statement.bind(name, value);
        }

        if run_async {
            let (callback, results) = callback_future();
            statement.result_list_async(callback)?;
            results.await?
        } else {
            statement.result_list()?
        }
    };

    tracing::info!("{} document(s) returned", docs.len());
    Ok(serde_json::to_string_pretty(&docs)?)
}

/// Load a JSON data file into a fresh memory store
pub fn load_store(path: &Path) -> anyhow::Result<MemoryStore> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file {}", path.display()))?;
    let data: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    Ok(MemoryStore::from_json(data)?)
}
