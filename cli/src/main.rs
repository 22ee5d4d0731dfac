//! Stardog CLI — command-line interface for a Stardog server
//!
//! Queries go straight to the database; writes run inside a transaction that
//! is committed on success and rolled back on failure.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use stardog::{
    Database, QueryOptions, QueryResults, RdfFormat, RdfTerm, ReasoningLevel, Server,
    ServerConfig,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stardog", version, about = "Stardog RDF triplestore CLI")]
struct Cli {
    /// Server HTTP URL
    #[arg(long, default_value = stardog::config::DEFAULT_URL, global = true, env = "STARDOG_URL")]
    url: String,

    /// Username for HTTP Basic authentication
    #[arg(long, global = true, env = "STARDOG_USERNAME")]
    username: Option<String>,

    /// Password for HTTP Basic authentication
    #[arg(long, global = true, env = "STARDOG_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Database name
    #[arg(long, global = true, env = "STARDOG_DB")]
    db: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a SPARQL query
    Query {
        /// The SPARQL query string
        sparql: String,

        /// Reasoning level (NONE, RDFS, QL, RL, EL, DL)
        #[arg(long)]
        reasoning: Option<ReasoningLevel>,

        #[arg(long)]
        limit: Option<u64>,

        #[arg(long)]
        offset: Option<u64>,

        /// Base URI used to resolve relative IRIs in the query
        #[arg(long)]
        base_uri: Option<String>,
    },
    /// Print the number of triples in the database
    Size,
    /// Add the statements in a file
    Add(UpdateArgs),
    /// Remove the statements in a file
    Remove(UpdateArgs),
    /// Clear a named graph, or the whole database
    Clear {
        #[arg(long)]
        graph_uri: Option<String>,
    },
}

#[derive(clap::Args)]
struct UpdateArgs {
    /// RDF file to send
    file: PathBuf,

    /// RDF format (MIME type or short name); guessed from the extension if absent
    #[arg(long)]
    format: Option<RdfFormat>,

    /// Named graph to update
    #[arg(long)]
    graph_uri: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ServerConfig::new(&cli.url);
    if let Some(username) = &cli.username {
        config = config.with_credentials(username, cli.password.as_deref().unwrap_or_default());
    }
    let server = Server::new(config).context("failed to create client")?;

    let Some(name) = cli.db.as_deref() else {
        bail!("no database given (use --db or STARDOG_DB)");
    };
    let db = server.db(name);

    match cli.command {
        Commands::Query { sparql, reasoning, limit, offset, base_uri } => {
            let options = QueryOptions {
                base_uri,
                limit,
                offset,
                reasoning,
            };
            run_query(&db, &sparql, &options, &cli.output).await
        }
        Commands::Size => {
            let size = db.size().await.context("size request failed")?;
            println!("{}", size);
            Ok(())
        }
        Commands::Add(args) => run_update(&db, Update::Add, &args).await,
        Commands::Remove(args) => run_update(&db, Update::Remove, &args).await,
        Commands::Clear { graph_uri } => run_clear(&db, graph_uri.as_deref()).await,
    }
}

async fn run_query(
    db: &Database,
    sparql: &str,
    options: &QueryOptions,
    output: &OutputFormat,
) -> Result<()> {
    let results = db.query(sparql, options).await.context("query failed")?;

    if let Some(answer) = results.as_bool() {
        println!("{}", answer);
        return Ok(());
    }

    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        OutputFormat::Csv => {
            let variables = results.variables();
            if !variables.is_empty() {
                println!("{}", variables.join(","));
                for row in rows(&results, format_csv_value) {
                    println!("{}", row.join(","));
                }
            }
        }
        OutputFormat::Table => {
            if results.variables().is_empty() {
                println!("(no results)");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(results.variables());

            for row in rows(&results, |t| t.to_string()) {
                table.add_row(row);
            }

            println!("{}", table);
            println!("{} row(s)", results.len());
        }
    }

    Ok(())
}

#[derive(Clone, Copy)]
enum Update {
    Add,
    Remove,
}

async fn run_update(db: &Database, update: Update, args: &UpdateArgs) -> Result<()> {
    let format = match args.format {
        Some(format) => format,
        None => guess_format(&args.file)?,
    };
    let data = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let mut tx = db.begin().await.context("failed to begin transaction")?;
    let graph = args.graph_uri.as_deref();
    let outcome = match update {
        Update::Add => tx.add(&data, format, graph).await,
        Update::Remove => tx.remove(&data, format, graph).await,
    };

    if let Err(e) = outcome {
        if let Err(rollback_err) = tx.rollback().await {
            warn!("Rollback after failed update also failed: {}", rollback_err);
        }
        return Err(e).context("update failed, transaction rolled back");
    }

    tx.commit().await.context("commit failed")?;
    println!("Committed transaction {}", tx.id().unwrap_or_default());
    Ok(())
}

async fn run_clear(db: &Database, graph_uri: Option<&str>) -> Result<()> {
    let mut tx = db.begin().await.context("failed to begin transaction")?;

    if let Err(e) = tx.clear(graph_uri).await {
        if let Err(rollback_err) = tx.rollback().await {
            warn!("Rollback after failed clear also failed: {}", rollback_err);
        }
        return Err(e).context("clear failed, transaction rolled back");
    }

    tx.commit().await.context("commit failed")?;
    println!("Cleared {}", graph_uri.unwrap_or("all graphs"));
    Ok(())
}

fn guess_format(path: &Path) -> Result<RdfFormat> {
    match RdfFormat::from_path(path) {
        Some(format) => Ok(format),
        None => bail!(
            "cannot infer RDF format of {}, pass --format",
            path.display()
        ),
    }
}

/// One row per solution, columns in variable order; unbound cells are empty
fn rows(results: &QueryResults, render: impl Fn(&RdfTerm) -> String) -> Vec<Vec<String>> {
    results
        .iter()
        .map(|solution| {
            results
                .variables()
                .iter()
                .map(|var| solution.get(var).map(&render).unwrap_or_default())
                .collect()
        })
        .collect()
}

fn format_csv_value(term: &RdfTerm) -> String {
    let s = term.value();
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
