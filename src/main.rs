use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Attribute, Cell, ContentArrangement, Table as TermTable};
use serde_json::{json, Value};
use sirene_search::config::{load_config, API_KEY_ENV};
use sirene_search::models::{cell_text, EndpointKind, SearchRequest, Table, MAX_PAGE_SIZE};
use sirene_search::query;
use sirene_search::utils::{is_terminal, truncate_with_ellipsis, MAX_CELL_WIDTH};
use sirene_search::{ResponseHeader, SireneClient};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Sirene Search - query the INSEE Sirene business registry
#[derive(Parser, Debug)]
#[command(name = "sirene-search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Look up and search French companies and establishments in the INSEE Sirene registry", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds (overrides the configuration)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Show all environment variables
    #[arg(long)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Tab-separated values
    Plain,
}

/// Search scope
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Endpoint {
    /// Establishments (etablissements)
    Siret,
    /// Legal units (unitesLegales)
    Siren,
}

impl From<Endpoint> for EndpointKind {
    fn from(endpoint: Endpoint) -> Self {
        match endpoint {
            Endpoint::Siret => EndpointKind::Siret,
            Endpoint::Siren => EndpointKind::Siren,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch one record by SIRET or SIREN
    #[command(alias = "l")]
    Lookup {
        /// Scope of the identifier
        #[arg(value_enum)]
        endpoint: Endpoint,

        /// SIRET (14 digits) or SIREN (9 digits)
        id: String,
    },

    /// Multi-criteria search with cursor pagination
    #[command(alias = "s")]
    Search {
        /// Scope to search
        #[arg(long, short, value_enum, default_value_t = Endpoint::Siret)]
        endpoint: Endpoint,

        /// Boolean query, e.g. "codePostalEtablissement:75001 AND dateCreationEtablissement:2021-02"
        #[arg(long = "query", short = 'q')]
        q: Option<String>,

        /// Fields to return (champs), comma-separated
        #[arg(long)]
        fields: Option<String>,

        /// Sort expression (tri)
        #[arg(long)]
        sort: Option<String>,

        /// Records per page (at most 1000)
        #[arg(long, default_value_t = MAX_PAGE_SIZE)]
        page_size: usize,

        /// Stop after this many records
        #[arg(long, short = 'n')]
        max_rows: Option<usize>,

        /// Seconds to wait after a 429 and between pages
        #[arg(long, default_value_t = 1.0)]
        retry_delay: f64,

        /// Attempts per page while rate limited
        #[arg(long, default_value_t = 5)]
        max_retries: u32,
    },

    /// Print the normalized form of a query and check its structure
    #[command(alias = "norm")]
    Normalize {
        /// Query to normalize
        q: String,
    },
}

fn print_env_vars() {
    println!("Sirene Search Environment Variables");
    println!("===================================");
    println!();
    println!("Credential:");
    println!("  {}               API key sent in the X-INSEE-API-Key-Integration header (required)", API_KEY_ENV);
    println!();
    println!("Settings (override the config file):");
    println!("  SIRENE_BASE_URL             API base URL (default: https://api.insee.fr/api-sirene/3.11)");
    println!("  SIRENE_TIMEOUT_SECS         Per-request timeout in seconds (default: 10)");
    println!("  SIRENE_USER_AGENT           User agent sent with every request");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging level (e.g., debug, info, warn, error)");
    println!();
    println!("A .env file in the working directory is read at startup.");
    std::process::exit(0);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
    }

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("sirene_search={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Some(command) = cli.command else {
        eprintln!("No command given. Run with --help for usage.");
        return Ok(());
    };

    match command {
        Commands::Normalize { q } => {
            // Offline: no credential needed
            let normalized = query::normalize(&q);
            query::validate(&normalized).context("query rejected")?;
            println!("{}", normalized);
        }
        Commands::Lookup { endpoint, id } => {
            let client = connect(cli.config.as_deref(), cli.timeout)?;
            let record = client.lookup(endpoint.into(), &id).await?;
            output_record(&record, resolve_format(cli.output));
        }
        Commands::Search {
            endpoint,
            q,
            fields,
            sort,
            page_size,
            max_rows,
            retry_delay,
            max_retries,
        } => {
            let retry_delay = Duration::try_from_secs_f64(retry_delay)
                .context("--retry-delay must be a non-negative number of seconds")?;

            let mut request = SearchRequest::new(endpoint.into())
                .page_size(page_size)
                .retry_delay(retry_delay)
                .max_retries(max_retries);
            request.q = q;
            request.fields = fields;
            request.sort = sort;
            request.max_rows = max_rows;

            let client = connect(cli.config.as_deref(), cli.timeout)?;
            let result = client.search(&request).await?;
            if !cli.quiet {
                print_summary(result.table.len(), &result.header);
            }
            output_table(&result.table, &result.header, resolve_format(cli.output));
        }
    }

    Ok(())
}

/// Load the configuration (missing credential is fatal) and build the client
fn connect(config_path: Option<&Path>, timeout: Option<u64>) -> Result<SireneClient> {
    let mut config =
        load_config(config_path).context("cannot start without a valid configuration")?;
    if let Some(secs) = timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(SireneClient::new(&config)?)
}

fn resolve_format(format: OutputFormat) -> OutputFormat {
    if format == OutputFormat::Auto {
        if is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        format
    }
}

fn print_summary(rows: usize, header: &ResponseHeader) {
    match header.total {
        Some(total) => eprintln!("Fetched {} rows (provider total: {})", rows, total),
        None => eprintln!("Fetched {} rows", rows),
    }
}

fn new_term_table(header: Vec<&str>) -> TermTable {
    let mut table = TermTable::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        header
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );
    table
}

fn output_record(record: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let flat = Table::from_records(std::slice::from_ref(record));
            let mut table = new_term_table(vec!["Field", "Value"]);
            for column in flat.columns() {
                table.add_row(vec![
                    Cell::new(column),
                    Cell::new(truncate_with_ellipsis(
                        &cell_text(flat.get(0, column)),
                        MAX_CELL_WIDTH * 2,
                    )),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Plain => {
            let flat = Table::from_records(std::slice::from_ref(record));
            for column in flat.columns() {
                println!("{}\t{}", column, cell_text(flat.get(0, column)));
            }
        }
        OutputFormat::Json | OutputFormat::Auto => print_json(record),
    }
}

fn output_table(result: &Table, header: &ResponseHeader, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Auto => {
            print_json(&json!({ "header": header, "rows": result.to_json_rows() }));
        }
        OutputFormat::Plain => {
            println!("{}", result.columns().join("\t"));
            for row in result.rows() {
                let cells: Vec<String> = row.iter().map(|cell| cell_text(cell.as_ref())).collect();
                println!("{}", cells.join("\t"));
            }
        }
        OutputFormat::Table => {
            if result.is_empty() {
                println!("No results.");
                return;
            }
            let mut table = new_term_table(result.columns().iter().map(String::as_str).collect());
            for row in result.rows() {
                table.add_row(row.iter().map(|cell| {
                    Cell::new(truncate_with_ellipsis(&cell_text(cell.as_ref()), MAX_CELL_WIDTH))
                }));
            }
            println!("{table}");
        }
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_version() {
        let version = env!("CARGO_PKG_VERSION");
        let parts: Vec<&str> = version.split('.').collect();
        assert!(parts.len() >= 2);
        assert!(parts[0].parse::<u32>().is_ok());
    }

    #[test]
    fn test_cli_parses_search() {
        let cli = Cli::try_parse_from([
            "sirene-search",
            "search",
            "--endpoint",
            "siren",
            "-q",
            "siren:1*",
            "--max-rows",
            "5",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Search {
                endpoint,
                q,
                max_rows,
                page_size,
                max_retries,
                ..
            }) => {
                assert_eq!(endpoint, Endpoint::Siren);
                assert_eq!(q.as_deref(), Some("siren:1*"));
                assert_eq!(max_rows, Some(5));
                assert_eq!(page_size, 1000);
                assert_eq!(max_retries, 5);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_endpoint() {
        assert!(Cli::try_parse_from(["sirene-search", "lookup", "naf", "123"]).is_err());
    }

    #[test]
    fn test_endpoint_mapping() {
        assert_eq!(EndpointKind::from(Endpoint::Siret), EndpointKind::Siret);
        assert_eq!(EndpointKind::from(Endpoint::Siren), EndpointKind::Siren);
    }

    #[test]
    fn test_resolve_explicit_format() {
        assert_eq!(resolve_format(OutputFormat::Plain), OutputFormat::Plain);
        assert_eq!(resolve_format(OutputFormat::Json), OutputFormat::Json);
    }
}
