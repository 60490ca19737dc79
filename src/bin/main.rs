//! filterc - Compile domain filters to SQL
//!
//! Usage:
//!   filterc compile <entity> <filter-json|@file> [--algorithm graph|stack]
//!   filterc select <entity> <filter-json|@file> [--columns a,b] [--limit N] [--offset N] [--check]
//!   filterc chains <entity> <filter-json|@file>
//!   filterc entities
//!
//! Examples:
//!   filterc compile user '{"email": {"equals": "a@b.com"}}'
//!   filterc select application @filters/hired.json --limit 20 --check
//!   filterc chains conversation '{"application": {"user": {"id": {"equals": "u1"}}}}'

use clap::{Parser, Subcommand, ValueEnum};
use domain_filter::compile::{Algorithm, FilterCompiler};
use domain_filter::config::Settings;
use domain_filter::registry::Registry;
use domain_filter::sql::check::validate_sql;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Exit code for configuration problems (settings, registry, filter input files).
const CONFIG_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "filterc")]
#[command(about = "filterc - Compile entity-level filters into parameterized SQL")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to FILTERC_CONFIG, ./filterc.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Entity registry TOML file (overrides the configured registry)
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a filter to WHERE predicates (JSON)
    Compile {
        /// Root entity name
        entity: String,

        /// Filter as JSON, or @path to read it from a file
        filter: String,

        /// Compiler to use (defaults to the configured one)
        #[arg(short, long)]
        algorithm: Option<AlgorithmArg>,
    },

    /// Compile a filter into a SELECT on the entity's table
    Select {
        /// Root entity name
        entity: String,

        /// Filter as JSON, or @path to read it from a file
        filter: String,

        /// Columns to select (comma separated, `*` when omitted)
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,

        #[arg(long)]
        limit: Option<u64>,

        #[arg(long)]
        offset: Option<u64>,

        /// Check the generated SQL with a PostgreSQL parser
        #[arg(long)]
        check: bool,
    },

    /// Print the reference chains of a filter
    Chains {
        /// Root entity name
        entity: String,

        /// Filter as JSON, or @path to read it from a file
        filter: String,
    },

    /// List registered entities
    Entities,
}

#[derive(Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    /// Reference graph and chain walk
    Graph,
    /// Work stack
    Stack,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Graph => Algorithm::Graph,
            AlgorithmArg::Stack => Algorithm::Stack,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            init_tracing("warn");
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(CONFIG_ERROR);
        }
    };
    init_tracing(&settings.logging.filter);

    let registry = match &cli.registry {
        Some(path) => Registry::from_file(path).map_err(|e| e.to_string()),
        None => settings.load_registry().map_err(|e| e.to_string()),
    };
    let registry = match registry {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(CONFIG_ERROR);
        }
    };

    let compiler = FilterCompiler::new(&registry).with_algorithm(settings.compiler.algorithm);

    match cli.command {
        Commands::Compile {
            entity,
            filter,
            algorithm,
        } => cmd_compile(compiler, &entity, &filter, algorithm),
        Commands::Select {
            entity,
            filter,
            columns,
            limit,
            offset,
            check,
        } => cmd_select(compiler, &entity, &filter, columns, limit, offset, check),
        Commands::Chains { entity, filter } => cmd_chains(compiler, &entity, &filter),
        Commands::Entities => cmd_entities(&registry),
    }
}

/// `RUST_LOG` wins over the configured filter. Logs go to stderr.
fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_filter(arg: &str) -> Result<Value, ExitCode> {
    let source = match arg.strip_prefix('@') {
        Some(path) => match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path, e);
                return Err(ExitCode::from(CONFIG_ERROR));
            }
        },
        None => arg.to_string(),
    };

    serde_json::from_str(&source).map_err(|e| {
        eprintln!("Invalid filter JSON: {}", e);
        ExitCode::FAILURE
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_compile(
    compiler: FilterCompiler<'_>,
    entity: &str,
    filter: &str,
    algorithm: Option<AlgorithmArg>,
) -> ExitCode {
    let raw = match read_filter(filter) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let algorithm = algorithm.map_or(compiler.algorithm(), Algorithm::from);
    match compiler.compile_with(algorithm, entity, &raw) {
        Ok(predicates) => print_json(&predicates),
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_select(
    compiler: FilterCompiler<'_>,
    entity: &str,
    filter: &str,
    columns: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    check: bool,
) -> ExitCode {
    let raw = match read_filter(filter) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let mut options = match compiler.select_for(entity, &raw, columns) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    options.limit = limit;
    options.offset = offset;

    let query = match options.build() {
        Ok(q) => q,
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if check {
        if let Err(e) = validate_sql(&query.query) {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    }

    print_json(&query)
}

fn cmd_chains(compiler: FilterCompiler<'_>, entity: &str, filter: &str) -> ExitCode {
    let raw = match read_filter(filter) {
        Ok(v) => v,
        Err(code) => return code,
    };

    match compiler.reference_chains(entity, &raw) {
        Ok(chains) => {
            if chains.is_empty() {
                println!("No reference chains.");
            }
            for chain in chains {
                println!("{}", chain);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_entities(registry: &Registry) -> ExitCode {
    println!("Entities:");
    for entry in registry.entities() {
        let references = entry.reference_keys();
        if references.is_empty() {
            println!("  - {} (table: {})", entry.name(), entry.table());
        } else {
            println!(
                "  - {} (table: {}, references: {})",
                entry.name(),
                entry.table(),
                references.join(", ")
            );
        }
    }
    ExitCode::SUCCESS
}
