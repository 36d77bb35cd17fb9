//! sqlblend CLI - Blend BI query SQL into one statement
//!
//! Usage:
//!   sqlblend compile <blend.json> [--connection <name>] [--dialect <dialect>] [--stable-views]
//!                    [--sanitize-aliases]
//!   sqlblend segments <file.sql>
//!   sqlblend pdt-meta <file.sql>
//!   sqlblend validate <blend.json> [--sanitize-aliases]
//!
//! Examples:
//!   sqlblend compile blends/revenue.json --connection warehouse --sql-dir ./queries
//!   sqlblend compile blends/revenue.json --dialect bigquery --stable-views --token abc123
//!   sqlblend segments queries/4211.sql

use clap::{Parser, Subcommand};
use sqlblend::compile::{compile_blend, BlendRequest};
use sqlblend::config::Settings;
use sqlblend::fetch::DirectorySource;
use sqlblend::model::BlendSet;
use sqlblend::parser::{parse_segments, split_segments};
use sqlblend::pdt::extract_all;
use sqlblend::sql::Dialect;
use sqlblend::validation::validate;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sqlblend")]
#[command(about = "sqlblend - Blend BI query SQL into one CTE-based statement")]
#[command(version)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a blend definition to SQL
    Compile {
        /// Path to the blend JSON file
        file: PathBuf,

        /// Connection whose dialect drives field naming
        #[arg(short, long)]
        connection: Option<String>,

        /// Dialect override, e.g. bigquery_standard_sql or snowflake
        #[arg(short, long)]
        dialect: Option<String>,

        /// Rewrite ephemeral derived tables to their stable views
        #[arg(long)]
        stable_views: bool,

        /// Round-trip token prepended as `-- b=<token>`
        #[arg(long)]
        token: Option<String>,

        /// Skip pretty-printing
        #[arg(long)]
        no_pretty: bool,

        /// Directory holding <query_id>.sql files
        #[arg(long)]
        sql_dir: Option<PathBuf>,

        /// Path to sqlblend.toml
        #[arg(long)]
        config: Option<PathBuf>,

        /// Lowercase aliases and replace invalid characters before validating
        #[arg(long)]
        sanitize_aliases: bool,
    },

    /// Split one query's SQL into segments (JSON)
    Segments {
        /// Path to the .sql file
        file: PathBuf,
    },

    /// Extract derived-table metadata from one query's SQL (JSON)
    PdtMeta {
        /// Path to the .sql file
        file: PathBuf,
    },

    /// Validate a blend definition without generating SQL
    Validate {
        /// Path to the blend JSON file
        file: PathBuf,

        /// Lowercase aliases and replace invalid characters before validating
        #[arg(long)]
        sanitize_aliases: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Compile {
            file,
            connection,
            dialect,
            stable_views,
            token,
            no_pretty,
            sql_dir,
            config,
            sanitize_aliases,
        } => {
            let args = CompileArgs {
                connection,
                dialect,
                stable_views,
                token,
                no_pretty,
                sql_dir,
                config,
                sanitize_aliases,
            };
            cmd_compile(&file, args).await
        }
        Commands::Segments { file } => cmd_segments(&file),
        Commands::PdtMeta { file } => cmd_pdt_meta(&file),
        Commands::Validate {
            file,
            sanitize_aliases,
        } => cmd_validate(&file, sanitize_aliases),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt::Subscriber::builder()
        .without_time()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

struct CompileArgs {
    connection: Option<String>,
    dialect: Option<String>,
    stable_views: bool,
    token: Option<String>,
    no_pretty: bool,
    sql_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    sanitize_aliases: bool,
}

async fn cmd_compile(file: &Path, args: CompileArgs) -> ExitCode {
    let Some(blend) = read_blend(file, args.sanitize_aliases) else {
        return ExitCode::FAILURE;
    };

    let settings = match Settings::load_from(args.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut source = match DirectorySource::from_settings(&settings) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = args.sql_dir {
        source = source.with_root(dir);
    }

    if let Err(errors) = validate(&blend) {
        print_validation_errors(&errors);
        return ExitCode::FAILURE;
    }

    let mut request = BlendRequest::new(blend).with_settings(&settings);
    if args.stable_views {
        request = request.with_stable_views(true);
    }
    if args.no_pretty {
        request = request.with_pretty(false);
    }
    if let Some(connection) = args.connection {
        request = request.with_connection(connection);
    }
    if let Some(dialect) = &args.dialect {
        request = request.with_dialect(Dialect::from_name(dialect));
    }
    if let Some(token) = args.token {
        request = request.with_token(token);
    }

    match compile_blend(&source, &request).await {
        Ok(compiled) => {
            println!("{}", compiled.sql);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_segments(file: &Path) -> ExitCode {
    let Some(sql) = read_file(file) else {
        return ExitCode::FAILURE;
    };

    let segments = match parse_segments(&sql) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    print_json(&segments)
}

fn cmd_pdt_meta(file: &Path) -> ExitCode {
    let Some(sql) = read_file(file) else {
        return ExitCode::FAILURE;
    };

    // Materialization blocks do not depend on pivot unwrapping
    let segments = match parse_segments(&sql) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Warning: {}", e);
            split_segments(&sql)
        }
    };

    print_json(&extract_all(&segments.materialization_blocks))
}

fn cmd_validate(file: &Path, sanitize_aliases: bool) -> ExitCode {
    let Some(blend) = read_blend(file, sanitize_aliases) else {
        return ExitCode::FAILURE;
    };

    match validate(&blend) {
        Ok(()) => {
            println!("OK: {} is valid", file.display());
            ExitCode::SUCCESS
        }
        Err(errors) => {
            print_validation_errors(&errors);
            ExitCode::FAILURE
        }
    }
}

fn read_file(file: &Path) -> Option<String> {
    match fs::read_to_string(file) {
        Ok(s) => Some(s),
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            None
        }
    }
}

fn read_blend(file: &Path, sanitize_aliases: bool) -> Option<BlendSet> {
    let content = read_file(file)?;
    match serde_json::from_str::<BlendSet>(&content) {
        Ok(mut blend) => {
            if sanitize_aliases {
                blend.sanitize_aliases();
            }
            Some(blend)
        }
        Err(e) => {
            eprintln!("Invalid blend definition '{}': {}", file.display(), e);
            None
        }
    }
}

fn print_validation_errors(errors: &[sqlblend::validation::ValidationError]) {
    eprintln!("Validation errors:");
    for error in errors {
        eprintln!("  {}", error);
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            ExitCode::FAILURE
        }
    }
}
