//! barrelmcd command line.
//!
//! Usage:
//!   barrelmcd check model.mcd
//!   barrelmcd sql model.json -d mysql -o schema.sql
//!   barrelmcd mld model.mcd --json

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use barrelmcd::{
    generate_sql, parse_model, report, rules, serializer, transform_with, validate, EngineConfig,
    EngineError, GenerateOptions, Model,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "barrelmcd")]
#[command(about = "Validate Merise conceptual models, derive the logical schema and emit SQL")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print validation diagnostics
    Check {
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print the logical schema
    Mld {
        input: PathBuf,
        #[arg(long)]
        json: bool,
        /// Table-by-table listing instead of the one-line notation
        #[arg(long, conflicts_with = "json")]
        detailed: bool,
    },
    /// Generate the SQL script
    Sql {
        input: PathBuf,
        /// mysql, postgresql, sqlite, oracle or sqlserver
        #[arg(short, long)]
        dialect: Option<String>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        allow_errors: bool,
    },
    /// Re-emit the model in another format
    Convert {
        input: PathBuf,
        #[arg(long, value_enum)]
        to: Format,
    },
    /// Write the default configuration
    InitConfig {
        #[arg(default_value = "barrelmcd.toml")]
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Notation,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn read_model(path: &Path) -> Result<Model, EngineError> {
    let source = fs::read_to_string(path)?;
    let json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    parse_model(&source, json)
}

fn run(cli: Cli) -> Result<i32, EngineError> {
    let config = EngineConfig::load_from(cli.config.as_deref())?;

    match cli.command {
        Command::Check { input, json } => {
            let model = read_model(&input)?;
            let diagnostics = validate(&model);
            if json {
                println!("{}", serde_json::to_string_pretty(&diagnostics)?);
            } else {
                print!("{}", report::diagnostics(&diagnostics));
            }
            Ok(if rules::has_errors(&diagnostics) { 1 } else { 0 })
        }
        Command::Mld { input, json, detailed } => {
            let model = read_model(&input)?;
            let schema = transform_with(&model, &config.transform);
            if json {
                println!("{}", schema.to_json()?);
            } else if detailed {
                print!("{}", report::tables(&schema));
            } else {
                print!("{}", report::classic(&schema));
                for note in &schema.notes {
                    eprintln!("note: {}", note);
                }
            }
            Ok(0)
        }
        Command::Sql {
            input,
            dialect,
            output,
            allow_errors,
        } => {
            let model = read_model(&input)?;
            let mut options = GenerateOptions::from_config(&config)?;
            if let Some(name) = dialect {
                options.dialect = name.parse()?;
            }
            options.allow_errors |= allow_errors;

            let script = generate_sql(&model, &options).inspect_err(|e| {
                if let EngineError::InvalidModel { diagnostics, .. } = e {
                    eprint!("{}", report::diagnostics(diagnostics));
                }
            })?;
            if !script.diagnostics.is_empty() {
                eprint!("{}", report::diagnostics(&script.diagnostics));
            }

            let sql = script.render(config.sql.header);
            match output {
                Some(path) => fs::write(&path, sql)?,
                None => print!("{}", sql),
            }
            Ok(0)
        }
        Command::Convert { input, to } => {
            let model = read_model(&input)?;
            match to {
                Format::Json => println!("{}", model.to_json()?),
                Format::Notation => print!("{}", serializer::serialize(&model)),
            }
            Ok(0)
        }
        Command::InitConfig { path } => {
            EngineConfig::default().save(&path)?;
            eprintln!("wrote {}", path.display());
            Ok(0)
        }
    }
}
