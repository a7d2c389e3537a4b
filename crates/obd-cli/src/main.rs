//! OBD CLI - Command-line tool for OBD-II PID frames
//!
//! Builds query and response frames, decodes candump-style responses and
//! evaluates conversion formulas against a PID schema.

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use obd_conv::{CodecConfig, FrameCodec, PidRegistry, Schema, ValueType, GENERIC_OBD2};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "obd-cli")]
#[command(author, version, about = "OBD-II PID frame tool")]
#[command(propagate_version = true)]
struct Cli {
    /// PID schema file (defaults to the built-in generic OBD-II schema)
    #[arg(short, long, env = "OBD_SCHEMA")]
    schema: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all PIDs in the schema
    Pids,

    /// Build a query frame
    Query {
        /// Service mode (hex, e.g. 01)
        #[arg(value_parser = parse_byte)]
        mode: u8,

        /// PID (hex, e.g. 0C)
        #[arg(value_parser = parse_byte)]
        pid: u8,
    },

    /// Build a response frame carrying raw bytes
    Respond {
        /// Service mode (hex, e.g. 01)
        #[arg(value_parser = parse_byte)]
        mode: u8,

        /// PID (hex, e.g. 0C)
        #[arg(value_parser = parse_byte)]
        pid: u8,

        /// Raw value bytes as hex (e.g. 4D82)
        data: String,
    },

    /// Decode a response frame (e.g. 7E7#04410C4D82CCCCCC)
    Decode {
        /// Frame in candump notation
        frame: String,
    },

    /// Evaluate a formula against raw bytes
    Eval {
        /// Formula (e.g. "(A*256+B)/4")
        formula: String,

        /// Raw bytes as hex (e.g. 4D82)
        data: String,

        /// Value type to narrow the result to
        #[arg(short = 't', long = "type", default_value = "float", value_parser = parse_value_type)]
        value_type: ValueType,
    },
}

fn parse_byte(s: &str) -> Result<u8, String> {
    obd_conv::parse_id(s).map_err(|e| e.to_string())
}

fn parse_value_type(s: &str) -> Result<ValueType, String> {
    s.parse().map_err(|e: obd_conv::SchemaError| e.to_string())
}

/// Load and compile the schema, returning the registry and its codec settings
fn load_registry(path: Option<&PathBuf>) -> Result<(PidRegistry, CodecConfig)> {
    let schema = match path {
        Some(path) => Schema::from_file(path)
            .with_context(|| format!("Failed to load schema: {}", path.display()))?,
        None => Schema::from_yaml(GENERIC_OBD2).context("Failed to parse built-in schema")?,
    };
    let config = schema.codec;
    let registry = schema.into_registry().context("Schema rejected")?;
    Ok((registry, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let ctx = OutputContext::new(cli.output, cli.no_color, cli.quiet);

    let schema = cli.schema.as_ref();

    // Execute command
    match &cli.command {
        Commands::Pids => {
            let (registry, _) = load_registry(schema)?;
            commands::pids(&registry, &ctx)?;
        }

        Commands::Query { mode, pid } => {
            let (registry, config) = load_registry(schema)?;
            let codec = FrameCodec::with_config(&registry, config)?;
            commands::query(&codec, *mode, *pid, &ctx)?;
        }

        Commands::Respond { mode, pid, data } => {
            let (registry, config) = load_registry(schema)?;
            let codec = FrameCodec::with_config(&registry, config)?;
            commands::respond(&codec, *mode, *pid, data, &ctx)?;
        }

        Commands::Decode { frame } => {
            let (registry, config) = load_registry(schema)?;
            let codec = FrameCodec::with_config(&registry, config)?;
            commands::decode(&codec, frame, &ctx)?;
        }

        // Formula evaluation needs no schema
        Commands::Eval {
            formula,
            data,
            value_type,
        } => {
            commands::eval(formula, data, *value_type, &ctx)?;
        }
    }

    Ok(())
}
