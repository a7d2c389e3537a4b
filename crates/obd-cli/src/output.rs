//! Output formatting for obd-cli (table, json)

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet }
    }

    /// Print an info message (unless in quiet mode)
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.dimmed());
        }
    }

    /// Print rows in the configured format
    pub fn print<T: Tabled + Serialize>(&self, data: &[T]) {
        match self.format {
            OutputFormat::Table => {
                if data.is_empty() {
                    self.info("No PIDs");
                } else {
                    println!("{}", Table::new(data));
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(data).unwrap_or_else(|_| "[]".to_string())
                );
            }
        }
    }

    /// Print a single row in the configured format
    pub fn print_one<T: Tabled + Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Table => println!("{}", Table::new([data])),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
    }
}

// =============================================================================
// Display types for commands
// =============================================================================

/// Descriptor display for the pids command
#[derive(Debug, Tabled, Serialize)]
pub struct PidRow {
    #[tabled(rename = "Mode")]
    pub mode: String,
    #[tabled(rename = "PID")]
    pub pid: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Bytes")]
    pub bytes: u8,
    #[tabled(rename = "Type")]
    pub value_type: String,
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[tabled(rename = "Formula")]
    pub formula: String,
    #[tabled(rename = "Postfix")]
    pub postfix: String,
}

/// Frame display for query/respond commands
#[derive(Debug, Tabled, Serialize)]
pub struct FrameRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Data")]
    pub data: String,
    #[tabled(rename = "Frame")]
    pub frame: String,
}

/// Interpreted value display for the decode command
#[derive(Debug, Tabled, Serialize)]
pub struct ValueRow {
    #[tabled(rename = "Mode")]
    pub mode: String,
    #[tabled(rename = "PID")]
    pub pid: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Raw")]
    pub raw: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Unit")]
    pub unit: String,
}

/// Format a byte as 0x-prefixed hex
pub fn hex_byte(byte: u8) -> String {
    format!("0x{:02X}", byte)
}

/// Ad-hoc formula evaluation display
#[derive(Debug, Tabled, Serialize)]
pub struct EvalRow {
    #[tabled(rename = "Formula")]
    pub formula: String,
    #[tabled(rename = "Postfix")]
    pub postfix: String,
    #[tabled(rename = "Raw")]
    pub raw: String,
    #[tabled(rename = "Result")]
    pub result: f64,
    #[tabled(rename = "Type")]
    pub value_type: String,
    #[tabled(rename = "Value")]
    pub value: String,
}
