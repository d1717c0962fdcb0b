#![forbid(unsafe_code)]

//! GDL CLI - parse, validate and analyze Graph Definition Language files.
//!
//! # Commands
//!
//! - `parse`: Output the parsed graph and warnings as JSON
//! - `validate`: Report warnings and structural findings, failing when invalid
//! - `stats`: Show graph metrics
//! - `export`: Write the stable JSON export document

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gdl_core::{GdlConfig, GdlWarning, GraphReport, ValidateConfig, export::to_json_document};
use gdl_parser::{ParseOptions, ParseResult, parse_summary_json, parse_with_options};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// GDL CLI - parse, validate and analyze Graph Definition Language files.
#[derive(Debug, Parser)]
#[command(
    name = "gdl",
    version,
    about = "GDL CLI - parse, validate and analyze Graph Definition Language files",
    long_about = "Tooling for the line-oriented Graph Definition Language.\n\n\
        Nodes are declared as `[Label](key=value)`, edges as\n\
        `source -> target : \"label\" (key=value)`."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a GDL document and output the result as JSON.
    Parse {
        /// Input file path, "-" for stdin, or inline GDL text.
        #[arg(default_value = "-")]
        input: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Output counts and warnings only
        #[arg(long)]
        summary: bool,
    },

    /// Validate a GDL document and report warnings and findings.
    Validate {
        /// Input file path, "-" for stdin, or inline GDL text.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON (structured diagnostics)
        #[arg(long)]
        json: bool,

        /// Exit with non-zero status on analysis findings too
        #[arg(long)]
        strict: bool,
    },

    /// Show graph metrics.
    Stats {
        /// Input file path, "-" for stdin, or inline GDL text.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the JSON export document.
    Export {
        /// Input file path, "-" for stdin, or inline GDL text.
        #[arg(default_value = "-")]
        input: String,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Result of validating a document.
#[derive(Debug, Serialize)]
struct ValidateResult {
    valid: bool,
    node_count: usize,
    edge_count: usize,
    warnings: Vec<ValidationWarning>,
    findings: Vec<Finding>,
}

#[derive(Debug, Serialize)]
struct ValidationWarning {
    code: &'static str,
    line: usize,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    suggestions: Vec<String>,
}

impl From<&GdlWarning> for ValidationWarning {
    fn from(warning: &GdlWarning) -> Self {
        Self {
            code: warning.code(),
            line: warning.line,
            message: warning.message(),
            suggestions: warning.suggestions.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Finding {
    code: &'static str,
    message: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Parse {
            input,
            pretty,
            summary,
        } => cmd_parse(&input, &config, pretty, summary),

        Command::Validate {
            input,
            json,
            strict,
        } => cmd_validate(&input, &config, json, strict),

        Command::Stats { input, json } => cmd_stats(&input, &config, json),

        Command::Export { input, output } => cmd_export(&input, &config, output.as_deref()),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<GdlConfig> {
    let Some(path) = path else {
        return Ok(GdlConfig::default());
    };
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = GdlConfig::from_toml_str(&source)
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    info!("Loaded config from: {}", path.display());
    Ok(config)
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if Path::new(input).exists() {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    } else {
        // Treat as inline GDL text
        debug!("Input is not a file; parsing it as inline text");
        Ok(input.to_string())
    }
}

fn parse_input(input: &str, config: &GdlConfig) -> Result<ParseResult> {
    let source = load_input(input)?;
    let parsed = parse_with_options(&source, &ParseOptions::from(config));
    info!(
        nodes = parsed.graph.nodes.len(),
        edges = parsed.graph.edges.len(),
        warnings = parsed.warnings.len(),
        "Parsed input"
    );
    Ok(parsed)
}

fn write_output(output: Option<&str>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).context(format!("Failed to write to: {path}"))?;
            info!("Wrote output to: {path}");
        }
        None => {
            io::stdout()
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

// =============================================================================
// Command: parse
// =============================================================================

fn cmd_parse(input: &str, config: &GdlConfig, pretty: bool, summary: bool) -> Result<()> {
    let parsed = parse_input(input, config)?;

    let output = if summary {
        if pretty {
            let value: serde_json::Value = serde_json::from_str(&parse_summary_json(&parsed))?;
            serde_json::to_string_pretty(&value)?
        } else {
            parse_summary_json(&parsed)
        }
    } else if pretty {
        serde_json::to_string_pretty(&parsed)?
    } else {
        serde_json::to_string(&parsed)?
    };

    println!("{output}");

    for warning in &parsed.warnings {
        warn!("Parse warning: {warning}");
    }

    Ok(())
}

// =============================================================================
// Command: validate
// =============================================================================

fn cmd_validate(input: &str, config: &GdlConfig, json_output: bool, strict: bool) -> Result<()> {
    let parsed = parse_input(input, config)?;
    let report = GraphReport::analyze(&parsed.graph);

    let warnings: Vec<ValidationWarning> =
        parsed.warnings.iter().map(ValidationWarning::from).collect();
    let findings = collect_findings(&report, &config.validate);

    let rules = ValidateConfig {
        strict: strict || config.validate.strict,
        ..config.validate.clone()
    };
    let valid = report.is_valid(&rules, &parsed.warnings);

    let result = ValidateResult {
        valid,
        node_count: parsed.graph.nodes.len(),
        edge_count: parsed.graph.edges.len(),
        warnings,
        findings,
    };

    if json_output {
        let output = serde_json::to_string_pretty(&result)?;
        println!("{output}");
    } else {
        if result.valid {
            println!("✓ Valid GDL document");
        } else {
            println!("✗ Invalid GDL document");
        }

        println!("  Nodes: {}", result.node_count);
        println!("  Edges: {}", result.edge_count);

        if !result.warnings.is_empty() {
            println!("\nWarnings:");
            for warning in &result.warnings {
                println!("  [{}] {}", warning.code, warning.message);
            }
        }

        if !result.findings.is_empty() {
            println!("\nFindings:");
            for finding in &result.findings {
                println!("  [{}] {}", finding.code, finding.message);
            }
        }
    }

    if !result.valid {
        std::process::exit(1);
    }

    Ok(())
}

fn collect_findings(report: &GraphReport, config: &ValidateConfig) -> Vec<Finding> {
    let mut findings = Vec::new();

    if config.report_duplicates {
        findings.extend(report.duplicate_edges.iter().map(|duplicate| Finding {
            code: "gdl/note/duplicate-edge",
            message: format!(
                "edge '{}' -> '{}' is declared {} times",
                duplicate.source, duplicate.target, duplicate.count
            ),
        }));
    }

    if config.report_unreferenced {
        findings.extend(report.unreferenced_nodes.iter().map(|node| Finding {
            code: "gdl/note/unreferenced-node",
            message: format!("node '{node}' is not used by any edge"),
        }));
    }

    findings
}

// =============================================================================
// Command: stats
// =============================================================================

fn cmd_stats(input: &str, config: &GdlConfig, json_output: bool) -> Result<()> {
    let parsed = parse_input(input, config)?;
    let report = GraphReport::analyze(&parsed.graph);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print!("{}", format_stats(&report));

    if !parsed.warnings.is_empty() {
        warn!("{} line(s) were skipped; run `gdl validate` for details", parsed.warnings.len());
    }

    Ok(())
}

fn format_stats(report: &GraphReport) -> String {
    let mut out = String::new();
    let mut line = |label: &str, value: String| {
        out.push_str(&format!("{label:<22}{value}\n"));
    };

    line("Nodes:", report.node_count.to_string());
    line("Edges:", report.edge_count.to_string());
    line("Self loops:", report.self_loops.to_string());
    line("Density:", format!("{:.4}", report.density));
    line("Avg in-degree:", format!("{:.2}", report.avg_in_degree));
    line("Avg out-degree:", format!("{:.2}", report.avg_out_degree));
    line("Weak components:", report.weak_components.to_string());
    line("Connected:", if report.is_connected { "yes" } else { "no" }.to_string());
    line("Largest component:", report.largest_component_size.to_string());
    line("Avg shortest path:", format!("{:.2}", report.avg_shortest_path));
    line("Diameter:", report.diameter.to_string());
    line("Duplicate edges:", report.duplicate_edges.len().to_string());
    line("Unreferenced:", report.unreferenced_nodes.len().to_string());
    line("Longest chain:", report.longest_chain_length.to_string());
    line("Longest cycle:", report.longest_cycle_length.to_string());

    let mut central: Vec<(&String, &f64)> = report.degree_centrality.iter().collect();
    central.sort_by(|a, b| b.1.total_cmp(a.1));
    if !central.is_empty() {
        out.push_str("\nMost central:\n");
        for (id, centrality) in central.into_iter().take(3) {
            out.push_str(&format!("  {id} ({centrality:.2})\n"));
        }
    }

    if !report.chains.is_empty() {
        out.push_str("\nChains:\n");
        for chain in &report.chains {
            out.push_str(&format!("  {}\n", chain.join(" -> ")));
        }
    }

    if !report.cycles.is_empty() {
        out.push_str("\nCycles:\n");
        for cycle in &report.cycles {
            let closing = cycle.first().map_or("", String::as_str);
            out.push_str(&format!("  {} -> {closing}\n", cycle.join(" -> ")));
        }
    }

    out
}

// =============================================================================
// Command: export
// =============================================================================

fn cmd_export(input: &str, config: &GdlConfig, output: Option<&str>) -> Result<()> {
    let parsed = parse_input(input, config)?;
    for warning in &parsed.warnings {
        warn!("Parse warning: {warning}");
    }

    let document =
        to_json_document(&parsed.graph).context("Failed to serialize export document")?;
    write_output(output, &document)
}
