use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use oad_core::diag::{Diagnostic, has_errors};
use oad_core::ir::{self, SpecIr};
use oad_core::parse;
use oad_core::segment::segment_spec;
use oad_pipeline::config::{self, CONFIG_FILE_NAME, INDEX_FILE_NAME, OadConfig};
use oad_pipeline::scan::scan_text;
use oad_pipeline::validate::{check_coverage, validate_document, validate_index};

#[derive(Parser)]
#[command(name = "oad", about = "OpenAPI to agent-docs compiler and validator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an API description and report its IR stats
    Compile {
        /// Path to the description file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Inspect the compiled IR of an API description
    Inspect {
        /// Path to the description file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// List the segments an API description partitions into
    Segment {
        /// Path to the description file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Validate generated documentation against an API description
    Check {
        /// Path to the description file
        #[arg(short, long)]
        input: PathBuf,

        /// A single generated document to check
        #[arg(long, conflicts_with = "dir")]
        doc: Option<PathBuf>,

        /// A segmented output directory (index plus skills/) to check
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Scan a text file for credential-shaped literals
    Scan {
        /// Path to the file to scan
        file: PathBuf,
    },

    /// Initialize a new oad configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile { input } => cmd_compile(input),
        Commands::Inspect { input, format } => cmd_inspect(input, format),
        Commands::Segment { input } => cmd_segment(input),
        Commands::Check { input, doc, dir } => cmd_check(input, doc, dir),
        Commands::Scan { file } => cmd_scan(file),
        Commands::Init { force } => cmd_init(force),
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oad", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<OadConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn load_spec(path: &Path) -> Result<SpecIr> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let parsed = match ext {
        "json" => parse::from_json(&content)?,
        _ => parse::from_yaml(&content)?,
    };

    let ir = ir::compile(&parsed)?;
    Ok(ir)
}

fn report_diagnostics(diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        eprintln!("  {diag}");
    }
}

fn cmd_compile(input: PathBuf) -> Result<()> {
    let ir = load_spec(&input)?;

    eprintln!("Compiled {} (version {})", ir.title, ir.version);
    eprintln!("  Operations: {}", ir.operations.len());
    eprintln!("  Schemas: {}", ir.schemas.len());
    eprintln!("  Security schemes: {}", ir.security_schemes.len());
    Ok(())
}

fn cmd_inspect(input: PathBuf, format: InspectFormat) -> Result<()> {
    let ir = load_spec(&input)?;
    let summary = build_inspect_summary(&ir);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{yaml}");
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{json}");
        }
    }

    Ok(())
}

fn build_inspect_summary(ir: &SpecIr) -> serde_json::Value {
    let operations: Vec<serde_json::Value> = ir
        .operations
        .iter()
        .map(|op| {
            serde_json::json!({
                "id": op.id,
                "method": op.method.as_str(),
                "path": op.path,
                "tags": op.tags,
                "auth": op.auth.as_ref().map(|a| {
                    serde_json::json!({
                        "inherited": a.inherited,
                        "optional": a.optional,
                        "schemes": a.scheme_names(),
                    })
                }),
            })
        })
        .collect();

    let schemes: Vec<serde_json::Value> = ir
        .security_schemes
        .iter()
        .map(|(name, scheme)| serde_json::json!({ "name": name, "kind": scheme.kind() }))
        .collect();

    serde_json::json!({
        "title": ir.title,
        "version": ir.version,
        "servers": ir.servers,
        "operations": operations,
        "security_schemes": schemes,
        "schemas": ir.schemas.keys().collect::<Vec<_>>(),
    })
}

fn cmd_segment(input: PathBuf) -> Result<()> {
    let ir = load_spec(&input)?;
    let segments = segment_spec(&ir);

    for segment in &segments {
        eprintln!("{} ({})", segment.title, segment.file_path);
        for op in &segment.operations {
            eprintln!("  {} {} {}", op.id, op.method.as_str(), op.path);
        }
        if !segment.schemas.is_empty() {
            let names: Vec<&str> = segment.schemas.keys().map(String::as_str).collect();
            eprintln!("  schemas: {}", names.join(", "));
        }
    }
    eprintln!("{} segments", segments.len());
    Ok(())
}

fn cmd_check(input: PathBuf, doc: Option<PathBuf>, dir: Option<PathBuf>) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let ir = load_spec(&input)?;

    let mut diagnostics = Vec::new();

    match (doc, dir) {
        (Some(doc_path), None) => {
            let document = fs::read_to_string(&doc_path)
                .with_context(|| format!("failed to read {}", doc_path.display()))?;
            diagnostics.extend(validate_document(&document, &ir));
            diagnostics.extend(scan_text(&document, &cfg.scan));
        }
        (None, Some(dir_path)) => {
            check_segmented(&ir, &dir_path, &cfg, &mut diagnostics)?;
        }
        _ => anyhow::bail!("pass exactly one of --doc or --dir"),
    }

    report_diagnostics(&diagnostics);
    if has_errors(&diagnostics) {
        anyhow::bail!("validation failed");
    }
    eprintln!("Validation successful.");
    Ok(())
}

fn check_segmented(
    ir: &SpecIr,
    dir: &Path,
    cfg: &OadConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<()> {
    let segments = segment_spec(ir);
    diagnostics.extend(check_coverage(ir, &segments));

    let index_path = dir.join(INDEX_FILE_NAME);
    let index = fs::read_to_string(&index_path)
        .with_context(|| format!("failed to read {}", index_path.display()))?;
    diagnostics.extend(validate_index(&index, &segments));
    diagnostics.extend(scan_text(&index, &cfg.scan));

    for segment in &segments {
        let path = dir.join(&segment.file_path);
        let document = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let sub = segment.to_spec_ir(ir);
        diagnostics.extend(validate_document(&document, &sub));
        diagnostics.extend(scan_text(&document, &cfg.scan));
    }

    Ok(())
}

fn cmd_scan(file: PathBuf) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let content =
        fs::read_to_string(&file).with_context(|| format!("failed to read {}", file.display()))?;

    let diagnostics = scan_text(&content, &cfg.scan);
    report_diagnostics(&diagnostics);
    if has_errors(&diagnostics) {
        anyhow::bail!("secret scan failed");
    }
    eprintln!("No credential-shaped literals found.");
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
