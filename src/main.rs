use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use mpd_patcher::config::{load_from_path as load_config, EngineConfig};
use mpd_patcher::document::load_from_path as load_document;
use mpd_patcher::{Element, OperationKind, PatchOperation, PatchValue, ResolvedTarget, Selector};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "mpd-patcher")]
#[command(about = "Inspect MPEG-DASH manifest patches and resolve their selectors", long_about = None)]
#[command(version)]
struct Cli {
    /// Engine configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show metadata and operations of patch documents
    Inspect {
        /// Patch files, or directories containing .json patch files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print metadata and operations as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a selector against a manifest
    Resolve {
        /// Manifest document (x2js JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Resolve for an add/remove, targeting the parent element
        #[arg(short, long)]
        sibling: bool,

        /// Selector, e.g. /MPD/Period[@id="p1"]/@start
        selector: String,
    },

    /// Check that every operation of a patch resolves against a manifest
    Check {
        /// Manifest document (x2js JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Patch document (x2js JSON)
        patch: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Inspect { paths, json } => cmd_inspect(&config, &paths, json),
        Commands::Resolve {
            manifest,
            sibling,
            selector,
        } => cmd_resolve(&config, &manifest, sibling, &selector),
        Commands::Check { manifest, patch } => cmd_check(&config, &manifest, &patch),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Helper: Expand directories into the .json files they contain (non-recursive).
fn discover_patch_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(path).max_depth(1) {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|s| s.to_str()) == Some("json")
            {
                found.push(entry.path().to_path_buf());
            }
        }
        found.sort();
        files.extend(found);
    }

    if files.is_empty() {
        anyhow::bail!("No .json patch documents found");
    }
    Ok(files)
}

/// Helper: Load a manifest, warning when its root is not the configured one
fn load_manifest(config: &EngineConfig, path: &Path) -> Result<Element> {
    let manifest = load_document(path, &config.document_options())
        .with_context(|| format!("failed to load manifest {}", path.display()))?;

    if manifest.name() != config.document.root {
        eprintln!(
            "{}",
            format!(
                "Warning: manifest root is <{}>, expected <{}>",
                manifest.name(),
                config.document.root
            )
            .yellow()
        );
    }
    Ok(manifest)
}

fn describe_element(element: &Element) -> String {
    let mut out = format!("<{}", element.name());
    for (name, value) in element.attributes() {
        out.push_str(&format!(" {name}=\"{value}\""));
    }
    out.push('>');
    if !element.children().is_empty() {
        out.push_str(&format!(" ({} children)", element.children().len()));
    }
    out
}

fn describe_value(value: &PatchValue) -> String {
    match value {
        PatchValue::Text(text) => format!("= {text:?}"),
        PatchValue::Elements(groups) if groups.is_empty() => "(no elements)".to_string(),
        PatchValue::Elements(groups) => groups
            .iter()
            .map(|(name, elements)| format!("{name} x{}", elements.len()))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn describe_operation(operation: &PatchOperation) -> String {
    let padded = format!("{:<7}", operation.kind().as_str());
    let kind = match operation.kind() {
        OperationKind::Add => padded.green(),
        OperationKind::Remove => padded.red(),
        OperationKind::Replace => padded.yellow(),
    };
    let mut out = format!("{kind} {}", operation.selector());
    if let Some(position) = operation.position() {
        out.push_str(&format!(" pos={position}"));
    }
    out
}

fn cmd_inspect(config: &EngineConfig, paths: &[PathBuf], json: bool) -> Result<()> {
    let model = config.patch_model();
    let options = config.patch_document_options();

    for file in discover_patch_files(paths)? {
        let patch = load_document(&file, &options)
            .with_context(|| format!("failed to load patch {}", file.display()))?;
        let metadata = model.metadata(&patch);
        let extraction = model
            .extract(&patch)
            .with_context(|| format!("failed to extract operations from {}", file.display()))?;
        for diagnostic in &extraction.diagnostics {
            diagnostic.log();
        }

        if json {
            let report = serde_json::json!({
                "file": file.display().to_string(),
                "metadata": metadata,
                "operations": extraction.operations,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            continue;
        }

        println!("{}", file.display().to_string().bold());
        let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
        println!("  mpdId: {}", or_dash(metadata.mpd_id.clone()));
        println!(
            "  publishTime: {}",
            or_dash(metadata.publish_time.map(|t| t.to_rfc3339()))
        );
        println!(
            "  originalPublishTime: {}",
            or_dash(metadata.original_publish_time.map(|t| t.to_rfc3339()))
        );
        println!("  {} operations", extraction.operations.len());

        for (idx, operation) in extraction.operations.iter().enumerate() {
            println!(
                "  {:>3}. {} {}",
                idx + 1,
                describe_operation(operation),
                describe_value(operation.value()).dimmed()
            );
        }
        for diagnostic in &extraction.diagnostics {
            println!("  {} {}", "⊘".cyan(), diagnostic);
        }
        println!();
    }

    Ok(())
}

fn print_target(target: &ResolvedTarget<'_>) {
    if target.is_attribute {
        println!("  attribute: {}", target.name);
        match target.attribute_value() {
            Some(value) => println!("  value: {value:?}"),
            None => println!("  value: {}", "(not present)".dimmed()),
        }
    } else {
        println!("  element: {}", target.name);
    }
    println!("  leaf: {}", describe_element(target.leaf));
    println!("  target: {}", describe_element(target.target));
}

fn cmd_resolve(
    config: &EngineConfig,
    manifest_path: &Path,
    sibling: bool,
    selector_text: &str,
) -> Result<()> {
    let manifest = load_manifest(config, manifest_path)?;
    let selector = Selector::parse(selector_text)?;

    match selector.resolve(&manifest, sibling) {
        Some(target) => {
            println!("{} {}", "✓".green(), selector);
            print_target(&target);
            Ok(())
        }
        None => {
            eprintln!("{} {}: not found", "✗".red(), selector);
            std::process::exit(1);
        }
    }
}

fn cmd_check(config: &EngineConfig, manifest_path: &Path, patch_path: &Path) -> Result<()> {
    let manifest = load_manifest(config, manifest_path)?;
    let patch = load_document(patch_path, &config.patch_document_options())
        .with_context(|| format!("failed to load patch {}", patch_path.display()))?;

    let model = config.patch_model();
    let operations = model.patch_operations(&patch).with_context(|| {
        format!(
            "failed to extract operations from {}",
            patch_path.display()
        )
    })?;

    println!("{}", "Checking patch operations...".bold());
    println!("Manifest: {}", manifest_path.display());
    println!("Patch: {}", patch_path.display());
    println!(
        "{}",
        "Note: each operation is resolved against the unpatched manifest".dimmed()
    );
    println!();

    let mut found = 0;
    let mut missing_attribute = 0;
    let mut not_found = 0;

    for (idx, operation) in operations.iter().enumerate() {
        let label = format!("{:>3}. {}", idx + 1, describe_operation(operation));
        match operation.resolve(&manifest) {
            Some(target)
                if target.is_attribute
                    && operation.kind() != OperationKind::Add
                    && target.attribute_value().is_none() =>
            {
                println!("{} {}", "⊙".yellow(), label);
                println!(
                    "       attribute '{}' not present on {}",
                    target.name,
                    describe_element(target.leaf)
                );
                missing_attribute += 1;
            }
            Some(target) => {
                println!("{} {}", "✓".green(), label);
                println!("       target: {}", describe_element(target.target));
                found += 1;
            }
            None => {
                eprintln!("{} {}", "✗".red(), label);
                eprintln!("  {}", "CONFLICT: selector matched no element".red());
                eprintln!("  Possible causes:");
                eprintln!("    - Patch is stale (manifest already moved past it)");
                eprintln!("    - Patch was generated for a different manifest");
                not_found += 1;
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} resolved", format!("{}", found).green());
    println!(
        "  {} missing attribute",
        format!("{}", missing_attribute).yellow()
    );
    println!("  {} not found", format!("{}", not_found).red());

    if not_found > 0 {
        std::process::exit(1);
    }

    Ok(())
}
