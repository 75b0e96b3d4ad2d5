//! rpatch - Resource patch CLI tool
//!
//! Computes the ordered RFC 6902 patch that turns a current resource
//! document into a desired one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use resource_patch::resource::{AuthProvider, Device, Fleet, PatchBuilder};
use resource_patch::{value, Patch, PatchOptions};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    AuthProvider,
    Device,
    Fleet,
}

#[derive(Debug, Parser)]
#[command(name = "rpatch", version, about = "Compute the JSON patch between two resource documents")]
struct Cli {
    /// Resource kind of both documents
    #[arg(short, long, value_enum)]
    kind: Kind,

    /// Current document (YAML or JSON)
    #[arg(short, long)]
    current: PathBuf,

    /// Desired document (YAML or JSON)
    #[arg(short, long)]
    desired: PathBuf,

    /// Patch options file (YAML or JSON)
    #[arg(long)]
    options: Option<PathBuf>,

    /// Output location. Use '-' for stdout
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Print the patch as YAML instead of JSON
    #[arg(long)]
    yaml: bool,

    /// Log what the builders do
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_document(file: &Path) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(file).map_err(|e| format!("Failed to read file {:?}: {}", file, e))?;
    let doc = value::from_yaml(&content).map_err(|e| format!("Failed to parse file {:?}: {}", file, e))?;
    Ok(doc)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = match &cli.options {
        Some(file) => {
            let content =
                fs::read_to_string(file).map_err(|e| format!("Failed to read options file {:?}: {}", file, e))?;
            PatchOptions::from_yaml(&content).map_err(|e| format!("Failed to parse options: {}", e))?
        }
        None => PatchOptions::default(),
    };

    let current = read_document(&cli.current)?;
    let desired = read_document(&cli.desired)?;

    let builder = PatchBuilder::new(options);
    let patch: Patch = match cli.kind {
        Kind::AuthProvider => builder.diff_documents::<AuthProvider>(&current, &desired)?,
        Kind::Device => builder.diff_documents::<Device>(&current, &desired)?,
        Kind::Fleet => builder.diff_documents::<Fleet>(&current, &desired)?,
    };

    let doc = serde_json::to_value(&patch).map_err(|e| format!("Failed to serialize patch: {}", e))?;
    let rendered = if cli.yaml {
        value::to_yaml(&doc).map_err(|e| format!("Failed to serialize patch: {}", e))?
    } else {
        let mut json = value::to_json(&doc).map_err(|e| format!("Failed to serialize patch: {}", e))?;
        json.push('\n');
        json
    };

    let mut output: Box<dyn Write> = if cli.output == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(
            fs::File::create(&cli.output)
                .map_err(|e| format!("Failed to create output file {:?}: {}", cli.output, e))?,
        )
    };
    write!(output, "{}", rendered)?;

    Ok(())
}
