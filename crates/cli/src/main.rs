use anyhow::Context;
use api_shared::{ExportReq, PlanRes};
use clap::{Parser, Subcommand};
use export_core::config::core_config_from_env_values;
use export_core::{DocumentEngine, ExportOptions, ExportService, FsNodeStore};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quanta-export")]
#[command(about = "Export content nodes as documents")]
struct Cli {
    /// Directory holding node YAML files
    #[arg(long, global = true, env = "NODE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an export request and print the resolved plan
    Show {
        /// Request JSON file, or `-` for stdin
        request: String,
    },
    /// Run an export and write the file
    Export {
        /// Request JSON file, or `-` for stdin
        request: String,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// List the extensions this build can export
    Extensions,
}

/// Reads an export request payload from a file or stdin.
fn read_request(source: &str) -> anyhow::Result<ExportOptions> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("failed to read request file {}", source))?
    };

    let req: ExportReq = serde_json::from_str(&raw).context("invalid export request JSON")?;
    Ok(ExportOptions::from(req))
}

fn build_service(data_dir: Option<PathBuf>) -> anyhow::Result<ExportService> {
    let cfg = core_config_from_env_values(
        data_dir
            .map(|d| d.to_string_lossy().into_owned())
            .or_else(|| std::env::var("NODE_DATA_DIR").ok()),
        std::env::var("EXPORT_ENABLED_EXTENSIONS").ok(),
        std::env::var("EXPORT_DEFAULT_WIDTH").ok(),
        std::env::var("EXPORT_MAX_FILE_NAME_LEN").ok(),
    )?;
    tracing::debug!("Reading nodes from {}", cfg.node_data_dir().display());
    let store = FsNodeStore::new(cfg.node_data_dir())?;
    Ok(ExportService::new(
        Arc::new(cfg),
        Arc::new(DocumentEngine::new(store)),
    ))
}

/// Writes an exported file into `out_dir` and returns its path.
fn write_export(out_dir: &Path, file_name: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;
    let path = out_dir.join(file_name);
    std::fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("export_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Show { request }) => {
            let options = read_request(&request)?;
            let service = build_service(cli.data_dir)?;
            let plan = service.plan(&options)?;
            println!("{}", serde_json::to_string_pretty(&PlanRes::from(&plan))?);
        }
        Some(Commands::Export { request, out }) => {
            let options = read_request(&request)?;
            let service = build_service(cli.data_dir)?;
            let file = service.export(&options)?;
            let path = write_export(&out, &file.file_name, &file.bytes)?;
            println!("Exported {} ({}, {} bytes)", path.display(), file.content_type, file.bytes.len());
        }
        Some(Commands::Extensions) => {
            let service = build_service(cli.data_dir)?;
            for ext in service.supported_extensions() {
                println!("{:<8} {}", ext.as_str(), ext.default_content_type());
            }
        }
        None => {
            println!("Use 'quanta-export --help' for commands");
        }
    }

    Ok(())
}
