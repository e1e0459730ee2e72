use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use color_grade::Grade;
use photo_relay::models::AppConfig;
use photo_relay::presets::{self, PresetCatalog, PresetKind};
use photo_relay::rendering::render_graded;
use photo_relay::server;
use photo_relay::services::MonitorRequest;

const DEFAULT_CONFIG_FILE: &str = "photo-relay.yaml";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3400";

#[derive(Parser)]
#[command(name = "photo-relay")]
#[command(about = "Watch a folder, color-grade new photos and upload them")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the control server and, when configured, monitoring
    Serve,
    /// Apply a preset to a single photo without uploading it
    Grade {
        /// Source photo
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the graded photo (same format as the input)
        #[arg(short, long)]
        output: PathBuf,

        /// Preset id from the configured catalog
        #[arg(long, conflicts_with_all = ["table", "xmp"])]
        preset: Option<String>,

        /// A .cube color table
        #[arg(long, conflicts_with = "xmp")]
        table: Option<PathBuf>,

        /// An XMP preset
        #[arg(long)]
        xmp: Option<PathBuf>,

        /// JPEG quality (1-100); defaults to the configured value
        #[arg(short, long)]
        quality: Option<u8>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => run_server().await,
        Some(Commands::Grade {
            input,
            output,
            preset,
            table,
            xmp,
            quality,
        }) => run_grade_command(&input, &output, preset, table, xmp, quality).await,
        None => {
            run_status_command();
            Ok(())
        }
    }
}

fn config_path() -> PathBuf {
    std::env::var("CONFIG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Grade one photo to a file (no server, no upload)
async fn run_grade_command(
    input: &Path,
    output: &Path,
    preset: Option<String>,
    table: Option<PathBuf>,
    xmp: Option<PathBuf>,
    quality: Option<u8>,
) -> anyhow::Result<()> {
    // Minimal logging for CLI
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photo_relay=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config = AppConfig::load(&config_path());
    let quality = quality.unwrap_or(config.jpeg_quality);

    let (kind, file) = match (preset, table, xmp) {
        (Some(id), _, _) => {
            let catalog_path = config
                .presets_file
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("No presets_file configured"))?;
            let catalog = PresetCatalog::load(catalog_path)?;
            catalog.resolve(&id)?
        }
        (None, Some(path), _) => (PresetKind::Table, Some(path)),
        (None, None, Some(path)) => (PresetKind::Adjustment, Some(path)),
        (None, None, None) => anyhow::bail!("One of --preset, --table or --xmp is required"),
    };

    let bytes = match (kind, file) {
        (PresetKind::Table, Some(path)) => {
            let table = presets::load_table(&path).await?;
            render_graded(input, Grade::Table(&table), quality)?
        }
        (PresetKind::Adjustment, Some(path)) => {
            let adjustments = presets::load_adjustments(&path).await?;
            render_graded(input, Grade::Tone(&adjustments), quality)?
        }
        _ => std::fs::read(input)?,
    };

    std::fs::write(output, &bytes)?;
    println!("Graded {} ({} bytes)", output.display(), bytes.len());

    Ok(())
}

/// Display version, environment and available commands
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let bind_addr = std::env::var("BIND_ADDR").ok();
    let config_file = std::env::var("CONFIG_FILE").ok();

    println!("photo-relay v{VERSION}");
    println!("Folder-watching photo grader and uploader\n");

    println!("Environment Variables:");
    println!(
        "  BIND_ADDR   = {}",
        bind_addr
            .as_deref()
            .unwrap_or(&format!("{DEFAULT_BIND_ADDR} (default)"))
    );
    println!(
        "  CONFIG_FILE = {}",
        config_file
            .as_deref()
            .unwrap_or(&format!("{DEFAULT_CONFIG_FILE} (default)"))
    );

    let path = config_path();
    println!("\nConfiguration:");
    if path.exists() {
        println!("  {} (found)", path.display());
    } else {
        println!("  {} (not found, defaults apply)", path.display());
    }

    println!("\nCommands:");
    println!("  photo-relay serve   Start the control server and folder monitoring");
    println!("  photo-relay grade   Apply a preset to one photo");
    println!("\nRun 'photo-relay --help' for more details.");
}

/// Run the control server
async fn run_server() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photo_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let config = AppConfig::load(&config_path());
    let auto_start =
        config.auto_start && config.watch_folder.is_some() && config.api_url.is_some();

    let state = server::create_app_state(config).await?;
    let relay = state.relay.clone();
    relay.spawn_background().await;

    if auto_start {
        if let Err(e) = relay.start_monitoring(MonitorRequest::default()).await {
            tracing::warn!(error = %e, "Could not start monitoring on launch");
        }
    }

    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "photo-relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await?;

    relay.shutdown().await;
    tracing::info!("Shut down");

    Ok(())
}
