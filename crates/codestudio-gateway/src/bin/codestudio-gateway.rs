//! CodeStudio Gateway Binary
//!
//! Serves the workspace file API and the AI chat endpoint.
//!
//! # Usage
//! ```bash
//! codestudio-gateway [--port 5000] [--host 127.0.0.1] [--config gateway.json] [--verbose]
//! ```

use clap::Parser;
use codestudio_gateway::{Gateway, GatewayConfig};
use tracing_subscriber::EnvFilter;

/// CodeStudio Gateway - workspace files and AI chat over HTTP
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Start with an empty default project
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // RUST_LOG wins when set
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(args.verbose)
        .init();

    let mut config = match &args.config {
        Some(path) => GatewayConfig::from_file(path)?,
        None => GatewayConfig::default(),
    }
    .with_env();

    if let Some(host) = args.host {
        config = config.with_host(host);
    }
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    if args.no_seed {
        config.seed_files = false;
    }

    print_banner(&config);

    let gateway = Gateway::new(config)?;
    gateway.start().await?;

    Ok(())
}

fn print_banner(config: &GatewayConfig) {
    println!();
    println!("CodeStudio Gateway v{}", codestudio_gateway::VERSION);
    println!();
    println!("HTTP server");
    println!("   └─ http://{}:{}", config.host, config.port);
    println!();
    println!("Endpoints");
    println!("   ├─ GET    /health");
    println!("   ├─ GET    /status");
    println!("   ├─ POST   /api/ai/chat");
    println!("   ├─ GET    /api/workspace/projects/:projectId");
    println!("   ├─ GET    /api/workspace/files/:projectId");
    println!("   ├─ POST   /api/workspace/files");
    println!("   ├─ PATCH  /api/workspace/files/:id");
    println!("   ├─ DELETE /api/workspace/files/:id");
    println!("   └─ POST   /api/workspace/execute");
    println!();
    println!(
        "Model: {} ({})",
        config.llm.model,
        if config.llm.api_key.is_some() {
            "API key set"
        } else {
            "no API key"
        }
    );
    println!();
    println!("Press Ctrl+C to stop the gateway");
    println!();
}
