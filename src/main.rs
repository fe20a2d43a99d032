mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use nf_core::config::Config;
use nf_db::pool::init_pool;
use nf_engine::{EngineSet, ToolRegistry};
use nf_server::storage::UploadStore;
use nf_server::{build_router, AppContext};

async fn serve(host: String, port: u16, config_path: Option<&std::path::Path>) -> Result<()> {
    // Load config, then let CLI flags win.
    let mut config = Config::load_or_default(config_path);
    config.server.host = host;
    config.server.port = port;

    for warning in config.validate() {
        tracing::warn!("config: {warning}");
    }

    tracing::info!(
        "Starting noteforge on {}:{}",
        config.server.host,
        config.server.port
    );

    if let Some(parent) = config.server.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = init_pool(&config.server.db_path.to_string_lossy())?;

    let tools = Arc::new(ToolRegistry::discover(&config.tools));
    for info in tools.check_all() {
        if info.available {
            tracing::info!("engine {}: {:?}", info.name, info.path);
        } else {
            tracing::warn!("engine {} not found; conversions of that kind will fail", info.name);
        }
    }

    let timeout = Duration::from_secs(config.conversion.timeout_secs);
    let engines = Arc::new(EngineSet::discover(Arc::clone(&tools), timeout));

    let static_dir = config.server.static_dir.clone();
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let ctx = AppContext {
        db,
        config: Arc::new(config),
        tools,
        engines,
        uploads: Arc::new(UploadStore::new()),
    };

    let app = build_router(ctx, static_dir);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

fn check_tools(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = Config::load_or_default(config_path);
    let tools = ToolRegistry::discover(&config.tools);

    let mut all_ok = true;
    for info in tools.check_all() {
        if info.available {
            println!(
                "  {} -- {} ({})",
                info.name,
                info.version.as_deref().unwrap_or("unknown version"),
                info.path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            );
        } else {
            all_ok = false;
            println!("  {} -- NOT FOUND", info.name);
        }
    }

    if !all_ok {
        anyhow::bail!("one or more conversion engines are missing");
    }
    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    let config = Config::load_or_default(path);
    let warnings = config.validate();

    if warnings.is_empty() {
        println!("Configuration is valid.");
    } else {
        for warning in &warnings {
            println!("warning: {warning}");
        }
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<()> {
    let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
    println!("{hash}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on the
    // verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "noteforge=trace,nf_server=trace,nf_engine=trace,nf_db=debug,tower_http=debug"
                .to_string()
        } else {
            "noteforge=debug,nf_server=debug,nf_engine=debug,nf_db=info,tower_http=info"
                .to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve(host, port, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("noteforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::HashPassword { password } => hash_password(&password),
    }
}
