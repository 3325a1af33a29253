use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mart_db::{ConnectOpts, DbHandle};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use commerce::config::CommerceConfig;
use commerce::Commerce;
use mart_http::{Authorizer, HttpConfig, RoleAuthorizer, StaticTokenVerifier, TokenVerifier};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const MEMORY_DSN: &str = "sqlite::memory:";

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> Result<String> {
    if dsn.eq_ignore_ascii_case(MEMORY_DSN) || dsn.eq_ignore_ascii_case("sqlite://:memory:") {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Mart Server - cart and coupon backend
#[derive(Parser)]
#[command(name = "mart-server")]
#[command(about = "Mart Server - cart and coupon backend")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Mart Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args).await,
    }
}

/// Detect DB backend from URL scheme.
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim().to_owned();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    let url = Url::parse(&raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// Final DSN: in-memory under `--mock`, otherwise the configured URL with
/// relative SQLite paths resolved against `home_dir`.
fn resolve_dsn(config: &AppConfig, args: &CliArgs) -> Result<(String, Option<DatabaseConfig>)> {
    if args.mock {
        return Ok((MEMORY_DSN.to_string(), config.database.clone()));
    }
    let db_config = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("No database configured; set `database.url` or pass --mock"))?;
    detect_from_dsn(&db_config)?;

    let mut dsn = db_config.url.trim().to_owned();
    if dsn.starts_with("sqlite://") {
        dsn = absolutize_sqlite_dsn(&dsn, Path::new(&config.server.home_dir))?;
    }
    Ok((dsn, Some(db_config)))
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let http_cfg: HttpConfig = config.module_config("http")?;
    let commerce_cfg: CommerceConfig = config.module_config("commerce")?;

    let (dsn, db_config) = resolve_dsn(&config, &args)?;
    let connect_opts = ConnectOpts {
        max_conns: db_config.as_ref().and_then(|c| c.max_conns),
        acquire_timeout: Some(Duration::from_secs(5)),
        busy_timeout_ms: db_config.as_ref().and_then(|c| c.busy_timeout_ms),
        create_sqlite_dirs: true,
    };

    tracing::info!("Connecting to database: {}", dsn);
    let db = DbHandle::connect(&dsn, connect_opts)
        .await
        .context("database connection failed")?;
    tracing::info!("Connected DB backend: {:?}", db.engine());

    Commerce::migrate(&db).await?;
    let commerce = Commerce::init(&db, commerce_cfg).await?;

    let verifier = StaticTokenVerifier::from_config(&http_cfg.auth);
    if verifier.is_empty() {
        tracing::warn!("No API tokens configured; every protected route will answer 401");
    }
    let verifier: Arc<dyn TokenVerifier> = Arc::new(verifier);
    let authorizer: Arc<dyn Authorizer> = Arc::new(RoleAuthorizer);

    let api = commerce.register_rest(axum::Router::new(), verifier, authorizer);
    let router = mart_http::host::build_router(
        api,
        &http_cfg,
        Duration::from_secs(config.server.timeout_sec),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let served = mart_http::host::serve(router, addr).await;
    db.close().await;
    served
}

async fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    let http_cfg: HttpConfig = config.module_config("http")?;
    let commerce_cfg: CommerceConfig = config.module_config("commerce")?;
    let (dsn, _) = resolve_dsn(&config, &args)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Database: {}", dsn);
    println!(
        "API tokens: {}, seed products: {}",
        http_cfg.auth.tokens.len(),
        commerce_cfg.seed_products.len()
    );
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_dsn_is_kept() {
        let base = Path::new("/srv/mart");
        assert_eq!(absolutize_sqlite_dsn("sqlite::memory:", base).unwrap(), MEMORY_DSN);
        assert_eq!(absolutize_sqlite_dsn("sqlite://:memory:", base).unwrap(), MEMORY_DSN);
    }

    #[test]
    fn relative_sqlite_path_is_resolved_under_home() {
        let dsn = absolutize_sqlite_dsn(
            "sqlite://database/mart.db?mode=rwc",
            Path::new("/srv/mart"),
        )
        .unwrap();
        assert_eq!(dsn, "sqlite:///srv/mart/database/mart.db?mode=rwc");
    }

    #[test]
    fn absolute_sqlite_path_is_untouched() {
        let dsn = absolutize_sqlite_dsn("sqlite:///var/lib/mart.db", Path::new("/srv")).unwrap();
        assert_eq!(dsn, "sqlite:///var/lib/mart.db");
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let cfg = DatabaseConfig {
            url: "mysql://localhost/mart".into(),
            max_conns: None,
            busy_timeout_ms: None,
        };
        assert!(detect_from_dsn(&cfg).is_err());
    }
}
