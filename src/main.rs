//! zoo - reporting and administration tools for the zoo database.

use tracing::{error, info};
use zoo_reports::cli::{Cli, Command};
use zoo_reports::config::{Config, ConnectionConfig};
use zoo_reports::db;
use zoo_reports::error::{Result, ZooError};
use zoo_reports::{logging, report, server};

fn main() {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    logging::init_stderr_logging();

    if let Err(e) = run() {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let mut connection = resolve_connection(&cli, &config)?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| ZooError::internal(format!("Failed to start runtime: {e}")))?;

    // The pool spawns background tasks, so the catalog is opened inside the runtime.
    match cli.command() {
        Command::Demo => {
            // The whole demonstration shares one physical connection.
            connection.max_connections = 1;
            runtime.block_on(async {
                let catalog = db::open_catalog(cli.mock_db, &connection)?;
                let mut out = std::io::stdout();
                report::run_demo(catalog.as_ref(), &mut out).await
            })
        }
        Command::Serve(args) => {
            let mut server_config = config.server.clone();
            args.apply_to(&mut server_config);
            runtime.block_on(async {
                let catalog = db::open_catalog(cli.mock_db, &connection)?;
                server::serve(catalog, &server_config).await
            })
        }
    }
}

/// Resolves the connection configuration.
///
/// Precedence, highest first:
/// 1. CLI arguments (`--url` / `DATABASE_URL`, or individual flags)
/// 2. The `[database]` section of the config file
/// 3. `PG*` environment variables
/// 4. Built-in defaults
fn resolve_connection(cli: &Cli, config: &Config) -> Result<ConnectionConfig> {
    let mut connection = config.database.clone();

    if let Some(cli_connection) = cli.to_connection_config()? {
        connection.merge(&cli_connection);
    }

    connection.apply_env_defaults();
    connection.apply_builtin_defaults();

    Ok(connection)
}
