use tracing::{error, info};

use drive_catalog::{Config, WebServer};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let mut config = match Config::load_with_env(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = drive_catalog::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        drive_catalog::logging::init_console_only(&config.logging.level, config.logging.format);
    }

    if let Err(e) = config.resolve_credentials() {
        error!(
            path = %config.catalog.credentials_file,
            error = %e,
            "Failed to read credentials file"
        );
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    if config.catalog.root_folder_id().is_none() {
        info!("No default root folder configured; requests must pass folderId");
    }

    let server = match WebServer::from_config(&config) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create web server: {e}");
            std::process::exit(1);
        }
    };

    info!("Drive Catalog");
    info!(
        "Server configured on {}:{}{}",
        config.server.host, config.server.port, config.server.endpoint
    );

    if let Err(e) = server.run().await {
        error!("Web server error: {e}");
        std::process::exit(1);
    }
}
