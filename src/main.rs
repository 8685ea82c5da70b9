use std::io::ErrorKind;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use file_access::{Config, FileAccessError, TokenAuthority, WebServer};

const CONFIG_PATH: &str = "config.toml";

fn load_config() -> Result<Config, FileAccessError> {
    match Config::load_with_env(CONFIG_PATH) {
        Err(FileAccessError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            eprintln!("{CONFIG_PATH} not found, using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            Ok(config)
        }
        other => other,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    if let Err(e) = file_access::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        file_access::logging::init_console_only(&config.logging.level);
    }

    info!("File Access Service starting");

    let tokens = match TokenAuthority::initialize(
        config.tokens.upload_seed.as_deref(),
        config.tokens.super_seed.as_deref(),
    ) {
        Ok(tokens) => Arc::new(tokens),
        Err(e) => {
            error!("Failed to initialize tokens: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let server = match WebServer::from_config(&config, tokens) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to set up web server: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run().await {
        error!("Web server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("File Access Service stopped");
    ExitCode::SUCCESS
}
