use tracing::{error, info};

use schedauth::{Config, CookieSigner, Database, PasswordMigration};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = schedauth::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        schedauth::logging::init_console_only(&config.logging.level);
    }

    info!("schedauth starting");

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    // Build the auth components now so bad settings fail at startup
    if let Err(e) = PasswordMigration::from_config(&config.password) {
        error!("Invalid password settings: {e}");
        std::process::exit(1);
    }
    if config.auth.persistent_login {
        if let Err(e) = CookieSigner::from_config(&config.auth) {
            error!("Invalid cookie settings: {e}");
            std::process::exit(1);
        }
    }

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    match db.schema_version().await {
        Ok(version) => info!(
            path = %config.database.path,
            version,
            "Database ready"
        ),
        Err(e) => error!("Failed to read schema version: {e}"),
    }
    info!(
        persistent_login = config.auth.persistent_login,
        admin_configured = config.auth.admin_email().is_some(),
        "Authorization configured"
    );
}
