use estate_forms::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)      // Default to Info for everything
        .filter_module("sqlx", LevelFilter::Warn)  // Suppress sqlx Debug logs
        .parse_default_env()                  // RUST_LOG overrides
        .init();

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}:{} backend={:?}",
        config.server.host,
        config.server.port,
        config.database.backend
    );

    estate_forms::run_server(config).await
}
