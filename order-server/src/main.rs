use order_server::{Config, Server, ServerState, init_logger_with_file, print_banner};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    init_logger_with_file(&config.log_level, config.log_dir.as_deref());

    print_banner();
    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        bank = %config.bank_api_url,
        "Order server starting"
    );
    if config.is_development() {
        tracing::warn!(
            account = %config.restaurant_account_number,
            "Development mode: payments go to the development restaurant account unless configured"
        );
    }

    let state = ServerState::initialize(&config).await?;
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}
