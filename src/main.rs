// region:    --- Imports
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use webel::config::Config;

// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    // logging 초기화 (RUST_LOG 우선)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("{:<12} --> 설정 로드 완료: {}", "Main", config.socket_addr());
    if let Err(e) = webel::start_server(config).await {
        error!("{:<12} --> Server error: {}", "Main", e);
        return Err(e);
    }
    Ok(())
}
// endregion: --- Main
