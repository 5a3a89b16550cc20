// --- Registros institucionales - Archivo principal ---

use registros::{run_server, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().map_err(|e| {
        tracing::error!(error = %e, "configuración inválida");
        std::io::Error::other(e.to_string())
    })?;

    tracing::info!("=== Registros institucionales (API) ===");
    run_server(config).await
}
