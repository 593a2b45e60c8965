use anyhow::Context;
use std::path::PathBuf;

// Entry point for `cargo run -p web-server`; reads `dealscope.toml` (or the
// file named by DEALSCOPE_CONFIG) and serves the job API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let path = std::env::var("DEALSCOPE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("dealscope.toml"));
    let config = configuration::load_config(&path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;
    let _guard = configuration::init_tracing(&config.logging)?;
    web_server::run_server(&config).await
}
