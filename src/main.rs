use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ironpath::api::{self, AppState};
use ironpath::player::hiscores::HiscoreService;
use ironpath::player::runemetrics::RuneMetricsService;
use ironpath::player::service::PlayerService;
use ironpath::quest::catalogue::QuestCatalogue;

const DEFAULT_HISCORES_URL: &str =
    "https://secure.runescape.com/m=hiscore/index_lite.ws?player={name}";
const DEFAULT_RUNEMETRICS_URL: &str = "https://apps.runescape.com/runemetrics/quests?user={name}";

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ironpath=info")),
        )
        .init();

    let quests_url = env_or("IRONPATH_QUESTS_URL", "resources/quests.json");
    let hiscores_url = env_or("IRONPATH_HISCORES_URL", DEFAULT_HISCORES_URL);
    let runemetrics_url = env_or("IRONPATH_RUNEMETRICS_URL", DEFAULT_RUNEMETRICS_URL);
    let settings_path = env_or("IRONPATH_SETTINGS", ".ironpath.json");
    let addr = env_or("IRONPATH_ADDR", "0.0.0.0:8080");

    let catalogue = Arc::new(QuestCatalogue::fetch(&quests_url).await?);
    let players = Arc::new(PlayerService::new(
        HiscoreService::new(hiscores_url),
        RuneMetricsService::new(runemetrics_url),
    ));

    let app = api::router(AppState {
        catalogue,
        players,
        settings_path: Arc::new(PathBuf::from(settings_path)),
    });
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("listening on {addr}");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
