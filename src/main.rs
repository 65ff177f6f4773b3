use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tracing::{error, info};

mod command;
mod config;
mod csl;
mod db;
mod discord;
mod error;
mod logging;
mod opendota;
mod scout;
mod steam;

use config::Config;
use csl::RosterScraper;
use db::Store;
use discord::{Data, create_framework};
use error::AppError;
use opendota::{HeroTable, OpenDotaClient};
use scout::Scout;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    logging::init();
    info!("🐙 Starting TangyBot...");

    let config = Config::from_env()?;

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;

    let heroes = HeroTable::fetch(
        &http,
        config.steam_api_key.as_deref(),
        &config.hero_language,
        &config.opendota_base_url,
    )
    .await?;

    let store = Arc::new(Store::open(&config.store).await?);

    let scout = Scout::new(
        store.clone(),
        OpenDotaClient::new(
            http.clone(),
            config.opendota_base_url.clone(),
            config.opendota_rate_limit_per_minute,
        ),
        RosterScraper::new(http, config.csl_base_url.clone(), &config.selectors)?,
        Arc::new(heroes),
    );

    let framework = create_framework(Data {
        scout: Arc::new(scout),
        message_limit: config.message_limit,
    });

    let mut client = serenity::ClientBuilder::new(&config.discord_token, discord::intents())
        .framework(framework)
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "❌ Could not listen for shutdown signal");
            return;
        }
        info!("🛑 Shutdown signal received");
        shard_manager.shutdown_all().await;
    });

    info!("🌐 [DISCORD] connecting to gateway");
    let result = client.start().await;

    store.close().await;
    info!("👋 TangyBot stopped");

    result.map_err(AppError::from)
}
