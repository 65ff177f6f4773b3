use std::fmt::Debug;
use std::num::NonZeroU32;

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::heroes::HeroTable;
use super::types::{HeroFilter, HeroPlayDto, HeroPlayRecord, PlayerDto, summarize_heroes};
use crate::error::AppError;

/// Lobby type of tournament games on the stats API.
const TOURNAMENT_LOBBY_TYPE: &str = "1";

pub struct OpenDotaClient {
    client: reqwest::Client,
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    base_url: String,
}

impl Debug for OpenDotaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenDotaClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenDotaClient {
    pub fn new(client: reqwest::Client, base_url: String, per_minute: NonZeroU32) -> Self {
        Self {
            client,
            limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Account summary: profile, ranks and MMR estimate.
    pub async fn get_player(&self, account_id: u32) -> Result<PlayerDto, AppError> {
        tracing::trace!("[OPENDOTA::CLIENT] get_player {}", account_id);
        let url = format!("{}/players/{}", self.base_url, account_id);

        self.get(&url, &[]).await
    }

    /// Raw per-hero history over the last `limit` games.
    pub async fn get_player_heroes(
        &self,
        account_id: u32,
        limit: u32,
        tournament_only: bool,
    ) -> Result<Vec<HeroPlayDto>, AppError> {
        tracing::trace!(
            "[OPENDOTA::CLIENT] get_player_heroes {} (limit {}, tournament only {})",
            account_id,
            limit,
            tournament_only
        );
        let url = format!("{}/players/{}/heroes", self.base_url, account_id);

        let limit = limit.to_string();
        let mut params = vec![("limit", limit.as_str())];
        if tournament_only {
            params.push(("lobby_type", TOURNAMENT_LOBBY_TYPE));
        }

        self.get(&url, &params).await
    }

    /// Hero history named, rated and filtered by `filter`.
    pub async fn fetch_hero_history(
        &self,
        heroes: &HeroTable,
        account_id: u32,
        filter: &HeroFilter,
    ) -> Result<Vec<HeroPlayRecord>, AppError> {
        let history = self
            .get_player_heroes(account_id, filter.num_games, filter.tourney_only)
            .await?;

        Ok(summarize_heroes(&history, heroes, filter))
    }

    async fn get<T: DeserializeOwned + Debug>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, AppError> {
        self.limiter.until_ready().await;

        let res = self.client.get(url).query(params).send().await?;
        match res.status() {
            StatusCode::OK => Ok(res.json().await?),
            status => Err(AppError::remote("OpenDota", url, status)),
        }
    }
}
