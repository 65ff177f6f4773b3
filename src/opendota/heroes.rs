//! Hero id → localized name table, fetched once at startup.

use std::collections::HashMap;

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;

const STEAM_HEROES_ENDPOINT: &str = "https://api.steampowered.com/IEconDOTA2_570/GetHeroes/v1";

/// Read-only hero lookup shared by every request.
#[derive(Debug, Clone, Default)]
pub struct HeroTable {
    names: HashMap<u32, String>,
    max_name_len: usize,
}

#[derive(Debug, Deserialize)]
struct SteamHeroesResponse {
    result: SteamHeroesResult,
}

#[derive(Debug, Deserialize)]
struct SteamHeroesResult {
    heroes: Vec<HeroDto>,
}

/// Shape shared by the Steam and OpenDota hero listings.
#[derive(Debug, Deserialize)]
struct HeroDto {
    id: u32,
    localized_name: String,
}

impl HeroTable {
    fn from_dtos(dtos: Vec<HeroDto>) -> Self {
        let names: HashMap<u32, String> = dtos
            .into_iter()
            .map(|h| (h.id, h.localized_name))
            .collect();
        let max_name_len = names
            .values()
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0);

        Self {
            names,
            max_name_len,
        }
    }

    #[cfg(test)]
    pub fn from_pairs<const N: usize>(pairs: [(u32, &str); N]) -> Self {
        Self::from_dtos(
            pairs
                .into_iter()
                .map(|(id, name)| HeroDto {
                    id,
                    localized_name: name.to_string(),
                })
                .collect(),
        )
    }

    /// Fetch from the Steam Web API when a key is available, otherwise from
    /// the stats API's own `/heroes` listing.
    pub async fn fetch(
        client: &reqwest::Client,
        steam_api_key: Option<&str>,
        language: &str,
        opendota_base_url: &str,
    ) -> Result<Self, AppError> {
        let table = match steam_api_key {
            Some(key) => Self::fetch_from_steam(client, STEAM_HEROES_ENDPOINT, key, language).await?,
            None => Self::fetch_from_opendota(client, opendota_base_url).await?,
        };
        info!(heroes = table.len(), "🦸 Hero table loaded");
        Ok(table)
    }

    async fn fetch_from_steam(
        client: &reqwest::Client,
        endpoint: &str,
        key: &str,
        language: &str,
    ) -> Result<Self, AppError> {
        tracing::trace!("[HEROES] fetching from Steam Web API");
        let res = client
            .get(endpoint)
            .query(&[("key", key), ("language", language)])
            .send()
            .await?;
        match res.status() {
            StatusCode::OK => {
                let body: SteamHeroesResponse = res.json().await?;
                Ok(Self::from_dtos(body.result.heroes))
            }
            status => Err(AppError::remote("Steam Web API", endpoint, status)),
        }
    }

    async fn fetch_from_opendota(client: &reqwest::Client, base_url: &str) -> Result<Self, AppError> {
        let url = format!("{}/heroes", base_url.trim_end_matches('/'));
        tracing::trace!("[HEROES] fetching {}", url);
        let res = client.get(&url).send().await?;
        match res.status() {
            StatusCode::OK => Ok(Self::from_dtos(res.json().await?)),
            status => Err(AppError::remote("OpenDota", url, status)),
        }
    }

    pub fn localized_name(&self, hero_id: u32) -> String {
        self.names
            .get(&hero_id)
            .cloned()
            .unwrap_or_else(|| format!("Unknown hero {hero_id}"))
    }

    /// Length of the longest localized name, used to align hero columns.
    pub fn max_name_len(&self) -> usize {
        self.max_name_len
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn loads_opendota_listing() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/heroes");
                then.status(200).json_body(json!([
                    {"id": 1, "name": "npc_dota_hero_antimage", "localized_name": "Anti-Mage"},
                    {"id": 129, "name": "npc_dota_hero_mars", "localized_name": "Mars"}
                ]));
            })
            .await;

        let table = HeroTable::fetch(&reqwest::Client::new(), None, "en", &server.base_url())
            .await
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.localized_name(129), "Mars");
        assert_eq!(table.localized_name(1), "Anti-Mage");
        assert_eq!(table.max_name_len(), "Anti-Mage".len());
    }

    #[tokio::test]
    async fn loads_steam_listing_with_key_and_language() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/GetHeroes/v1")
                    .query_param("key", "secret")
                    .query_param("language", "de");
                then.status(200).json_body(json!({
                    "result": {"heroes": [
                        {"id": 2, "name": "npc_dota_hero_axe", "localized_name": "Axe"}
                    ], "count": 1}
                }));
            })
            .await;

        let table = HeroTable::fetch_from_steam(
            &reqwest::Client::new(),
            &server.url("/GetHeroes/v1"),
            "secret",
            "de",
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(table.localized_name(2), "Axe");
    }

    #[tokio::test]
    async fn failed_listing_is_a_remote_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/heroes");
                then.status(503);
            })
            .await;

        let err = HeroTable::fetch(&reqwest::Client::new(), None, "en", &server.base_url())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    }

    #[test]
    fn unknown_heroes_get_a_placeholder() {
        assert_eq!(HeroTable::default().localized_name(3), "Unknown hero 3");
    }
}
