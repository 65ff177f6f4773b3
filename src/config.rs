use std::env;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use crate::csl::RosterSelectors;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub steam_api_key: Option<String>,
    pub hero_language: String,
    pub opendota_base_url: String,
    pub opendota_rate_limit_per_minute: NonZeroU32,
    pub csl_base_url: String,
    pub selectors: RosterSelectors,
    pub http_timeout: Duration,
    pub store: StoreConfig,
    pub message_limit: usize,
}

/// Where sessions and profiles are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Compressed serialized files, one per resource, inside `dir`.
    File { dir: PathBuf },
    /// Key-value tables named after `namespace` in a sqlite database.
    Sqlite {
        database_url: String,
        namespace: String,
    },
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        const DEFAULT_OPENDOTA_BASE_URL: &str = "https://api.opendota.com/api";
        const DEFAULT_OPENDOTA_RATE_LIMIT_PER_MINUTE: u32 = 60;
        const DEFAULT_CSL_BASE_URL: &str = "https://cstarleague.com";
        const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
        const DEFAULT_MESSAGE_LIMIT: usize = 2000;

        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| AppError::Config("DISCORD_TOKEN must be set".into()))?;

        let steam_api_key = env::var("STEAM_API_KEY").ok().filter(|k| !k.is_empty());
        let hero_language = env::var("HERO_LANGUAGE").unwrap_or_else(|_| "en".into());

        let opendota_base_url =
            env::var("OPENDOTA_BASE_URL").unwrap_or_else(|_| DEFAULT_OPENDOTA_BASE_URL.into());

        let opendota_rate_limit_per_minute = env::var("OPENDOTA_RATE_LIMIT_PER_MINUTE")
            .ok()
            .and_then(|v| v.parse().ok())
            .and_then(NonZeroU32::new)
            .unwrap_or_else(|| {
                NonZeroU32::new(DEFAULT_OPENDOTA_RATE_LIMIT_PER_MINUTE).unwrap_or(NonZeroU32::MIN)
            });

        let csl_base_url =
            env::var("CSL_BASE_URL").unwrap_or_else(|_| DEFAULT_CSL_BASE_URL.into());

        let defaults = RosterSelectors::default();
        let selectors = RosterSelectors {
            team_name: env::var("CSL_TEAM_NAME_SELECTOR").unwrap_or(defaults.team_name),
            player: env::var("CSL_PLAYER_SELECTOR").unwrap_or(defaults.player),
            player_name: env::var("CSL_PLAYER_NAME_SELECTOR").unwrap_or(defaults.player_name),
        };

        let http_timeout = Duration::from_secs(
            env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        );

        let store = StoreConfig::from_parts(
            env::var("STORE_BACKEND").ok().as_deref(),
            env::var("STORE_DIR").ok(),
            env::var("DATABASE_URL").ok(),
            env::var("STORE_NAMESPACE").ok(),
        )?;

        let message_limit = env::var("MESSAGE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_MESSAGE_LIMIT);

        Ok(Self {
            discord_token,
            steam_api_key,
            hero_language,
            opendota_base_url,
            opendota_rate_limit_per_minute,
            csl_base_url,
            selectors,
            http_timeout,
            store,
            message_limit,
        })
    }
}

impl StoreConfig {
    fn from_parts(
        backend: Option<&str>,
        dir: Option<String>,
        database_url: Option<String>,
        namespace: Option<String>,
    ) -> Result<Self, AppError> {
        match backend.unwrap_or("file") {
            "file" => Ok(Self::File {
                dir: dir.unwrap_or_else(|| ".".into()).into(),
            }),
            "sqlite" => Ok(Self::Sqlite {
                database_url: database_url
                    .unwrap_or_else(|| "sqlite:tangybot.db?mode=rwc".into()),
                namespace: namespace.unwrap_or_else(|| "prod".into()),
            }),
            other => Err(AppError::Config(format!(
                "STORE_BACKEND must be `file` or `sqlite`, got `{other}`"
            ))),
        }
    }
}
