use futures::future::join_all;
use serde_json::json;
use tracing::{debug, info, instrument};

use super::{PlayerHeroes, ProfileReport, Scout};
use crate::db::{ProfileRecord, Resource, SessionRecord};
use crate::error::AppError;
use crate::opendota::HeroFilter;

impl Scout {
    /// Hero profiles of `players`, or of the user's last players when `last`
    /// is set.
    #[instrument(skip(self))]
    pub async fn profile(
        &self,
        user: &str,
        players: &[u32],
        last: bool,
        filter: HeroFilter,
    ) -> Result<ProfileReport, AppError> {
        let players = match (players.is_empty(), last) {
            (false, false) => {
                let players = dedup(players);
                self.store
                    .update(
                        Resource::Session,
                        user,
                        SessionRecord::LAST_PLAYERS,
                        json!(players),
                    )
                    .await?;
                players
            }
            (true, true) => self
                .store
                .session(user)
                .await?
                .and_then(|s| s.last_players)
                .filter(|p| !p.is_empty())
                .ok_or_else(|| {
                    AppError::NotFound("Profile: you have no last players to use".into())
                })?,
            (false, true) => {
                return Err(AppError::Usage(
                    "Profile: specify either players or --last, not both".into(),
                ));
            }
            (true, false) => {
                return Err(AppError::Usage(
                    "Profile: specify either players or --last, but got neither".into(),
                ));
            }
        };

        self.cache_unknown_names(&players).await?;

        let histories: Vec<_> = join_all(
            players
                .iter()
                .map(|id| self.stats.fetch_hero_history(&self.heroes, *id, &filter)),
        )
        .await
        .into_iter()
        .collect::<Result<_, AppError>>()?;

        let mut report = ProfileReport {
            filter,
            players: Vec::with_capacity(players.len()),
        };
        for (account_id, heroes) in players.into_iter().zip(histories) {
            report.players.push(PlayerHeroes {
                account_id,
                known: self.store.profile(account_id).await?.unwrap_or_default(),
                heroes,
            });
        }

        info!(players = report.players.len(), "🦸 Profiles built");
        Ok(report)
    }

    /// Fetch and store the stats name of players never seen before.
    async fn cache_unknown_names(&self, players: &[u32]) -> Result<(), AppError> {
        let mut unknown = Vec::new();
        for id in players {
            if self.store.profile(*id).await?.is_none() {
                unknown.push(*id);
            }
        }
        if unknown.is_empty() {
            return Ok(());
        }

        debug!(?unknown, "Caching names of unknown players");
        let summaries = self.fetch_players(&unknown).await?;

        for (id, summary) in unknown.into_iter().zip(summaries) {
            let key = id.to_string();
            match summary.persona_name() {
                Some(name) => {
                    self.store
                        .update(Resource::Profile, &key, ProfileRecord::STATS_NAME, json!(name))
                        .await?
                }
                None => {
                    self.store.ensure(Resource::Profile, &key).await?;
                }
            }
        }
        Ok(())
    }
}

/// Drop repeated ids, keeping the first occurrence.
fn dedup(players: &[u32]) -> Vec<u32> {
    let mut seen = Vec::with_capacity(players.len());
    for id in players {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    seen
}
