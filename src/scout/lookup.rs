use serde_json::json;
use tracing::{info, instrument};

use super::{PlayerRecord, Scout, TeamResult};
use crate::csl::TeamRef;
use crate::db::{Fields, ProfileRecord, Resource, SessionRecord};
use crate::error::AppError;
use crate::steam;

impl Scout {
    /// Look up `team`, or the user's last team when `last` is set.
    #[instrument(skip(self))]
    pub async fn lookup(
        &self,
        user: &str,
        team: Option<TeamRef>,
        last: bool,
    ) -> Result<TeamResult, AppError> {
        let team = match (team, last) {
            (Some(team), false) => team,
            (None, true) => self
                .store
                .session(user)
                .await?
                .and_then(|s| s.last_team)
                .ok_or_else(|| AppError::NotFound("Lookup: you have no last team to use".into()))?,
            (Some(_), true) => {
                return Err(AppError::Usage(
                    "Lookup: specify either a team or --last, not both".into(),
                ));
            }
            (None, false) => {
                return Err(AppError::Usage(
                    "Lookup: specify either a team or --last, but got neither".into(),
                ));
            }
        };

        let roster = self.roster.fetch_roster(team).await?;
        let account_ids = roster
            .players
            .iter()
            .map(|p| steam::convert_text_to_32id(&p.legacy_id))
            .collect::<Result<Vec<u32>, _>>()?;

        self.store
            .update_fields(
                Resource::Session,
                user,
                Fields::from([
                    (SessionRecord::LAST_TEAM.to_string(), json!(team)),
                    (SessionRecord::LAST_PLAYERS.to_string(), json!(account_ids)),
                ]),
            )
            .await?;

        for (entry, id) in roster.players.iter().zip(&account_ids) {
            self.store
                .update(
                    Resource::Profile,
                    &id.to_string(),
                    ProfileRecord::SITE_NAME,
                    json!(entry.display_name),
                )
                .await?;
        }

        let summaries = self.fetch_players(&account_ids).await?;

        let mut result = TeamResult::new(team, roster.team_name);
        for ((entry, id), stats) in roster.players.into_iter().zip(account_ids).zip(summaries) {
            if let Some(name) = stats.persona_name() {
                self.store
                    .update(
                        Resource::Profile,
                        &id.to_string(),
                        ProfileRecord::STATS_NAME,
                        json!(name),
                    )
                    .await?;
            }
            let known = self.store.profile(id).await?.unwrap_or_default();

            result.insert(PlayerRecord {
                site_name: entry.display_name,
                account_id: id,
                stats,
                known,
            });
        }

        info!(
            team_name = %result.team_name,
            players = result.players.len(),
            "🔎 Team looked up"
        );
        Ok(result)
    }
}
