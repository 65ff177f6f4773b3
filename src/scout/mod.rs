//! Request orchestration: roster scraping, ID conversion, stats fetching and
//! session bookkeeping, merged into plain result structures.

use std::sync::Arc;

use futures::future::join_all;
use tracing::info;

use crate::command::Command;
use crate::csl::{RosterScraper, TeamRef};
use crate::db::{ProfileRecord, Resource, SessionRecord, Store};
use crate::error::AppError;
use crate::opendota::{HeroFilter, HeroPlayRecord, HeroTable, OpenDotaClient, PlayerDto};

mod lookup;
mod profile;
mod stalk;

/// One roster member merged with its stats summary and known names.
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub site_name: String,
    pub account_id: u32,
    pub stats: PlayerDto,
    pub known: ProfileRecord,
}

#[derive(Debug, Clone)]
pub struct TeamResult {
    pub team: TeamRef,
    pub team_name: String,
    pub players: Vec<PlayerRecord>,
}

impl TeamResult {
    fn new(team: TeamRef, team_name: String) -> Self {
        Self {
            team,
            team_name,
            players: Vec::new(),
        }
    }

    /// Add a player, replacing an earlier entry with the same account id.
    fn insert(&mut self, record: PlayerRecord) {
        match self
            .players
            .iter_mut()
            .find(|p| p.account_id == record.account_id)
        {
            Some(existing) => *existing = record,
            None => self.players.push(record),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerHeroes {
    pub account_id: u32,
    pub known: ProfileRecord,
    pub heroes: Vec<HeroPlayRecord>,
}

#[derive(Debug, Clone)]
pub struct ProfileReport {
    pub filter: HeroFilter,
    pub players: Vec<PlayerHeroes>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub user: String,
    pub session: SessionRecord,
}

/// Result of a dispatched command.
#[derive(Debug, Clone)]
pub enum Response {
    Team(TeamResult),
    Profiles(ProfileReport),
    Sessions(Vec<UserSession>),
}

pub struct Scout {
    store: Arc<Store>,
    stats: OpenDotaClient,
    roster: RosterScraper,
    heroes: Arc<HeroTable>,
}

impl Scout {
    pub fn new(
        store: Arc<Store>,
        stats: OpenDotaClient,
        roster: RosterScraper,
        heroes: Arc<HeroTable>,
    ) -> Self {
        Self {
            store,
            stats,
            roster,
            heroes,
        }
    }

    pub fn heroes(&self) -> &HeroTable {
        &self.heroes
    }

    /// Run `command` on behalf of `user`, creating their session on first use.
    pub async fn dispatch(&self, user: &str, command: Command) -> Result<Response, AppError> {
        info!(user, command = command.name(), "🛠️ Command received");

        if self.store.ensure(Resource::Session, user).await? {
            info!(user, "New session created");
        }

        match command {
            Command::Lookup(args) => self
                .lookup(user, args.team, args.last)
                .await
                .map(Response::Team),
            Command::Profile(args) => self
                .profile(user, &args.players, args.last, args.filter())
                .await
                .map(Response::Profiles),
            Command::Stalk(args) => self.stalk(user, &args.users).await.map(Response::Sessions),
        }
    }

    /// Fetch every player summary concurrently. The batch fails if any
    /// request fails, once all of them have completed.
    async fn fetch_players(&self, account_ids: &[u32]) -> Result<Vec<PlayerDto>, AppError> {
        join_all(account_ids.iter().map(|id| self.stats.get_player(*id)))
            .await
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::num::NonZeroU32;

    use httpmock::MockServer;

    use super::*;
    use crate::csl::RosterSelectors;
    use crate::db::FileBackend;

    pub const TEAM_PAGE: &str = r#"
        <div class="hero-title"><h3><a href="/dota2/teams/839">Michigan</a></h3></div>
        <span class="tool-tip" data-tip="Steam ID: STEAM_0:1:51900704"><a href="/u/1">tangy</a></span>
        <span class="tool-tip" data-tip="Steam ID: STEAM_0:0:10"><a href="/u/2">bo</a></span>
    "#;

    pub const TANGY: u32 = 103_801_409;
    pub const BO: u32 = 20;

    pub struct Harness {
        pub scout: Scout,
        pub store: Arc<Store>,
        pub csl: MockServer,
        pub opendota: MockServer,
        _dir: tempfile::TempDir,
    }

    pub async fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            Store::with_backend(Box::new(FileBackend::new(dir.path().into())))
                .await
                .unwrap(),
        );
        let csl = MockServer::start_async().await;
        let opendota = MockServer::start_async().await;
        let http = reqwest::Client::new();

        let scout = Scout::new(
            store.clone(),
            OpenDotaClient::new(
                http.clone(),
                opendota.base_url(),
                NonZeroU32::new(6000).unwrap(),
            ),
            RosterScraper::new(http, csl.base_url(), &RosterSelectors::default()).unwrap(),
            Arc::new(HeroTable::from_pairs([(1, "Anti-Mage"), (2, "Axe"), (3, "Bane")])),
        );

        Harness {
            scout,
            store,
            csl,
            opendota,
            _dir: dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::harness;
    use super::*;
    use crate::command;

    #[tokio::test]
    async fn dispatch_creates_session_lazily() {
        let h = harness().await;
        assert!(h.store.session("ann").await.unwrap().is_none());

        let response = h
            .scout
            .dispatch("ann", command::parse("stalk").unwrap())
            .await
            .unwrap();

        let Response::Sessions(sessions) = response else {
            panic!("expected sessions");
        };
        assert_eq!(sessions[0].user, "ann");
        assert_eq!(sessions[0].session, SessionRecord::default());
        assert_eq!(
            h.store.session("ann").await.unwrap(),
            Some(SessionRecord::default())
        );
    }

    #[tokio::test]
    async fn dispatch_surfaces_usage_errors() {
        let h = harness().await;

        let res = h
            .scout
            .dispatch("ann", command::parse("lookup").unwrap())
            .await;

        assert!(matches!(res, Err(AppError::Usage(_))));
    }

    #[test]
    fn team_result_overwrites_repeated_players() {
        let mut result = TeamResult::new(TeamRef(1), "T".into());
        let record = |name: &str| PlayerRecord {
            site_name: name.into(),
            account_id: 5,
            stats: PlayerDto::default(),
            known: ProfileRecord::default(),
        };

        result.insert(record("old"));
        result.insert(record("new"));

        assert_eq!(result.players.len(), 1);
        assert_eq!(result.players[0].site_name, "new");
    }
}
