use regex::Regex;
use reqwest::StatusCode;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::team_ref::TeamRef;
use crate::error::AppError;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/39.0.2171.95 Safari/537.36";

const LEGACY_ID_PATTERN: &str = r"STEAM_\d+:[01]:\d+";

/// CSS selectors locating the roster on a team page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSelectors {
    /// Heading holding the team name.
    pub team_name: String,
    /// One element per player, carrying the Steam ID somewhere in its markup.
    pub player: String,
    /// Display name, relative to a player element.
    pub player_name: String,
}

impl Default for RosterSelectors {
    fn default() -> Self {
        Self {
            team_name: "div.hero-title h3".into(),
            player: "span.tool-tip".into(),
            player_name: "a".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub display_name: String,
    pub legacy_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub team_name: String,
    pub players: Vec<RosterEntry>,
}

#[derive(Debug)]
struct CompiledSelectors {
    team_name: Selector,
    player: Selector,
    player_name: Selector,
}

#[derive(Debug)]
pub struct RosterScraper {
    client: reqwest::Client,
    base_url: String,
    selectors: CompiledSelectors,
    legacy_id: Regex,
}

fn compile(selector: &str) -> Result<Selector, AppError> {
    Selector::parse(selector)
        .map_err(|e| AppError::Config(format!("invalid selector `{selector}`: {e}")))
}

impl RosterScraper {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        selectors: &RosterSelectors,
    ) -> Result<Self, AppError> {
        let legacy_id = Regex::new(LEGACY_ID_PATTERN)
            .map_err(|e| AppError::Config(format!("invalid Steam ID pattern: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            selectors: CompiledSelectors {
                team_name: compile(&selectors.team_name)?,
                player: compile(&selectors.player)?,
                player_name: compile(&selectors.player_name)?,
            },
            legacy_id,
        })
    }

    pub fn team_url(&self, team: TeamRef) -> String {
        format!(
            "{}/dota2/teams/{}",
            self.base_url,
            urlencoding::encode(&team.to_string())
        )
    }

    /// Fetch a team page and extract its name and players.
    pub async fn fetch_roster(&self, team: TeamRef) -> Result<Roster, AppError> {
        let url = self.team_url(team);
        tracing::trace!("[CSL::SCRAPER] fetching {}", url);

        let res = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;
        let body = match res.status() {
            StatusCode::OK => res.text().await?,
            status => return Err(AppError::remote("CSL", url, status)),
        };

        let roster = self.parse_roster(&body)?;
        debug!(
            team = %team,
            team_name = %roster.team_name,
            players = roster.players.len(),
            "Roster scraped"
        );
        Ok(roster)
    }

    /// Extract the roster from a team page. Any missing piece fails the whole
    /// page rather than yielding a partial roster.
    pub fn parse_roster(&self, html: &str) -> Result<Roster, AppError> {
        let document = Html::parse_document(html);

        let team_name = document
            .select(&self.selectors.team_name)
            .next()
            .map(element_text)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::Parse("team name heading not found".into()))?;

        let players = document
            .select(&self.selectors.player)
            .enumerate()
            .map(|(index, element)| self.parse_player(index, element))
            .collect::<Result<Vec<_>, _>>()?;

        if players.is_empty() {
            return Err(AppError::Parse(format!("no players found for {team_name}")));
        }

        Ok(Roster { team_name, players })
    }

    fn parse_player(&self, index: usize, element: ElementRef<'_>) -> Result<RosterEntry, AppError> {
        let legacy_id = self
            .legacy_id
            .find(&element.html())
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| AppError::Parse(format!("player #{} has no Steam ID", index + 1)))?;

        let display_name = element
            .select(&self.selectors.player_name)
            .next()
            .map(element_text)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::Parse(format!("player #{} has no display name", index + 1)))?;

        Ok(RosterEntry {
            display_name,
            legacy_id,
        })
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
