use serde::{Deserialize, Deserializer, Serialize};

use super::heroes::HeroTable;

// ============================================================================
// /players/{account_id}
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlayerDto {
    #[serde(default)]
    pub profile: Option<ProfileDto>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub solo_competitive_rank: Option<i64>,
    #[serde(default)]
    pub rank_tier: Option<u32>,
    #[serde(default)]
    pub leaderboard_rank: Option<u32>,
    #[serde(default)]
    pub mmr_estimate: Option<MmrEstimateDto>,
}

impl PlayerDto {
    pub fn persona_name(&self) -> Option<&str> {
        self.profile.as_ref().and_then(|p| p.personaname.as_deref())
    }

    pub fn mmr_estimate(&self) -> Option<i64> {
        self.mmr_estimate.as_ref().and_then(|m| m.estimate)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProfileDto {
    #[serde(default)]
    pub personaname: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MmrEstimateDto {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub estimate: Option<i64>,
}

/// Numbers that the API sometimes quotes.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Float(f64),
    Str(String),
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<RawNumber>::deserialize(deserializer)? {
        Some(RawNumber::Int(v)) => Some(v),
        Some(RawNumber::Float(v)) => Some(v.round() as i64),
        Some(RawNumber::Str(s)) => s.trim().parse().ok(),
        None => None,
    })
}

// ============================================================================
// /players/{account_id}/heroes
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct HeroPlayDto {
    #[serde(deserialize_with = "hero_id_from_str_or_int")]
    pub hero_id: u32,
    #[serde(default)]
    pub games: u32,
    #[serde(default)]
    pub win: u32,
}

/// The heroes endpoint has served `hero_id` both as a number and as a string.
fn hero_id_from_str_or_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    match RawNumber::deserialize(deserializer)? {
        RawNumber::Int(id) => u32::try_from(id).map_err(serde::de::Error::custom),
        RawNumber::Float(_) => Err(serde::de::Error::custom("hero_id is not an integer")),
        RawNumber::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// One hero of a player's history, enriched with its name and win rate.
#[derive(Debug, Clone, PartialEq)]
pub struct HeroPlayRecord {
    pub localized_name: String,
    pub games: u32,
    pub win_rate: f64,
}

impl HeroPlayRecord {
    pub fn from_dto(dto: &HeroPlayDto, heroes: &HeroTable) -> Self {
        Self {
            localized_name: heroes.localized_name(dto.hero_id),
            games: dto.games,
            win_rate: win_rate(dto.win, dto.games),
        }
    }
}

/// `wins / games`, or `0.0` for a hero that was never played.
pub fn win_rate(wins: u32, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        f64::from(wins) / f64::from(games)
    }
}

/// Options of a hero history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeroFilter {
    /// Number of recent matches the API looks back at.
    pub num_games: u32,
    /// Most played heroes kept per player.
    pub max_heroes: usize,
    /// Heroes with fewer games are dropped.
    pub min_games: u32,
    /// Restrict to tournament lobbies.
    pub tourney_only: bool,
}

impl Default for HeroFilter {
    fn default() -> Self {
        Self {
            num_games: 100,
            max_heroes: 5,
            min_games: 5,
            tourney_only: false,
        }
    }
}

/// Enrich, filter by `min_games`, sort by games played (descending, stable)
/// and keep at most `max_heroes` entries.
pub fn summarize_heroes(
    history: &[HeroPlayDto],
    heroes: &HeroTable,
    filter: &HeroFilter,
) -> Vec<HeroPlayRecord> {
    let mut records: Vec<HeroPlayRecord> = history
        .iter()
        .filter(|h| h.games >= filter.min_games)
        .map(|h| HeroPlayRecord::from_dto(h, heroes))
        .collect();

    records.sort_by(|a, b| b.games.cmp(&a.games));
    records.truncate(filter.max_heroes);
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(hero_id: u32, games: u32, win: u32) -> HeroPlayDto {
        HeroPlayDto {
            hero_id,
            games,
            win,
        }
    }

    #[test]
    fn win_rate_is_zero_without_games() {
        assert_eq!(win_rate(0, 0), 0.0);
        assert_eq!(win_rate(3, 4), 0.75);
    }

    #[test]
    fn summarize_filters_sorts_and_truncates() {
        let heroes = HeroTable::from_pairs([(1, "Anti-Mage"), (2, "Axe"), (3, "Bane")]);
        let history = vec![
            play(1, 5, 2),
            play(2, 12, 6),
            play(3, 4, 4),
            play(4, 9, 0),
            play(5, 30, 15),
            play(6, 7, 7),
        ];
        let filter = HeroFilter {
            min_games: 5,
            max_heroes: 3,
            ..Default::default()
        };

        let summary = summarize_heroes(&history, &heroes, &filter);

        assert_eq!(summary.len(), 3);
        assert!(summary.iter().all(|h| h.games >= 5));
        assert_eq!(
            summary.iter().map(|h| h.games).collect::<Vec<_>>(),
            vec![30, 12, 9]
        );
        assert_eq!(summary[1].localized_name, "Axe");
        assert_eq!(summary[1].win_rate, 0.5);
        assert_eq!(summary[2].win_rate, 0.0);
    }

    #[test]
    fn summarize_keeps_input_order_on_ties() {
        let heroes = HeroTable::from_pairs([(1, "Anti-Mage"), (2, "Axe")]);
        let history = vec![play(2, 10, 1), play(1, 10, 2)];

        let summary = summarize_heroes(&history, &heroes, &HeroFilter::default());

        assert_eq!(summary[0].localized_name, "Axe");
        assert_eq!(summary[1].localized_name, "Anti-Mage");
    }

    #[test]
    fn zero_game_heroes_have_zero_win_rate() {
        let heroes = HeroTable::default();
        let filter = HeroFilter {
            min_games: 0,
            ..Default::default()
        };

        let summary = summarize_heroes(&[play(7, 0, 0)], &heroes, &filter);

        assert_eq!(summary[0].win_rate, 0.0);
        assert_eq!(summary[0].localized_name, "Unknown hero 7");
    }

    #[test]
    fn hero_id_accepts_strings_and_numbers() {
        let parsed: Vec<HeroPlayDto> = serde_json::from_str(
            r#"[{"hero_id": "14", "games": 3, "win": 1}, {"hero_id": 8, "games": 2, "win": 2}]"#,
        )
        .unwrap();

        assert_eq!(parsed[0].hero_id, 14);
        assert_eq!(parsed[1].hero_id, 8);
    }

    #[test]
    fn player_without_profile_parses() {
        let player: PlayerDto =
            serde_json::from_str(r#"{"rank_tier": null, "mmr_estimate": {}}"#).unwrap();

        assert!(player.persona_name().is_none());
        assert!(player.mmr_estimate().is_none());
    }

    #[test]
    fn quoted_ranks_parse() {
        let player: PlayerDto = serde_json::from_str(
            r#"{"solo_competitive_rank": "4120", "mmr_estimate": {"estimate": 3987}}"#,
        )
        .unwrap();

        assert_eq!(player.solo_competitive_rank, Some(4120));
        assert_eq!(player.mmr_estimate(), Some(3987));
    }
}
