//! Chat text rendering of command results.

use std::fmt::Write;

use crate::error::AppError;
use crate::opendota::{HeroFilter, HeroTable, PlayerDto};
use crate::scout::{
    PlayerHeroes, PlayerRecord, ProfileReport, Response, TeamResult, UserSession,
};
use crate::steam;

const SEPARATOR: &str = "----------------------------------------";
const MIN_HERO_COLUMN: usize = 20;
const MEDALS: [&str; 8] = [
    "Herald", "Guardian", "Crusader", "Archon", "Legend", "Ancient", "Divine", "Immortal",
];

/// Render `response` as text blocks, one per logical unit.
pub fn render(response: &Response, heroes: &HeroTable) -> Vec<String> {
    match response {
        Response::Team(team) => lookup_blocks(team),
        Response::Profiles(report) => profile_blocks(report, heroes),
        Response::Sessions(sessions) => stalk_blocks(sessions),
    }
}

/// Error text shown to the requesting user.
pub fn error_block(error: &AppError) -> String {
    format!("```\n{error}\n```")
}

/// Greedily join blocks with newlines into pages of at most `limit`
/// characters. A block longer than `limit` gets a page of its own.
pub fn paginate(blocks: &[String], limit: usize) -> Vec<String> {
    let mut pages: Vec<String> = Vec::new();
    let mut current_len = 0;

    for block in blocks {
        let len = block.chars().count();
        match pages.last_mut() {
            Some(page) if current_len + 1 + len <= limit => {
                page.push('\n');
                page.push_str(block);
                current_len += 1 + len;
            }
            _ => {
                pages.push(block.clone());
                current_len = len;
            }
        }
    }

    pages
}

/// Medal of a player, e.g. `Legend 3`, `Immortal #120` or `Unranked`.
pub fn rank_string(player: &PlayerDto) -> String {
    let Some(tier) = player.rank_tier else {
        return "Unranked".into();
    };
    if let Some(position) = player.leaderboard_rank {
        return format!("Immortal #{position}");
    }

    let medal = (tier / 10)
        .checked_sub(1)
        .and_then(|i| MEDALS.get(i as usize))
        .copied()
        .unwrap_or("Unknown");
    if tier < 80 {
        format!("{medal} {}", tier % 10)
    } else {
        medal.to_string()
    }
}

fn or_unknown<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "?".into())
}

fn lookup_blocks(team: &TeamResult) -> Vec<String> {
    let mut blocks = Vec::with_capacity(team.players.len() + 2);
    blocks.push(format!("**{}** (team {})", team.team_name, team.team));
    blocks.extend(team.players.iter().map(player_block));
    blocks.push(SEPARATOR.to_string());
    blocks
}

fn player_block(player: &PlayerRecord) -> String {
    let id = player.account_id;
    let stats_name = player
        .stats
        .persona_name()
        .or(player.known.stats_name.as_deref());

    let mut block = String::new();
    let _ = writeln!(block, "{SEPARATOR}");
    let _ = writeln!(block, "CSL USERNAME:   {}", player.site_name);
    let _ = writeln!(block, "STEAM USERNAME: {}", or_unknown(stats_name));
    let _ = writeln!(
        block,
        "SOLO MMR: {}",
        or_unknown(player.stats.solo_competitive_rank)
    );
    let _ = writeln!(block, "MMR ESTIMATE: {}", or_unknown(player.stats.mmr_estimate()));
    let _ = writeln!(block, "RANK TIER: {}", rank_string(&player.stats));
    let _ = writeln!(block, "<https://www.dotabuff.com/players/{id}>");
    let _ = writeln!(block, "<https://www.opendota.com/players/{id}>");
    let _ = write!(
        block,
        "<https://steamcommunity.com/profiles/{}>",
        steam::convert_32id_to_64id(id)
    );
    block
}

fn profile_blocks(report: &ProfileReport, heroes: &HeroTable) -> Vec<String> {
    let width = heroes.max_name_len().max(MIN_HERO_COLUMN) + 1;

    let mut blocks = Vec::with_capacity(report.players.len() + 1);
    blocks.push(filter_header(&report.filter));
    blocks.extend(report.players.iter().map(|p| hero_block(p, width)));
    blocks
}

fn hero_block(player: &PlayerHeroes, width: usize) -> String {
    let name = player
        .known
        .display_name()
        .map(str::to_string)
        .unwrap_or_else(|| player.account_id.to_string());

    let mut block = format!("{name} ({}):\n```\n", player.account_id);
    for hero in &player.heroes {
        let _ = writeln!(
            block,
            "{:<width$}{:>3} games @ {:.2}% winrate",
            hero.localized_name,
            hero.games,
            100.0 * hero.win_rate,
        );
    }
    if player.heroes.is_empty() {
        block.push_str("No heroes!\n");
    }
    block.push_str("```");
    block
}

fn filter_header(filter: &HeroFilter) -> String {
    let lobby = if filter.tourney_only { "tournament " } else { "" };
    format!(
        "Top {} heroes with at least {} games in the last {} {lobby}games",
        filter.max_heroes, filter.min_games, filter.num_games
    )
}

fn stalk_blocks(sessions: &[UserSession]) -> Vec<String> {
    sessions
        .iter()
        .map(|s| {
            let team = or_unknown(s.session.last_team);
            let players = match &s.session.last_players {
                Some(players) if !players.is_empty() => players
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => "?".into(),
            };
            format!(
                "**{}**\n```\nLAST TEAM:    {team}\nLAST PLAYERS: {players}\n```",
                s.user
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csl::TeamRef;
    use crate::db::{ProfileRecord, SessionRecord};
    use crate::opendota::types::{HeroPlayRecord, ProfileDto};

    fn ranked(tier: Option<u32>, leaderboard: Option<u32>) -> PlayerDto {
        PlayerDto {
            rank_tier: tier,
            leaderboard_rank: leaderboard,
            ..Default::default()
        }
    }

    #[test]
    fn rank_strings() {
        assert_eq!(rank_string(&ranked(None, None)), "Unranked");
        assert_eq!(rank_string(&ranked(Some(11), None)), "Herald 1");
        assert_eq!(rank_string(&ranked(Some(54), None)), "Legend 4");
        assert_eq!(rank_string(&ranked(Some(80), None)), "Immortal");
        assert_eq!(rank_string(&ranked(Some(80), Some(120))), "Immortal #120");
    }

    #[test]
    fn pages_rejoin_to_the_input_blocks() {
        let blocks: Vec<String> = (0..40)
            .map(|i| "x".repeat((i * 37) % 90 + 1))
            .collect();

        for limit in [91, 100, 250, 2000] {
            let pages = paginate(&blocks, limit);

            assert_eq!(pages.join("\n"), blocks.join("\n"));
            assert!(pages.iter().all(|p| p.chars().count() <= limit));
        }
    }

    #[test]
    fn pages_fill_greedily() {
        let blocks = vec!["aaaa".to_string(), "bbbb".to_string(), "cccc".to_string()];

        assert_eq!(paginate(&blocks, 9), vec!["aaaa\nbbbb", "cccc"]);
        assert_eq!(paginate(&blocks, 8), vec!["aaaa", "bbbb", "cccc"]);
        assert!(paginate(&[], 10).is_empty());
    }

    #[test]
    fn oversized_block_gets_its_own_page() {
        let blocks = vec!["a".to_string(), "b".repeat(20), "c".to_string()];

        assert_eq!(paginate(&blocks, 10), vec!["a".to_string(), "b".repeat(20), "c".into()]);
    }

    #[test]
    fn lookup_lists_every_player() {
        let team = TeamResult {
            team: TeamRef(839),
            team_name: "Michigan".into(),
            players: vec![PlayerRecord {
                site_name: "tangy".into(),
                account_id: 103_801_409,
                stats: PlayerDto {
                    profile: Some(ProfileDto {
                        personaname: Some("tangy_steam".into()),
                        ..Default::default()
                    }),
                    rank_tier: Some(54),
                    ..Default::default()
                },
                known: ProfileRecord::default(),
            }],
        };

        let blocks = render(&Response::Team(team), &HeroTable::default());

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], "**Michigan** (team 839)");
        assert!(blocks[1].contains("CSL USERNAME:   tangy"));
        assert!(blocks[1].contains("STEAM USERNAME: tangy_steam"));
        assert!(blocks[1].contains("SOLO MMR: ?"));
        assert!(blocks[1].contains("RANK TIER: Legend 4"));
        assert!(blocks[1].contains("opendota.com/players/103801409"));
        assert!(blocks[1].contains("steamcommunity.com/profiles/76561198064067137"));
    }

    #[test]
    fn profile_renders_heroes_or_placeholder() {
        let report = ProfileReport {
            filter: HeroFilter::default(),
            players: vec![
                PlayerHeroes {
                    account_id: 1,
                    known: ProfileRecord {
                        site_name: Some("ann".into()),
                        stats_name: None,
                    },
                    heroes: vec![HeroPlayRecord {
                        localized_name: "Axe".into(),
                        games: 12,
                        win_rate: 0.75,
                    }],
                },
                PlayerHeroes {
                    account_id: 2,
                    known: ProfileRecord::default(),
                    heroes: vec![],
                },
            ],
        };

        let blocks = render(&Response::Profiles(report), &HeroTable::default());

        assert_eq!(
            blocks[0],
            "Top 5 heroes with at least 5 games in the last 100 games"
        );
        assert!(blocks[1].starts_with("ann (1):\n```\n"));
        assert!(blocks[1].contains(&format!("{:<21} 12 games @ 75.00% winrate", "Axe")));
        assert!(blocks[1].ends_with("```"));
        assert!(blocks[2].starts_with("2 (2):"));
        assert!(blocks[2].contains("No heroes!"));
    }

    #[test]
    fn tournament_filter_is_named_in_the_header() {
        let filter = HeroFilter {
            num_games: 40,
            max_heroes: 3,
            min_games: 2,
            tourney_only: true,
        };

        assert_eq!(
            filter_header(&filter),
            "Top 3 heroes with at least 2 games in the last 40 tournament games"
        );
    }

    #[test]
    fn stalk_shows_last_queries() {
        let sessions = vec![UserSession {
            user: "ann".into(),
            session: SessionRecord {
                last_team: Some(TeamRef(839)),
                last_players: Some(vec![1, 2]),
            },
        }];

        let blocks = render(&Response::Sessions(sessions), &HeroTable::default());

        assert!(blocks[0].contains("LAST TEAM:    839"));
        assert!(blocks[0].contains("LAST PLAYERS: 1, 2"));
    }

    #[test]
    fn errors_are_quoted() {
        let block = error_block(&AppError::Usage("bad".into()));
        assert_eq!(block, "```\nbad\n```");
    }
}
