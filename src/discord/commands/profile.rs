use tracing::instrument;

use super::reply;
use crate::command::{Command, ProfileArgs};
use crate::discord::bot::Context;
use crate::error::AppError;
use crate::opendota::HeroFilter;

/// Most played heroes of players
#[poise::command(slash_command)]
#[instrument(skip(ctx), fields(user = %ctx.author().name))]
pub async fn profile(
    ctx: Context<'_>,
    #[description = "Steam32 IDs separated by spaces"] players: Option<String>,
    #[description = "Use the last players you looked up"] last: Option<bool>,
    #[description = "Number of recent games to consider"] num_games: Option<u32>,
    #[description = "Report at most this many heroes"] max_heroes: Option<usize>,
    #[description = "Minimum games played on a hero"] min_games: Option<u32>,
    #[description = "Only consider tournament lobbies"] tourney_only: Option<bool>,
) -> Result<(), AppError> {
    let players = parse_players(players.as_deref().unwrap_or_default())?;
    let defaults = HeroFilter::default();

    reply(
        ctx,
        Command::Profile(ProfileArgs {
            players,
            last: last.unwrap_or(false),
            num_games: num_games.unwrap_or(defaults.num_games),
            max_heroes: max_heroes.unwrap_or(defaults.max_heroes),
            min_games: min_games.unwrap_or(defaults.min_games),
            tourney_only: tourney_only.unwrap_or(defaults.tourney_only),
        }),
    )
    .await
}

fn parse_players(text: &str) -> Result<Vec<u32>, AppError> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| AppError::Usage(format!("Profile: `{s}` is not a Steam32 ID")))
        })
        .collect()
}
