use tracing::instrument;

use super::reply;
use crate::command::{Command, LookupArgs};
use crate::csl::TeamRef;
use crate::discord::bot::Context;
use crate::error::AppError;

/// Look up a CSL team roster with ranks and profile links
#[poise::command(slash_command)]
#[instrument(skip(ctx), fields(user = %ctx.author().name))]
pub async fn lookup(
    ctx: Context<'_>,
    #[description = "Team number or team page URL"] team: Option<String>,
    #[description = "Use the last team you looked up"] last: Option<bool>,
) -> Result<(), AppError> {
    let team = team.as_deref().map(str::parse::<TeamRef>).transpose()?;

    reply(
        ctx,
        Command::Lookup(LookupArgs {
            team,
            last: last.unwrap_or(false),
        }),
    )
    .await
}
