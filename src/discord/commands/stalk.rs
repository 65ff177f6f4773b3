use tracing::instrument;

use super::reply;
use crate::command::{Command, StalkArgs};
use crate::discord::bot::Context;
use crate::error::AppError;

/// Show what users looked up last
#[poise::command(slash_command)]
#[instrument(skip(ctx), fields(user = %ctx.author().name))]
pub async fn stalk(
    ctx: Context<'_>,
    #[description = "User names separated by spaces, yourself if empty"] users: Option<String>,
) -> Result<(), AppError> {
    let users = users
        .as_deref()
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    reply(ctx, Command::Stalk(StalkArgs { users })).await
}
