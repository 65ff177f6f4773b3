use poise::serenity_prelude as serenity;
use serenity::ActivityData;
use tracing::{debug, info, warn};

use crate::command;
use crate::error::AppError;

use super::Data;

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    framework: poise::FrameworkContext<'_, Data, AppError>,
    data: &Data,
) -> Result<(), AppError> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!("🤖 [DISCORD] connected as {}", data_about_bot.user.name);
            info!(
                "🎮 [DISCORD] joined {} guild(s)",
                data_about_bot.guilds.len()
            );
            ctx.set_activity(Some(ActivityData::playing("Secret Strats")));
        }
        serenity::FullEvent::Message { new_message } if !new_message.author.bot => {
            if let Some(text) = strip_mention(&new_message.content, framework.bot_id.get()) {
                handle_message(ctx, data, new_message, text).await?;
            }
        }
        _ => {}
    }

    Ok(())
}

async fn handle_message(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
    text: &str,
) -> Result<(), AppError> {
    let user = message.author.name.as_str();
    debug!(user, text, "💬 [DISCORD] mention received");

    let pages = if text.is_empty() {
        vec![code_block(&command::help())]
    } else {
        match command::parse(text) {
            Ok(command) => {
                if let Err(e) = message.channel_id.broadcast_typing(&ctx.http).await {
                    warn!(error = %e, "⚠️ [DISCORD] could not send typing indicator");
                }
                data.respond(user, command).await
            }
            Err(usage) => vec![code_block(&usage)],
        }
    };

    for page in pages {
        message.channel_id.say(&ctx.http, page).await?;
    }
    Ok(())
}

fn code_block(text: &str) -> String {
    format!("```\n{}\n```", text.trim_end())
}

/// Command text of a message addressed to the bot, i.e. starting with a
/// `<@id>` or `<@!id>` mention of `bot_id`.
fn strip_mention(content: &str, bot_id: u64) -> Option<&str> {
    let rest = content.trim_start().strip_prefix("<@")?;
    let rest = rest.strip_prefix('!').unwrap_or(rest);
    let (id, text) = rest.split_once('>')?;

    (id.parse::<u64>().ok()? == bot_id).then(|| text.trim())
}
