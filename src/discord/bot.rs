use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

use crate::command::Command;
use crate::error::AppError;
use crate::scout::Scout;

use super::format;
use super::{commands, handler};

/// Shared data accessible in all commands and events
pub struct Data {
    pub scout: Arc<Scout>,
    pub message_limit: usize,
}

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("scout", &"<Scout>")
            .field("message_limit", &self.message_limit)
            .finish()
    }
}

impl Data {
    /// Dispatch `command` for `user` and render the outcome as ordered pages.
    /// Failures are rendered as a single quoted error page.
    pub async fn respond(&self, user: &str, command: Command) -> Vec<String> {
        let name = command.name();
        let blocks = match self.scout.dispatch(user, command).await {
            Ok(response) => format::render(&response, self.scout.heroes()),
            Err(e) => {
                if e.is_user_facing() {
                    warn!(
                        user,
                        command = name,
                        status = ?e.status(),
                        error = %e,
                        "🎮 ⚠️ Command rejected"
                    );
                } else {
                    error!(user, command = name, error = ?e, "🎮 ❌ Command failed");
                }
                vec![format::error_block(&e)]
            }
        };
        format::paginate(&blocks, self.message_limit)
    }
}

pub type Context<'a> = poise::Context<'a, Data, AppError>;

pub fn create_framework(data: Data) -> poise::Framework<Data, AppError> {
    poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![commands::lookup(), commands::profile(), commands::stalk()],
            event_handler: |ctx, event, framework, data| {
                Box::pin(handler::event_handler(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    handle_error(error).await;
                })
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!(
                    bot_name = %ready.user.name,
                    guild_count = ready.guilds.len(),
                    "🎮 Bot is ready"
                );
                Ok(data)
            })
        })
        .build()
}

pub fn intents() -> serenity::GatewayIntents {
    serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
}

async fn handle_error(error: poise::FrameworkError<'_, Data, AppError>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(
                error = ?error,
                command = ctx.command().name.as_str(),
                user_id = %ctx.author().id,
                "🎮 ❌ Command execution failed"
            );
            let _ = ctx.say(format::error_block(&error)).await;
        }
        poise::FrameworkError::ArgumentParse { error, ctx, .. } => {
            warn!(
                error = %error,
                command = ctx.command().name.as_str(),
                "🎮 ⚠️ Invalid command argument"
            );
            let _ = ctx.say(format!("Invalid argument: {error}")).await;
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!(
                error = ?error,
                event = event.snake_case_name(),
                "🎮 ❌ Event handler failed"
            );
        }
        other => {
            error!(error = ?other, "🎮 ❌ Unhandled framework error");
        }
    }
}
