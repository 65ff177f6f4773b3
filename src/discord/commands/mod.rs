mod lookup;
mod profile;
mod stalk;

pub use lookup::lookup;
pub use profile::profile;
pub use stalk::stalk;

use crate::command::Command;
use crate::discord::bot::Context;
use crate::error::AppError;

/// Run `command` for the invoking user and send every page in order.
async fn reply(ctx: Context<'_>, command: Command) -> Result<(), AppError> {
    ctx.defer().await?;

    let pages = ctx.data().respond(&ctx.author().name, command).await;
    for page in pages {
        ctx.say(page).await?;
    }
    Ok(())
}
