use poise::PrefixFrameworkOptions;
use tracing::{trace, warn};

use crate::{commands, errors};

use super::{data::PoiseData, event_handler};

pub fn build(data: PoiseData) -> poise::Framework<PoiseData, errors::CommandError> {
    poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::list(),
            prefix_options: PrefixFrameworkOptions {
                prefix: Some(data.config().bot.prefix().to_string()),
                ..Default::default()
            },
            on_error: errors::handle_framework_error,
            event_handler: event_handler::poise,
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                let http = ctx.http.clone();
                let commands = framework.options().commands.as_ref();
                let bot = &data.config().bot;

                if let Some(guild_id) = bot.testing_server() {
                    poise::builtins::register_in_guild(&http, commands, *guild_id).await?;
                }

                poise::builtins::register_globally(&http, commands).await?;

                ctx.set_activity(bot.activity());

                trace!("finished setup, accepting commands");

                if let Some(status_channel) = bot.status_channel() {
                    if let Err(err) = status_channel.say(&http, "ready!").await {
                        warn!(%err, "couldn't announce startup in status channel");
                    }
                }

                Ok(data)
            })
        })
        .build()
}
