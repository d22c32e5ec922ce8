use std::{future::Future, pin::Pin};

use poise::{
    serenity_prelude::{self as serenity, FullEvent},
    FrameworkContext,
};
use tracing::{info, trace};

use crate::{errors::CommandError, PoiseData};

async fn event_handler(
    _serenity_ctx: &serenity::Context,
    event: &FullEvent,
    _framework_ctx: FrameworkContext<'_, PoiseData, CommandError>,
    data: &PoiseData,
) -> Result<(), CommandError> {
    match event {
        FullEvent::Ready { data_about_bot } => {
            info!(
                id = %data_about_bot.user.id,
                name = %data_about_bot.user.name,
                guilds = data_about_bot.guilds.len(),
                "logged in"
            );
        }
        FullEvent::ChannelDelete { channel, .. } => {
            let key = crate::trends::GameKey::new(channel.guild_id, channel.id);
            if data.games().remove(key).await.is_ok() {
                trace!(channel = %channel.id, "dropped game for deleted channel");
            }
        }
        _ => (),
    }

    Ok(())
}

pub fn poise<'a>(
    serenity_ctx: &'a serenity::Context,
    event: &'a FullEvent,
    framework_ctx: FrameworkContext<'a, PoiseData, CommandError>,
    data: &'a PoiseData,
) -> Pin<Box<dyn Future<Output = Result<(), CommandError>> + Send + 'a>> {
    Box::pin(event_handler(serenity_ctx, event, framework_ctx, data))
}
