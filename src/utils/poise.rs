use poise::CreateReply;

use crate::{
    errors::{CommandError, SendMessageError},
    framework::data::PoiseData,
    trends::{GameError, GameKey},
};

pub type Context<'a> = poise::Context<'a, PoiseData, CommandError>;

pub type Error = CommandError;
pub type Command = poise::Command<PoiseData, Error>;
pub type CommandResult = Result<(), Error>;

pub trait ContextExt {
    async fn reply_ephemeral(
        &self,
        text: impl Into<String>,
    ) -> Result<poise::ReplyHandle<'_>, SendMessageError>;

    async fn reply_ext(
        &self,
        text: impl Into<String>,
    ) -> Result<poise::ReplyHandle<'_>, SendMessageError>;

    async fn send_ext(
        &self,
        builder: CreateReply,
    ) -> Result<poise::ReplyHandle<'_>, SendMessageError>;

    /// The game slot for the channel this was invoked in.
    fn game_key(&self) -> Result<GameKey, GameError>;
}

impl ContextExt for Context<'_> {
    async fn reply_ephemeral(
        &self,
        text: impl Into<String>,
    ) -> Result<poise::ReplyHandle<'_>, SendMessageError> {
        let builder = CreateReply::default()
            .reply(true)
            .ephemeral(true)
            .content(text);
        self.send_ext(builder).await
    }

    async fn reply_ext(
        &self,
        text: impl Into<String>,
    ) -> Result<poise::ReplyHandle<'_>, SendMessageError> {
        self.reply(text).await.map_err(SendMessageError::from)
    }

    async fn send_ext(
        &self,
        builder: CreateReply,
    ) -> Result<poise::ReplyHandle<'_>, SendMessageError> {
        self.send(builder).await.map_err(SendMessageError::from)
    }

    fn game_key(&self) -> Result<GameKey, GameError> {
        GameKey::in_guild(self.guild_id(), self.channel_id())
    }
}
