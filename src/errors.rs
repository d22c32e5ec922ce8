use poise::{
    serenity_prelude::{self as serenity, Permissions},
    BoxFuture, FrameworkError,
};

use thiserror::Error as ThisError;
use thisslime::TracingError;
use tracing::{error, error_span, Instrument};

use crate::{
    trends::GameError,
    utils::{poise::ContextExt, Context},
    PoiseData,
};

pub fn handle_framework_error(
    err: FrameworkError<'_, PoiseData, CommandError>,
) -> BoxFuture<'_, ()> {
    Box::pin(async {
        match err {
            FrameworkError::Command { error, ctx, .. } => {
                let command = ctx.invoked_command_name();
                let span = error_span!("", command);

                handle_error(error, ctx).instrument(span).await;
            }
            FrameworkError::MissingBotPermissions {
                missing_permissions,
                ctx,
                ..
            } => {
                let command = ctx.invoked_command_name();
                let _enter = error_span!("", command).entered();

                error!(%missing_permissions, "bot is missing permissions");
            }
            _ => {
                if let Err(err) = poise::builtins::on_error(err).await {
                    error!(%err, "failed to handle framework error");
                }
            }
        };
    })
}

async fn handle_error(err: CommandError, ctx: Context<'_>) {
    err.trace();

    let text = match err {
        CommandError::Game(ref err) => err.to_string(),
        _ => "something went wrong! check the logs for details".to_owned(),
    };

    if let Err(err) = ctx.reply_ephemeral(text).await {
        error!(%err, "failed to send error message");
    }
}

#[derive(Debug, ThisError, TracingError)]
#[span(level = WARN)]
pub enum CommandError {
    #[error(transparent)]
    #[event(level = WARN)]
    Game(#[from] GameError),

    #[error("failed to send a message: {0}")]
    SendMessage(#[from] SendMessageError),

    #[error("other serenity error: {0}")]
    #[event(level = ERROR)]
    Serenity(#[from] serenity::Error),
}

#[derive(Debug, ThisError, TracingError)]
#[span(level = ERROR)]
pub enum SendMessageError {
    #[error(transparent)]
    Permissions(#[from] MissingPermissionsError),

    #[error(transparent)]
    MessageTooLong(#[from] MessageTooLongError),

    #[error("couldn't send message: {0}")]
    #[event(level = ERROR)]
    Other(serenity::Error),
}

impl From<serenity::Error> for SendMessageError {
    fn from(value: serenity::Error) -> Self {
        match value {
            serenity::Error::Model(serenity::ModelError::InvalidPermissions {
                required,
                present,
            }) => Self::Permissions(MissingPermissionsError { required, present }),
            serenity::Error::Model(serenity::ModelError::MessageTooLong(length)) => {
                Self::MessageTooLong(MessageTooLongError { length })
            }
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, ThisError, TracingError)]
#[error("missing permissions: {}", self.missing())]
#[event(level = ERROR)]
pub struct MissingPermissionsError {
    #[field(print = Display)]
    required: Permissions,

    #[field(print = Display)]
    present: Permissions,
}

impl MissingPermissionsError {
    fn missing(&self) -> Permissions {
        self.required.difference(self.present)
    }
}

#[derive(Debug, ThisError, TracingError)]
#[event(level = ERROR)]
#[error("message is too long ({length} characters)")]
pub struct MessageTooLongError {
    pub length: usize,
}
