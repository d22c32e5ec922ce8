use poise::serenity_prelude::Mentionable;
use tracing::{info, instrument};

use crate::{
    commands::{leaderboard_text, LogCommands},
    errors::SendMessageError,
    utils::{
        poise::{CommandResult, ContextExt},
        Context,
    },
};

/// play the google trends game in this channel
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    discard_spare_arguments,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL",
    subcommands("start", "end", "list", "scores")
)]
pub async fn game(ctx: Context<'_>) -> CommandResult {
    ctx.log_command().await;

    poise::builtins::help(
        ctx,
        Some("game"),
        poise::builtins::HelpConfiguration::default(),
    )
    .await
    .map_err(SendMessageError::from)?;

    Ok(())
}

/// start a game in this channel
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    discard_spare_arguments,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL"
)]
async fn start(ctx: Context<'_>) -> CommandResult {
    ctx.log_command().await;

    let games = ctx.data().games();
    games.create(ctx.game_key()?).await?;

    info!(channel = %ctx.channel_id(), "game started");

    ctx.reply_ext(format!(
        "started a google trends game with {count} questions! start a round with `round start`",
        count = games.questions().len()
    ))
    .await?;

    Ok(())
}

/// end this channel's game and show the final scores
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    discard_spare_arguments,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL"
)]
async fn end(ctx: Context<'_>) -> CommandResult {
    ctx.log_command().await;

    let game = ctx.data().games().remove(ctx.game_key()?).await?;
    let board = game.lock().await.leaderboard();

    info!(channel = %ctx.channel_id(), players = board.len(), "game ended");

    ctx.reply_ext(format!(
        "game over! final scores:\n{}",
        leaderboard_text(&board)
    ))
    .await?;

    Ok(())
}

/// list the channels in this server with a game going
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    discard_spare_arguments,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL"
)]
async fn list(ctx: Context<'_>) -> CommandResult {
    ctx.log_command().await;

    let guild = ctx.game_key()?.guild;
    let channels = ctx.data().games().list(guild).await;

    let text = if channels.is_empty() {
        "there aren't any games going in this server!".to_owned()
    } else {
        let channels: Vec<String> = channels
            .iter()
            .map(|channel| channel.mention().to_string())
            .collect();
        format!("games going in: {}", channels.join(", "))
    };

    ctx.reply_ext(text).await?;

    Ok(())
}

/// show the scores for this channel's game
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    discard_spare_arguments,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL"
)]
async fn scores(ctx: Context<'_>) -> CommandResult {
    ctx.log_command().await;

    let game = ctx.data().games().require(ctx.game_key()?).await?;
    let board = game.lock().await.leaderboard();

    ctx.reply_ext(format!("scores:\n{}", leaderboard_text(&board)))
        .await?;

    Ok(())
}
