use poise::{
    serenity_prelude::{CreateEmbed, Mentionable},
    CreateReply,
};
use tracing::{info, instrument};

use crate::{
    commands::LogCommands,
    errors::SendMessageError,
    trends::{explore_url, RoundResults, WordPosition},
    utils::{
        poise::{CommandResult, ContextExt},
        Context,
    },
};

/// play rounds of the google trends game
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    discard_spare_arguments,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL",
    subcommands("start", "word", "end", "cancel")
)]
pub async fn round(ctx: Context<'_>) -> CommandResult {
    ctx.log_command().await;

    poise::builtins::help(
        ctx,
        Some("round"),
        poise::builtins::HelpConfiguration::default(),
    )
    .await
    .map_err(SendMessageError::from)?;

    Ok(())
}

/// draw a question and start a round
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

    let game = ctx.data().games().require(ctx.game_key()?).await?;
    let mut game = game.lock().await;

    let question = game.start_round()?.to_owned();
    let left = game.available_questions().len();
    drop(game);

    info!(channel = %ctx.channel_id(), "round started");

    ctx.reply_ext(format!(
        "the question is **{question}**! submit a word to go before or after it with `round word` \
        ({left} questions left)"
    ))
    .await?;

    Ok(())
}

/// submit a word for this round
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL"
)]
async fn word(
    ctx: Context<'_>,
    #[description = "the word to add to the question"]
    #[max_length = 100]
    word: String,
    #[description = "whether your word goes before or after the question"] position: Option<
        WordPosition,
    >,
) -> CommandResult {
    ctx.log_command().await;

    let word = word.trim();
    if word.is_empty() {
        ctx.reply_ephemeral("you need to give a word!").await?;
        return Ok(());
    }

    let game = ctx.data().games().require(ctx.game_key()?).await?;
    let mut game = game.lock().await;

    let player = ctx.author().id;
    if game.is_full_for(player) {
        drop(game);
        ctx.reply_ephemeral("this round is full! wait for the next one")
            .await?;
        return Ok(());
    }

    let phrase = game.add_word(word, player, position.unwrap_or_default())?;
    drop(game);

    ctx.reply_ephemeral(format!("your phrase is **{phrase}**"))
        .await?;

    Ok(())
}

/// end the round and score everyone's phrases
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    discard_spare_arguments,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL | EMBED_LINKS"
)]
async fn end(ctx: Context<'_>) -> CommandResult {
    ctx.log_command().await;

    let _typing = ctx.defer_or_broadcast().await?;

    let game = ctx.data().games().require(ctx.game_key()?).await?;
    let results = game.lock().await.end_round(ctx.data().trends()).await?;

    info!(
        channel = %ctx.channel_id(),
        players = results.awarded.len(),
        scored = results.scored(),
        "round ended"
    );

    ctx.send_ext(CreateReply::default().reply(true).embed(results_embed(&results)))
        .await?;

    Ok(())
}

/// abandon the round without scoring it
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    discard_spare_arguments,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL"
)]
async fn cancel(ctx: Context<'_>) -> CommandResult {
    ctx.log_command().await;

    let game = ctx.data().games().require(ctx.game_key()?).await?;
    let question = game.lock().await.cancel_round()?;

    info!(channel = %ctx.channel_id(), "round cancelled");

    ctx.reply_ext(format!(
        "round cancelled! the question was **{question}**"
    ))
    .await?;

    Ok(())
}

fn results_embed(results: &RoundResults) -> CreateEmbed {
    let phrases: Vec<&str> = results.interest.phrases().collect();

    let mut embed = CreateEmbed::new().title(format!("the question was: {}", results.question));

    if results.scored() {
        embed = embed.url(explore_url(&phrases));
    } else {
        embed = embed.description("couldn't reach google trends, so no points were awarded!");
    }

    embed.fields(results.awarded.iter().map(|award| {
        (
            award.phrase.clone(),
            format!("{}: +{}", award.player.mention(), award.points),
            false,
        )
    }))
}
