use std::{collections::HashMap, sync::Arc};

use poise::serenity_prelude::{ChannelId, GuildId};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::{GameError, GoogleTrendsGame, QuestionPool};

pub type SharedGame = Arc<Mutex<GoogleTrendsGame>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameKey {
    pub guild: GuildId,
    pub channel: ChannelId,
}

impl GameKey {
    pub const fn new(guild: GuildId, channel: ChannelId) -> Self {
        Self { guild, channel }
    }

    /// Games only exist in guild channels, so a DM has no key.
    pub fn in_guild(guild: Option<GuildId>, channel: ChannelId) -> Result<Self, GameError> {
        guild
            .map(|guild| Self::new(guild, channel))
            .ok_or(GameError::NotInGuild)
    }
}

/// Every channel's game, at most one per channel.
///
/// The map lock is only held while looking up, inserting or removing an entry.
/// Each game has its own lock, so a slow round in one channel never holds up another.
#[derive(Clone, Debug)]
pub struct GamesRegistry {
    games: Arc<RwLock<HashMap<GameKey, SharedGame>>>,
    questions: QuestionPool,
}

impl GamesRegistry {
    pub fn new(questions: QuestionPool) -> Self {
        Self {
            games: Arc::default(),
            questions,
        }
    }

    pub const fn questions(&self) -> &QuestionPool {
        &self.questions
    }

    fn new_game(&self) -> SharedGame {
        Arc::new(Mutex::new(GoogleTrendsGame::new(&self.questions)))
    }

    pub async fn get(&self, key: GameKey) -> Option<SharedGame> {
        let guard = self.games.read().await;
        guard.get(&key).cloned()
    }

    pub async fn require(&self, key: GameKey) -> Result<SharedGame, GameError> {
        self.get(key).await.ok_or(GameError::NoActiveGame)
    }

    pub async fn get_or_create(&self, key: GameKey) -> SharedGame {
        let mut guard = self.games.write().await;
        guard.entry(key).or_insert_with(|| self.new_game()).clone()
    }

    /// Starts a game in a channel that doesn't have one. An existing game is left alone.
    pub async fn create(&self, key: GameKey) -> Result<SharedGame, GameError> {
        let mut guard = self.games.write().await;

        if guard.contains_key(&key) {
            return Err(GameError::GameAlreadyActive);
        }

        let game = self.new_game();
        guard.insert(key, game.clone());
        debug!(guild = %key.guild, channel = %key.channel, "created game");

        Ok(game)
    }

    pub async fn remove(&self, key: GameKey) -> Result<SharedGame, GameError> {
        let mut guard = self.games.write().await;
        let game = guard.remove(&key).ok_or(GameError::NoActiveGame)?;
        debug!(guild = %key.guild, channel = %key.channel, "removed game");
        Ok(game)
    }

    /// Channels in `guild` with a game, in id order.
    pub async fn list(&self, guild: GuildId) -> Vec<ChannelId> {
        let guard = self.games.read().await;
        let mut channels: Vec<_> = guard
            .keys()
            .filter(|key| key.guild == guild)
            .map(|key| key.channel)
            .collect();
        channels.sort();
        channels
    }
}
