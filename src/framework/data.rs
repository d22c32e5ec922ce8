use tracing::info;

use crate::trends::{GamesRegistry, QuestionPool, TrendsClient};

pub mod error;
pub use error::Error as DataError;

pub type Result<T, E = DataError> = std::result::Result<T, E>;

#[derive(Debug, Clone)]
pub struct PoiseData {
    pub(crate) config: super::config::Config,
    games: GamesRegistry,
    trends: TrendsClient,
}

impl PoiseData {
    pub(crate) fn new(config: super::config::Config) -> Result<Self> {
        let questions = QuestionPool::load(config.game.questions_file.as_deref())?;
        info!(questions = questions.len(), "question pool ready");

        let games = GamesRegistry::new(questions);
        let trends = TrendsClient::new(config.trends.clone())?;

        Ok(Self {
            config,
            games,
            trends,
        })
    }

    pub(crate) const fn config(&self) -> &super::config::Config {
        &self.config
    }

    pub(crate) const fn games(&self) -> &GamesRegistry {
        &self.games
    }

    pub(crate) const fn trends(&self) -> &TrendsClient {
        &self.trends
    }
}
