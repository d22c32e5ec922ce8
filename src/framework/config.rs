use std::path::{Path, PathBuf};

use poise::serenity_prelude::{ActivityData, ChannelId, GuildId};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::trends;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub trends: trends::client::Settings,
    #[serde(default)]
    pub game: GameConfig,
}

impl Config {
    /// Reads the TOML file at `path` if it exists, then `TRENDMASTER__*` environment overrides.
    #[tracing::instrument(skip_all, fields(path = ?path))]
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            warn!("no config file found, using defaults");
        }

        let builder = ::config::Config::builder()
            .add_source(
                ::config::File::new(&path.to_string_lossy(), ::config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(::config::Environment::with_prefix("TRENDMASTER").separator("__"));

        let config = Self::build(builder)?;
        info!("config loaded");
        Ok(config)
    }

    #[cfg(test)]
    pub fn parse(toml: &str) -> Result<Self, Error> {
        Self::build(
            ::config::Config::builder()
                .add_source(::config::File::from_str(toml, ::config::FileFormat::Toml)),
        )
    }

    fn build(
        builder: ::config::ConfigBuilder<::config::builder::DefaultState>,
    ) -> Result<Self, Error> {
        builder
            .build()
            .map_err(Error::Read)?
            .try_deserialize()
            .map_err(Error::Parse)
    }
}

#[derive(Debug, thiserror::Error, thisslime::TracingError)]
pub enum Error {
    #[error("file read error: {0}")]
    #[event(level = ERROR)]
    Read(::config::ConfigError),

    #[error("parsing error: {0}")]
    #[event(level = ERROR)]
    Parse(::config::ConfigError),
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BotConfig {
    testing_server: Option<GuildId>,
    activity: Option<String>,
    prefix: String,
    status_channel: Option<ChannelId>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            testing_server: None,
            activity: None,
            prefix: "trendmaster".to_owned(),
            status_channel: None,
        }
    }
}

impl BotConfig {
    pub fn testing_server(&self) -> Option<&GuildId> {
        if self.testing_server.is_none() {
            debug!("no testing server set in config, registering commands globally only");
        }

        self.testing_server.as_ref()
    }

    pub fn activity(&self) -> Option<ActivityData> {
        let Some(activity) = &self.activity else {
            debug!("no bot.activity provided in config, defaulting to none");
            return None;
        };

        if activity.is_empty() {
            warn!("bot.activity provided in config as empty string, defaulting to none");
            return None;
        }

        let parsed_activity = if let Some(name) = activity.strip_prefix("playing ") {
            ActivityData::playing(name)
        } else if let Some(name) = activity.strip_prefix("listening to ") {
            ActivityData::listening(name)
        } else if let Some(name) = activity.strip_prefix("watching ") {
            ActivityData::watching(name)
        } else if let Some(name) = activity.strip_prefix("competing in ") {
            ActivityData::competing(name)
        } else {
            error!("bot.activity in config could not be parsed - must start with `playing`, `listening to`, `watching` or `competing in`");
            warn!("disabling bot activity");
            return None;
        };

        debug!(
            "bot.activity parsed as {:?}: {}",
            parsed_activity.kind, parsed_activity.name
        );

        Some(parsed_activity)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn status_channel(&self) -> Option<ChannelId> {
        self.status_channel
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct GameConfig {
    /// One question per line. The built-in list is used when unset.
    pub questions_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude::{ActivityType, GuildId};
    use pretty_assertions::assert_eq;

    use super::Config;

    #[test]
    fn defaults_when_empty() {
        let config = Config::parse("").expect("empty config is valid");

        assert_eq!(config.bot.prefix(), "trendmaster");
        assert_eq!(config.trends.timeframe, "today 5-y");
        assert_eq!(config.trends.timeout_secs, 20);
        assert!(config.game.questions_file.is_none());
    }

    #[test]
    fn reads_every_section() {
        let config = Config::parse(
            r#"
            [bot]
            prefix = "tm!"
            testing_server = "1234"
            activity = "watching the trends"

            [trends]
            timeframe = "now 7-d"
            geo = "CA"
            timeout_secs = 5

            [game]
            questions_file = "questions.txt"
            "#,
        )
        .expect("config is valid");

        assert_eq!(config.bot.prefix(), "tm!");
        assert_eq!(config.bot.testing_server(), Some(&GuildId::new(1234)));
        assert_eq!(
            config.bot.activity().map(|activity| activity.kind),
            Some(ActivityType::Watching)
        );
        assert_eq!(config.trends.timeframe, "now 7-d");
        assert_eq!(config.trends.geo, "CA");
        assert_eq!(config.trends.language, "en-US");
        assert_eq!(config.trends.timeout_secs, 5);
        assert_eq!(
            config.game.questions_file.as_deref(),
            Some(std::path::Path::new("questions.txt"))
        );
    }

    #[test]
    fn bad_activity_is_ignored() {
        let config = Config::parse("[bot]\nactivity = \"dancing\"").expect("config is valid");
        assert!(config.bot.activity().is_none());
    }

    #[test]
    fn wrong_types_fail() {
        assert!(Config::parse("[trends]\ntimeout_secs = \"soon\"").is_err());
    }
}
