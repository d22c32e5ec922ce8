use std::path::{Path, PathBuf};

#[derive(clap::Parser, Debug)]
#[command(version, about = "a google trends word game for discord")]
pub struct Cli {
    /// Discord bot token. Falls back to `TRENDMASTER_TOKEN`.
    #[arg(short, long, conflicts_with = "token_file")]
    token: Option<String>,

    /// File containing the discord bot token.
    #[arg(long)]
    token_file: Option<PathBuf>,

    #[arg(short, long, env = "TRENDMASTER_TOML", default_value = "./trendmaster.toml")]
    config: PathBuf,

    /// Log at DEBUG level.
    #[arg(short, long)]
    pub debug: bool,

    /// Also log to this file, rotated daily. The last 45 days are kept.
    #[arg(short = 'f', long, alias = "log-dir")]
    pub log_file: Option<PathBuf>,

    /// Don't log to stdout.
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("couldn't read token file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("token file {0:?} is empty")]
    Empty(PathBuf),

    #[error("no token given: use --token, --token-file or TRENDMASTER_TOKEN")]
    Missing,
}

impl Cli {
    pub fn config_path(&self) -> &Path {
        &self.config
    }

    pub fn token(&self) -> Result<String, TokenError> {
        if let Some(token) = &self.token {
            return Ok(token.trim().to_owned());
        }

        if let Some(path) = &self.token_file {
            let token = std::fs::read_to_string(path).map_err(|source| TokenError::Read {
                path: path.clone(),
                source,
            })?;

            let token = token.trim();
            if token.is_empty() {
                return Err(TokenError::Empty(path.clone()));
            }

            return Ok(token.to_owned());
        }

        std::env::var("TRENDMASTER_TOKEN").map_err(|_| TokenError::Missing)
    }
}
