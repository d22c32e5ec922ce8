//! The google trends game itself, independent of discord.

pub mod client;
pub use client::TrendsClient;

mod error;
pub use error::{GameError, ScoringError};

pub mod game;
pub use game::{GoogleTrendsGame, RoundResults, WordPosition};

pub mod oracle;

mod questions;
pub use questions::QuestionPool;

pub mod registry;
pub use registry::{GameKey, GamesRegistry};

const EXPLORE_URL: &str = "https://trends.google.com/trends/explore";

/// Link to the trends website comparing `words`.
pub fn explore_url<S: AsRef<str>>(words: &[S]) -> String {
    let query = words
        .iter()
        .map(|word| url::form_urlencoded::byte_serialize(word.as_ref().as_bytes()).collect())
        .collect::<Vec<String>>()
        .join(",");

    format!("{EXPLORE_URL}?q={query}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::explore_url;

    #[test]
    fn explore_url_joins_words() {
        assert_eq!(
            explore_url(&["example", "words"]),
            "https://trends.google.com/trends/explore?q=example,words"
        );
    }

    #[test]
    fn explore_url_encodes_words() {
        assert_eq!(
            explore_url(&["cat update", "a,b&c"]),
            "https://trends.google.com/trends/explore?q=cat+update,a%2Cb%26c"
        );
    }
}
