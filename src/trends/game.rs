use std::collections::HashMap;

use indexmap::IndexMap;
use poise::serenity_prelude::UserId;
use rand::Rng;
use tracing::{debug, instrument};

use super::{
    oracle::{Interest, ScoringOracle, MAX_PHRASES},
    GameError, QuestionPool,
};

/// Longest word a player can submit, in characters. Keeps every phrase inside
/// discord's 256 character limit for embed field names.
pub const MAX_WORD_LENGTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Idle,
    RoundActive,
}

impl RoundState {
    /// What to tell a player who needed the game to be in this state.
    pub(crate) const fn wrong_state_message(self) -> &'static str {
        match self {
            Self::Idle => "a round is already in progress! end it with `round end`",
            Self::RoundActive => {
                "there's no round with any words to end! submit one with `round word`"
            }
        }
    }
}

/// Which side of the question a player's word goes on.
#[derive(poise::ChoiceParameter, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WordPosition {
    #[name = "front"]
    #[name = "before"]
    #[default]
    Front,
    #[name = "back"]
    #[name = "after"]
    Back,
}

impl WordPosition {
    pub fn phrase(self, word: &str, question: &str) -> String {
        match self {
            Self::Front => format!("{word} {question}"),
            Self::Back => format!("{question} {word}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Award {
    pub player: UserId,
    pub phrase: String,
    pub points: u32,
}

/// What a finished round produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResults {
    pub question: String,
    /// Empty when the phrases couldn't be scored.
    pub interest: Interest,
    pub awarded: Vec<Award>,
}

impl RoundResults {
    pub fn scored(&self) -> bool {
        !self.interest.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct GoogleTrendsGame {
    question: Option<String>,
    words: IndexMap<UserId, String>,
    scores: HashMap<UserId, u64>,
    available_questions: Vec<String>,
}

impl GoogleTrendsGame {
    pub fn new(pool: &QuestionPool) -> Self {
        Self {
            question: None,
            words: IndexMap::new(),
            scores: HashMap::new(),
            available_questions: pool.to_vec(),
        }
    }

    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    pub const fn words(&self) -> &IndexMap<UserId, String> {
        &self.words
    }

    pub const fn scores(&self) -> &HashMap<UserId, u64> {
        &self.scores
    }

    pub fn available_questions(&self) -> &[String] {
        &self.available_questions
    }

    pub fn state(&self) -> RoundState {
        if self.question.is_some() || !self.words.is_empty() {
            RoundState::RoundActive
        } else {
            RoundState::Idle
        }
    }

    /// Scores from highest to lowest.
    pub fn leaderboard(&self) -> Vec<(UserId, u64)> {
        let mut board: Vec<_> = self
            .scores
            .iter()
            .map(|(player, score)| (*player, *score))
            .collect();
        board.sort_by(|(a_player, a_score), (b_player, b_score)| {
            b_score.cmp(a_score).then(a_player.cmp(b_player))
        });
        board
    }

    /// Whether taking a word from `player` would put this round over the provider's limit.
    pub fn is_full_for(&self, player: UserId) -> bool {
        !self.words.contains_key(&player) && self.words.len() >= MAX_PHRASES
    }

    pub fn start_round(&mut self) -> Result<&str, GameError> {
        self.start_round_with(&mut rand::thread_rng())
    }

    #[instrument(skip_all)]
    pub fn start_round_with<R: Rng>(&mut self, rng: &mut R) -> Result<&str, GameError> {
        if !self.words.is_empty() || self.question.is_some() {
            return Err(GameError::invalid_state(RoundState::Idle));
        }

        if self.available_questions.is_empty() {
            return Err(GameError::QuestionPoolExhausted);
        }

        let index = rng.gen_range(0..self.available_questions.len());
        let question = self.available_questions.swap_remove(index);

        debug!(
            %question,
            remaining = self.available_questions.len(),
            "drew question"
        );

        self.words.clear();
        Ok(self.question.insert(question).as_str())
    }

    /// Records `player`'s word for this round, replacing any earlier one, and returns their phrase.
    pub fn add_word(
        &mut self,
        word: &str,
        player: UserId,
        position: WordPosition,
    ) -> Result<String, GameError> {
        let question = self.question.as_deref().ok_or(GameError::NoActiveRound)?;

        if word.chars().count() > MAX_WORD_LENGTH {
            return Err(GameError::WordTooLong {
                max: MAX_WORD_LENGTH,
            });
        }

        let phrase = position.phrase(word, question);

        self.words.insert(player, phrase.clone());
        self.scores.entry(player).or_default();

        Ok(phrase)
    }

    /// Scores every phrase in one query and returns the game to idle, even if scoring fails.
    #[instrument(skip_all)]
    pub async fn end_round<O: ScoringOracle>(
        &mut self,
        oracle: &O,
    ) -> Result<RoundResults, GameError> {
        let question = match self.question.as_ref() {
            Some(question) if !self.words.is_empty() => question.clone(),
            _ => return Err(GameError::invalid_state(RoundState::RoundActive)),
        };

        let mut phrases: Vec<String> = Vec::with_capacity(self.words.len());
        for phrase in self.words.values() {
            if !phrases.contains(phrase) {
                phrases.push(phrase.clone());
            }
        }

        let interest = oracle.query(&phrases).await;

        let mut awarded = Vec::with_capacity(self.words.len());
        for (player, phrase) in self.words.drain(..) {
            let points = interest.score(&phrase).unwrap_or_default();
            *self.scores.entry(player).or_default() += u64::from(points);
            awarded.push(Award {
                player,
                phrase,
                points,
            });
        }

        self.question = None;

        debug!(%question, scored = !interest.is_empty(), "round over");

        Ok(RoundResults {
            question,
            interest,
            awarded,
        })
    }

    /// Abandons the current round without scoring it. The question stays used up.
    pub fn cancel_round(&mut self) -> Result<String, GameError> {
        let question = self
            .question
            .take()
            .ok_or(GameError::invalid_state(RoundState::RoundActive))?;
        self.words.clear();
        Ok(question)
    }
}
