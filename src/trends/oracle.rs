use indexmap::IndexMap;

use super::ScoringError;

/// Google Trends compares at most this many search terms at once.
pub const MAX_PHRASES: usize = 5;

/// Relative search interest for each phrase, in the order the phrases were submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interest(IndexMap<String, u32>);

impl Interest {
    /// Looks up a phrase exactly as it was submitted.
    pub fn score(&self, phrase: &str) -> Option<u32> {
        self.0.get(phrase).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(phrase, score)| (phrase.as_str(), *score))
    }

    pub fn phrases(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for Interest {
    fn from_iter<T: IntoIterator<Item = (S, u32)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(phrase, score)| (phrase.into(), score))
                .collect(),
        )
    }
}

/// Something that can score phrases by popularity.
pub trait ScoringOracle {
    /// Scores `phrases` at the most recent sample the provider has.
    async fn try_query(&self, phrases: &[String]) -> Result<Interest, ScoringError>;

    /// Like [`try_query`](Self::try_query), but a failure is logged and reported as no scores.
    async fn query(&self, phrases: &[String]) -> Interest {
        match self.try_query(phrases).await {
            Ok(interest) => interest,
            Err(err) => {
                tracing::warn!(%err, "scoring failed, awarding no points");
                Interest::default()
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::testing::FailingOracle;
    use super::*;

    #[test]
    fn interest_keeps_submitted_order() {
        let interest: Interest = [("b phrase", 3), ("a phrase", 70), ("c phrase", 0)]
            .into_iter()
            .collect();

        assert_eq!(
            interest.phrases().collect::<Vec<_>>(),
            vec!["b phrase", "a phrase", "c phrase"]
        );
        assert_eq!(interest.score("a phrase"), Some(70));
        assert_eq!(interest.score("A phrase"), None);
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_query_is_empty() {
        let oracle = FailingOracle(ScoringError::NoData);
        let interest = oracle.query(&["nothing here".to_owned()]).await;

        assert!(interest.is_empty());
        assert!(logs_contain("scoring failed"));
    }
}
