use std::{path::Path, sync::Arc};

use tracing::{debug, info, warn};

const BUILTIN: &str = include_str!("../../questions.txt");

/// The global set of search terms that every new game copies.
#[derive(Debug, Clone)]
pub struct QuestionPool(Arc<[String]>);

impl QuestionPool {
    /// One question per line. Blank lines and `#` comments are skipped, repeats are dropped.
    pub fn parse(text: &str) -> Self {
        let mut questions: Vec<String> = Vec::new();

        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if questions.iter().any(|question| question == line) {
                debug!(question = line, "skipping repeated question");
                continue;
            }

            questions.push(line.to_owned());
        }

        Self(questions.into())
    }

    pub fn builtin() -> Self {
        Self::parse(BUILTIN)
    }

    /// Loads the configured questions file, falling back to the built-in list.
    #[tracing::instrument(skip_all)]
    pub fn load(path: Option<&Path>) -> std::io::Result<Self> {
        let Some(path) = path else {
            debug!("no questions file configured, using built-in questions");
            return Ok(Self::builtin());
        };

        let pool = Self::parse(&std::fs::read_to_string(path)?);

        if pool.is_empty() {
            warn!(?path, "questions file has no questions, using built-in questions");
            return Ok(Self::builtin());
        }

        info!(?path, count = pool.len(), "loaded questions");
        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.to_vec()
    }
}

impl FromIterator<String> for QuestionPool {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use std::io::Write;

    use super::QuestionPool;

    #[test]
    fn parse_skips_comments_and_repeats() {
        let pool = QuestionPool::parse("# header\nupdate\n\n  recipe  \nupdate\n");
        assert_eq!(pool.to_vec(), vec!["update".to_owned(), "recipe".to_owned()]);
    }

    #[test]
    fn builtin_is_not_empty() {
        let pool = QuestionPool::builtin();
        assert!(pool.len() > 1);
        assert!(pool.to_vec().iter().all(|q| !q.starts_with('#')));
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = std::path::Path::new("./definitely/not/a/questions.txt");
        assert!(QuestionPool::load(Some(path)).is_err());
    }

    #[test]
    fn loads_questions_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file is creatable");
        writeln!(file, "# mine\nweather\nnear me").expect("temp file is writable");

        let pool = QuestionPool::load(Some(file.path())).expect("file is readable");
        assert_eq!(pool.to_vec(), vec!["weather".to_owned(), "near me".to_owned()]);
    }

    #[test]
    fn empty_questions_file_uses_builtin() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file is creatable");
        writeln!(file, "# nothing here yet").expect("temp file is writable");

        let pool = QuestionPool::load(Some(file.path())).expect("file is readable");
        assert_eq!(pool.to_vec(), QuestionPool::builtin().to_vec());
    }
}
