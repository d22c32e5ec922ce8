#[derive(Debug, thiserror::Error, thisslime::TracingError)]
pub enum Error {
    #[error("error loading questions: {0}")]
    #[event(level = ERROR)]
    Questions(#[from] std::io::Error),

    #[error("error building http client: {0}")]
    #[event(level = ERROR)]
    Http(#[from] reqwest::Error),
}
