use amie_vocab::VocabError;
use thiserror::Error;

/// Errors that can occur while running a practice session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(anyhow::Error),

    #[error("Empty response from oracle")]
    EmptyResponse,

    #[error(transparent)]
    Storage(#[from] VocabError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
