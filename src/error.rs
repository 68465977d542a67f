use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid cookie format, expected `name=value` with a 48 character value.")]
    InvalidCookie,
    #[error("Invalid token format, expected a 32 character XSRF token.")]
    InvalidToken,
    #[error("No session associated with the provided cookie found.")]
    NoSession,

    #[error("The selector you are trying to scrape for is invalid. Selector: {0}")]
    ParseMissingSelector(String),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl Error {
    /// Process exit code reported by the binary for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::InvalidCookie => 2,
            Error::InvalidToken => 3,
            Error::NoSession => 4,
            _ => 1,
        }
    }
}
