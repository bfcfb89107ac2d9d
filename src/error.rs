use std::io;

/// Everything that can abort a calendar sync.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required configuration value is missing.
    #[error("configuration error: {0}")]
    Config(String),

    /// The server's handshake or response payload did not have the expected shape,
    /// most likely because the upstream client protocol changed.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The login request was rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A lesson timestamp did not match `YYYY-MM-DD HH:MM:SS`.
    #[error("unexpected timestamp format: {value:?}")]
    Format {
        /// The offending raw value.
        value: String,
    },

    /// Some HTTP request failed below the status-code level.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Writing the calendar file failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
