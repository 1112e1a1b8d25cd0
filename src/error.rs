use thiserror::Error;

/// Errors surfaced across the transit-db public API.
///
/// Domain outcomes that are not actually exceptional (an unknown bus, an
/// unreachable route) are never represented here; they are plain `None`s
/// or dedicated "not found" response variants (see [`crate::document`]).
/// This enum only covers things that mean the *input document itself* was
/// unusable, or a host-side IO failure while loading one.
#[derive(Error, Debug)]
pub enum Error {
    /// The input document failed to deserialize into the expected shape.
    #[error(transparent)]
    Deserialize(#[from] serde_json::Error),
    /// Could not read the input document from disk.
    #[error("cannot read input document")]
    IO(#[from] std::io::Error),
    /// A legacy plain-text request line didn't match any known grammar.
    #[error("malformed request line: {0}")]
    MalformedLine(String),
}

pub type Result<T> = std::result::Result<T, Error>;
