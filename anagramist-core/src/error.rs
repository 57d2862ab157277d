use std::fmt;

/// Everything that can go wrong while building or running a search.
///
/// Mirrors the teacher's own `Unsatisfiable` shape: a plain enum with a
/// hand-written `Display`, no derive crate involved.
#[derive(Debug)]
pub enum Error {
    /// The persistent store failed to read or write.
    Store(rusqlite::Error),
    /// The scorer returned a word list that didn't match the fragment it was
    /// asked to score.
    ScorerAlignment {
        expected: Vec<String>,
        got: Vec<String>,
    },
    /// `Store::verify` found rows disagreeing about the letter bank.
    Integrity { buckets: usize },
    /// A candidate referenced by an operator command does not exist.
    CandidateNotFound { placed: String },
    /// Reading a vocabulary or fixture file from disk failed.
    Io(std::io::Error),
    /// An operator command supplied a status code outside {0, 1, 5, 6, 7}.
    InvalidStatusCode(i32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Store(err) => write!(f, "search tree store error: {err}"),
            Error::ScorerAlignment { expected, got } => write!(
                f,
                "scorer alignment failure: expected words {expected:?}, got {got:?}"
            ),
            Error::Integrity { buckets } => write!(
                f,
                "search tree integrity violation: {buckets} distinct letter banks found"
            ),
            Error::CandidateNotFound { placed } => {
                write!(f, "no candidate found for '{placed}'")
            }
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::InvalidStatusCode(code) => write!(f, "invalid status code: {code}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Store(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Error {
        Error::Store(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
