use std::fmt;

use crate::Location;

/// Errors that can arise while a [`crate::LexicalAnalyzer`] is being assembled from
/// its rule set.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("tag \"{0}\" is used by more than one rule")]
    DuplicateHandle(String),
    #[error("pattern \"{0}\" is used by more than one rule")]
    DuplicatePattern(String),
    #[error("rule for \"{0}\" has an empty pattern")]
    EmptyPattern(String),
    #[error("invalid regular expression: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// Errors surfaced while pulling tokens out of a [`crate::TokenStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error<T> {
    /// No rule (of any applicable start condition) matched at the cursor.
    UnexpectedText { text: String, location: Location },
    /// More than one rule produced a match of the same (longest) length and
    /// declared conflicting tags; the lexicon is ambiguous at this position.
    AmbiguousMatches {
        tags: Vec<T>,
        text: String,
        location: Location,
    },
}

impl<T: fmt::Display> fmt::Display for Error<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnexpectedText { text, location } => {
                write!(f, "{location}: unexpected text \"{text}\"")
            }
            Error::AmbiguousMatches {
                tags,
                text,
                location,
            } => {
                write!(f, "{location}: ambiguous match for \"{text}\" (matches: ")?;
                for (i, tag) in tags.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{tag}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl<T: fmt::Debug + fmt::Display> std::error::Error for Error<T> {}
