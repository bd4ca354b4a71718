//! Result and error types for pagespec.

use crate::place::Place;
use thiserror::Error;

/// Result type for spec compilation
pub type SpecResult<T> = Result<T, SpecError>;

/// Fatal errors raised while compiling a page spec.
///
/// The first error aborts compilation of the file being read and of every
/// file importing it. `Display` renders the message followed by the place:
/// `"<message>\n    in <path>:<line>"`.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Malformed directive, object definition or spec line
    #[error("{message}\n    in {place}")]
    Syntax {
        /// Error message
        message: String,
        /// Where the offending construct begins
        place: Place,
    },

    /// Illegal leading whitespace
    #[error("Incorrect indentation. {message}\n    in {place}")]
    Indentation {
        /// Error message
        message: String,
        /// Offending line
        place: Place,
    },

    /// Imported spec or script could not be read
    #[error("Could not read file {path}: {reason}{}", fmt_origin(.place))]
    Import {
        /// Resolved path of the missing file
        path: String,
        /// Why the read failed
        reason: String,
        /// Import directive that requested the file, absent for the root file
        place: Option<Place>,
    },

    /// Embedded expression or script failed to evaluate
    #[error("{message}\n    in {place}")]
    Evaluation {
        /// Error message
        message: String,
        /// Line containing the expression
        place: Place,
    },
}

fn fmt_origin(place: &Option<Place>) -> String {
    place
        .as_ref()
        .map(|p| format!("\n    in {p}"))
        .unwrap_or_default()
}

impl SpecError {
    /// Create a syntax error
    #[must_use]
    pub fn syntax(message: impl Into<String>, place: &Place) -> Self {
        Self::Syntax {
            message: message.into(),
            place: place.clone(),
        }
    }

    /// Create an indentation error
    #[must_use]
    pub fn indentation(message: impl Into<String>, place: &Place) -> Self {
        Self::Indentation {
            message: message.into(),
            place: place.clone(),
        }
    }

    /// Create an evaluation error
    #[must_use]
    pub fn evaluation(message: impl Into<String>, place: &Place) -> Self {
        Self::Evaluation {
            message: message.into(),
            place: place.clone(),
        }
    }

    /// Bare message without the place suffix
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Syntax { message, .. }
            | Self::Indentation { message, .. }
            | Self::Evaluation { message, .. } => message.clone(),
            Self::Import { path, reason, .. } => format!("Could not read file {path}: {reason}"),
        }
    }

    /// Place of the offending line, if known
    #[must_use]
    pub const fn place(&self) -> Option<&Place> {
        match self {
            Self::Syntax { place, .. }
            | Self::Indentation { place, .. }
            | Self::Evaluation { place, .. } => Some(place),
            Self::Import { place, .. } => place.as_ref(),
        }
    }

    /// File path of the offending line
    #[must_use]
    pub fn file_path(&self) -> Option<&str> {
        self.place().map(|p| p.file_path.as_str())
    }

    /// Line number of the offending line
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.place().map(|p| p.line)
    }
}
