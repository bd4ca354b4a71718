//! Source provenance attached to every parsed node.

use serde::{Deserialize, Serialize};
use std::fmt;

/// File and line a spec node was read from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Place {
    /// Path of the spec file (or the label given to in-memory text)
    pub file_path: String,
    /// 1-based line number
    pub line: usize,
}

impl Place {
    /// Create a new place
    #[must_use]
    pub fn new(file_path: impl Into<String>, line: usize) -> Self {
        Self {
            file_path: file_path.into(),
            line,
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_path, self.line)
    }
}
