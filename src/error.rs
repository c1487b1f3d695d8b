use thiserror::Error;

/// Result alias for `hspe`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the embedding core and its readers/writers.
///
/// Numeric degeneracies (all-zero similarities, batches with no known
/// distances) are not errors; they fall back to defined placements.
#[derive(Debug, Error)]
pub enum Error {
    /// The SPE solver was handed a batch with no ids.
    #[error("invalid input: cannot embed an empty batch")]
    EmptyBatch,

    /// Input that must be non-empty was empty.
    #[error("empty input: {what}")]
    EmptyInput {
        /// What was empty.
        what: &'static str,
    },

    /// The hierarchy paths do not describe a consistent tree.
    #[error("inconsistent hierarchy at '{id}': {message}")]
    InconsistentHierarchy {
        /// Offending item id.
        id: String,
        /// Description of the violation.
        message: String,
    },

    /// A node id cannot be used as an output directory name.
    #[error("node id '{id}' cannot be used as a directory name")]
    UnsafeId {
        /// Offending node id.
        id: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// A line of an input file could not be parsed.
    #[error("{source_name}:{line}: {message}")]
    Parse {
        /// Name of the input (usually a file path).
        source_name: String,
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// I/O error wrapper.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn inconsistent(id: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InconsistentHierarchy {
            id: id.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = Error::Parse {
            source_name: "graph.txt".into(),
            line: 7,
            message: "missing score".into(),
        };
        assert_eq!(err.to_string(), "graph.txt:7: missing score");

        let err = Error::inconsistent("C", "registered twice");
        assert_eq!(
            err.to_string(),
            "inconsistent hierarchy at 'C': registered twice"
        );
    }
}
