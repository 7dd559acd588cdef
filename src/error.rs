use core::fmt;
use std::path::Path;

/// Result alias for `parlabel`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by graph loading, propagation, and output writing.
#[derive(Debug)]
pub enum Error {
    /// Malformed line in an input file: wrong token count or non-integer field.
    Parse {
        /// File the line came from.
        file: String,
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// Node id outside the table `[0, max]`.
    Range {
        /// Offending node id.
        id: u32,
        /// Largest valid id.
        max: u32,
    },

    /// File missing, unreadable, or unwritable.
    Io {
        /// Path of the file involved.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A worker slot failed while computing a node's label.
    WorkerFailure {
        /// Node the failing slot was assigned.
        node: u32,
    },

    /// Invalid configuration value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },
}

impl Error {
    /// Parse error for a line of `file`.
    pub(crate) fn parse(file: &Path, line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            file: file.display().to_string(),
            line,
            message: message.into(),
        }
    }

    /// I/O error tagged with the path it occurred on.
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Error::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse {
                file,
                line,
                message,
            } => {
                write!(f, "{file}:{line}: {message}")
            }
            Error::Range { id, max } => {
                write!(f, "node id {id} outside table [0, {max}]")
            }
            Error::Io { path, source } => write!(f, "{path}: {source}"),
            Error::WorkerFailure { node } => {
                write!(f, "worker failed while relabeling node {node}")
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
