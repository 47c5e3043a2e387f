use std::fmt;
use std::path::Path;

#[derive(Debug)]
pub enum IoError {
    /// A file could not be opened or read.
    Read { path: String, message: String },
    /// A file could not be created or written.
    Write { path: String, message: String },
    /// Malformed CSV record.
    Csv(String),
    /// JSON (de)serialization error.
    Json(String),
    /// The masterlist ended before its banner or header line.
    MissingLine(&'static str),
}

impl IoError {
    pub fn read(path: &Path, err: impl fmt::Display) -> Self {
        Self::Read { path: path.display().to_string(), message: err.to_string() }
    }

    pub fn write(path: &Path, err: impl fmt::Display) -> Self {
        Self::Write { path: path.display().to_string(), message: err.to_string() }
    }

    /// Whether the failure is about content rather than the filesystem.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Csv(_) | Self::Json(_) | Self::MissingLine(_))
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => write!(f, "cannot read {path}: {message}"),
            Self::Write { path, message } => write!(f, "cannot write {path}: {message}"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Json(msg) => write!(f, "JSON error: {msg}"),
            Self::MissingLine(which) => write!(f, "masterlist is missing its {which} line"),
        }
    }
}

impl std::error::Error for IoError {}
