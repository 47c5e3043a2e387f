use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad length bounds, empty ids, etc.).
    ConfigValidation(String),
    /// A corrections entry references the same database id twice.
    DuplicateMapping { table: String, id: String },
    /// A built-in or configured pattern failed to compile.
    Pattern { rule: String, message: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::DuplicateMapping { table, id } => {
                write!(f, "corrections '{table}': id '{id}' listed more than once")
            }
            Self::Pattern { rule, message } => {
                write!(f, "rule '{rule}': invalid pattern: {message}")
            }
        }
    }
}

impl std::error::Error for ReconError {}
