//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | Usage error (bad args)                                   |
//! | 3    | Cannot read an input file                                |
//! | 4    | Cannot write an output file                              |
//! | 5    | Input could not be parsed (CSV, JSON, HTML decode)       |
//! | 6    | Rules or corrections file invalid                        |
//! | 7    | Reconciliation needs review (`compare --strict` only)    |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use rollbook_io::IoError;
use rollbook_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// An input file or directory could not be read.
pub const EXIT_READ: u8 = 3;

/// An output file could not be written.
pub const EXIT_WRITE: u8 = 4;

/// Input content is malformed.
pub const EXIT_PARSE: u8 = 5;

/// Rules or corrections TOML failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 6;

/// `compare --strict` found name mismatches, missing or orphaned records.
pub const EXIT_NEEDS_REVIEW: u8 = 7;

/// Map an IO-crate error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Read { .. } => EXIT_READ,
        IoError::Write { .. } => EXIT_WRITE,
        IoError::Csv(_) | IoError::Json(_) | IoError::MissingLine(_) => EXIT_PARSE,
    }
}

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_)
        | ReconError::ConfigValidation(_)
        | ReconError::DuplicateMapping { .. }
        | ReconError::Pattern { .. } => EXIT_INVALID_CONFIG,
    }
}
