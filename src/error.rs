use std::io;
use thiserror::Error;

/// Raised for anything the codec cannot parse: a bad magic number, a
/// truncated container, or a malformed map file.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Unknown registration format: {0:02x?}")]
    BadMagic([u8; 4]),
    #[error("Aborting due to truncated data file ({0})")]
    Truncated(&'static str),
    #[error("Bad registration id tag: {0:02x?}")]
    BadRecordTag([u8; 6]),
    #[error("Registration record size {0} is below the 22-byte header overhead")]
    BadRecordSize(u32),
    #[error("Syntax error in map file: {msg}\n{line}")]
    MapSyntax { msg: String, line: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl FormatError {
    pub(crate) fn syntax(msg: impl Into<String>, line: &str) -> Self {
        FormatError::MapSyntax { msg: msg.into(), line: line.to_owned() }
    }
}

/// Raised when a rearrangement plan cites a bank or registration that does
/// not exist in the original model. Always fatal before any output is written.
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Couldn't find bank number {0}")]
    BankNotFound(u8),
    #[error("Couldn't find registration {registration} in bank {bank}")]
    RegistrationNotFound { bank: u8, registration: u8 },
}

/// Missing or contradictory command-line inputs. Surfaced before any codec
/// logic runs.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct UsageError(pub String);
