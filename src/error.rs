//! Errors raised while assembling or writing a configuration.

use std::io;

use crate::model::EntryType;

/// Errors that can occur while building a sequence or writing its files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no {0} model in sequence")]
    MissingComponent(EntryType),

    #[error("duplicate model type \"{0}\" in given sequence")]
    DuplicateComponent(EntryType),

    #[error("unknown entry type: {0}")]
    UnknownEntryType(String),

    #[error("unknown remap method: {0}")]
    UnknownRemapMethod(String),

    #[error("unknown verbosity: {0}")]
    UnknownVerbosity(String),

    #[error("invalid datetime \"{0}\"")]
    InvalidDatetime(String),

    #[error("invalid duration \"{0}\"")]
    InvalidDuration(String),

    #[error("invalid system description: {0}")]
    InvalidDescription(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
