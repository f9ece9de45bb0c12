use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MIDI file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("MIDI parse error: {0}")]
    MalformedSource(String),

    #[error("SMPTE time division is not supported")]
    UnsupportedDivision,

    #[error("{field} value {value} does not fit its fixed-width field")]
    EncodingOverflow { field: &'static str, value: u64 },

    #[error("note {note} on channel {channel} closes at tick {end}, before it opened at tick {start}")]
    NegativeDuration {
        channel: u8,
        note: u8,
        start: u64,
        end: u64,
    },

    #[error("invalid event table: {0}")]
    InvalidTable(String),
}

pub type Result<T> = std::result::Result<T, Error>;
