//! Fixed-width binary records.
//!
//! Every record is 12 bytes, written field by field:
//! `[code:1][channel:1][note:1][velocity:1][time_abs:4 LE][duration:4 LE]`.

use crate::error::{Error, Result};

pub const RECORD_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum EventCode {
    On = 0,
    Off = 1,
}

impl TryFrom<u8> for EventCode {
    type Error = Error;

    fn try_from(val: u8) -> Result<Self> {
        match val {
            0 => Ok(EventCode::On),
            1 => Ok(EventCode::Off),
            _ => Err(Error::InvalidTable(format!("unknown event code {}", val))),
        }
    }
}

/// A note-on or note-off entry of the table.
///
/// Times are kept as `u64` ticks until encoding so that long files are
/// caught as overflow instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    pub code: EventCode,
    pub channel: u8,
    pub note: u8,
    pub velocity: u8,
    pub time_abs: u64,
    pub duration: u64,
}

impl EventRecord {
    pub fn on(channel: u8, note: u8, velocity: u8, time_abs: u64) -> Self {
        Self {
            code: EventCode::On,
            channel,
            note,
            velocity,
            time_abs,
            duration: 0,
        }
    }

    /// A closed interval; `time_abs` is the tick the note started on.
    pub fn off(channel: u8, note: u8, velocity: u8, time_abs: u64, duration: u64) -> Self {
        Self {
            code: EventCode::Off,
            channel,
            note,
            velocity,
            time_abs,
            duration,
        }
    }

    pub fn encode(&self) -> Result<[u8; RECORD_SIZE]> {
        let time_abs = fit_u32("time_abs", self.time_abs)?;
        let duration = fit_u32("duration", self.duration)?;

        let mut bytes = [0u8; RECORD_SIZE];
        bytes[0] = self.code as u8;
        bytes[1] = self.channel;
        bytes[2] = self.note;
        bytes[3] = self.velocity;
        bytes[4..8].copy_from_slice(&time_abs.to_le_bytes());
        bytes[8..12].copy_from_slice(&duration.to_le_bytes());
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8; RECORD_SIZE]) -> Result<Self> {
        let mut time_abs = [0u8; 4];
        let mut duration = [0u8; 4];
        time_abs.copy_from_slice(&bytes[4..8]);
        duration.copy_from_slice(&bytes[8..12]);

        Ok(Self {
            code: EventCode::try_from(bytes[0])?,
            channel: bytes[1],
            note: bytes[2],
            velocity: bytes[3],
            time_abs: u32::from_le_bytes(time_abs).into(),
            duration: u32::from_le_bytes(duration).into(),
        })
    }
}

fn fit_u32(field: &'static str, value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::EncodingOverflow { field, value })
}
