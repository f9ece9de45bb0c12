use crate::error::{Error, Result};
use crate::midi_event::MidiSource;
use crate::reconstruct::{reconstruct, ClosePolicy};
use crate::record::{EventRecord, RECORD_SIZE};
use crate::tempo::TimingConstants;

/// The sorted, encoded event table of one file plus its timing constants.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTable {
    pub timing: TimingConstants,
    records: Vec<EventRecord>,
    bytes: Vec<u8>,
}

impl EventTable {
    pub fn build(source: &MidiSource, policy: ClosePolicy) -> Result<Self> {
        let timing = TimingConstants::new(source.ticks_per_beat, &source.tracks);
        let records = reconstruct(&source.tracks, policy)?;
        Self::from_records(timing, records)
    }

    /// Sorts by start tick (stable, so ties keep discovery order) and encodes.
    /// Any record that does not fit fails the whole table.
    pub fn from_records(timing: TimingConstants, mut records: Vec<EventRecord>) -> Result<Self> {
        records.sort_by_key(|r| r.time_abs);

        let mut bytes = Vec::with_capacity(records.len() * RECORD_SIZE);
        for record in &records {
            bytes.extend_from_slice(&record.encode()?);
        }

        let table = Self {
            timing,
            records,
            bytes,
        };
        // the counts are emitted as u32 constants
        table.event_count()?;
        table.total_byte_size()?;
        Ok(table)
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn event_count(&self) -> Result<u32> {
        u32::try_from(self.records.len()).map_err(|_| Error::EncodingOverflow {
            field: "event_count",
            value: self.records.len() as u64,
        })
    }

    pub fn total_byte_size(&self) -> Result<u32> {
        u32::try_from(self.bytes.len()).map_err(|_| Error::EncodingOverflow {
            field: "total_byte_size",
            value: self.bytes.len() as u64,
        })
    }

    pub fn tick_duration_ms(&self) -> f64 {
        self.timing.tick_duration_ms()
    }
}

/// Reads a byte table back into records.
pub fn decode_records(bytes: &[u8]) -> Result<Vec<EventRecord>> {
    if bytes.len() % RECORD_SIZE != 0 {
        return Err(Error::InvalidTable(format!(
            "{} bytes is not a multiple of {}",
            bytes.len(),
            RECORD_SIZE
        )));
    }

    bytes
        .chunks_exact(RECORD_SIZE)
        .map(|chunk| {
            let mut record = [0u8; RECORD_SIZE];
            record.copy_from_slice(chunk);
            EventRecord::decode(&record)
        })
        .collect()
}
