use crate::midi_event::{MessageKind, RawEvent};

/// 120 BPM
pub const DEFAULT_MICROS_PER_BEAT: u32 = 500_000;

const MICROS_PER_MILLI: f64 = 1_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConstants {
    pub ticks_per_beat: u32,
    pub micros_per_beat: u32,
}

impl TimingConstants {
    pub fn new(ticks_per_beat: u16, tracks: &[Vec<RawEvent>]) -> Self {
        Self {
            ticks_per_beat: ticks_per_beat.into(),
            micros_per_beat: first_tempo(tracks).unwrap_or(DEFAULT_MICROS_PER_BEAT),
        }
    }

    /// Milliseconds per tick. Zero ticks-per-beat yields infinity, as the float division would.
    pub fn tick_duration_ms(&self) -> f64 {
        self.micros_per_beat as f64 / self.ticks_per_beat as f64 / MICROS_PER_MILLI
    }

    pub fn bpm(&self) -> f64 {
        60_000_000.0 / self.micros_per_beat as f64
    }
}

/// The first set-tempo event across all tracks, scanned in stored order.
pub fn first_tempo(tracks: &[Vec<RawEvent>]) -> Option<u32> {
    tracks.iter().flatten().find_map(|e| match e.kind {
        MessageKind::Tempo { micros_per_beat } => Some(micros_per_beat),
        _ => None,
    })
}
