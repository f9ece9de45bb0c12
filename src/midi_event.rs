/// One message from a track, as handed over by the file parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub delta_ticks: u32, // since the previous event in the same track
    pub kind: MessageKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
    Tempo { micros_per_beat: u32 },
    Other,
}

impl RawEvent {
    pub fn note_on(delta_ticks: u32, channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            delta_ticks,
            kind: MessageKind::NoteOn {
                channel,
                note,
                velocity,
            },
        }
    }

    pub fn note_off(delta_ticks: u32, channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            delta_ticks,
            kind: MessageKind::NoteOff {
                channel,
                note,
                velocity,
            },
        }
    }

    pub fn tempo(delta_ticks: u32, micros_per_beat: u32) -> Self {
        Self {
            delta_ticks,
            kind: MessageKind::Tempo { micros_per_beat },
        }
    }

    pub fn other(delta_ticks: u32) -> Self {
        Self {
            delta_ticks,
            kind: MessageKind::Other,
        }
    }
}

/// The tracks of one file, in stored order, plus the header's division.
#[derive(Debug, Clone)]
pub struct MidiSource {
    pub ticks_per_beat: u16,
    pub tracks: Vec<Vec<RawEvent>>,
}
