use std::fs;
use std::path::Path;

use midi_file::core::{Message, NoteMessage};
use midi_file::file::{Division, Event, MetaEvent, TrackEvent};
use midi_file::MidiFile;
use tracing::debug;

use crate::error::{Error, Result};
use crate::midi_event::{MidiSource, RawEvent};

/// Turns a parsed standard MIDI file into per-track `RawEvent` streams.
pub struct Extractor {
    midi_file: MidiFile,
}

impl Extractor {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::SourceNotFound(path.to_path_buf()));
        }

        let bytes = fs::read(path).map_err(|e| Error::MalformedSource(e.to_string()))?;
        if header_division(&bytes).is_some_and(is_smpte) {
            return Err(Error::UnsupportedDivision);
        }

        let midi_file =
            MidiFile::load(path).map_err(|e| Error::MalformedSource(e.to_string()))?;
        Ok(Self { midi_file })
    }

    pub fn run(&self) -> Result<MidiSource> {
        // read division to get pulses per quarter note
        let ticks_per_beat = match self.midi_file.header().division() {
            Division::QuarterNote(qtr) => qtr.get(),
            Division::Smpte(smpte) => {
                debug!("SMPTE division: {:?}", smpte);
                return Err(Error::UnsupportedDivision);
            }
        };
        debug!("quarter note division: {}", ticks_per_beat);

        let tracks = self
            .midi_file
            .tracks()
            .map(|t| t.events().map(convert_event).collect::<Vec<_>>())
            .collect();

        Ok(MidiSource {
            ticks_per_beat,
            tracks,
        })
    }
}

/// The raw division word of an `MThd` chunk.
fn header_division(bytes: &[u8]) -> Option<u16> {
    if bytes.get(0..4)? != b"MThd" {
        return None;
    }
    let division = bytes.get(12..14)?;
    Some(u16::from_be_bytes([division[0], division[1]]))
}

// top bit set: negative SMPTE format in the high byte, ticks per frame in the low
fn is_smpte(division: u16) -> bool {
    division & 0x8000 != 0
}

fn convert_event(track_event: &TrackEvent) -> RawEvent {
    let dt = track_event.delta_time();
    match track_event.event() {
        Event::Midi(Message::NoteOn(note)) => {
            let (channel, note_number, velocity) = note_fields(note);
            RawEvent::note_on(dt, channel, note_number, velocity)
        }
        Event::Midi(Message::NoteOff(note)) => {
            let (channel, note_number, velocity) = note_fields(note);
            RawEvent::note_off(dt, channel, note_number, velocity)
        }
        Event::Meta(MetaEvent::SetTempo(tempo)) => RawEvent::tempo(dt, tempo.get()),
        _ => RawEvent::other(dt),
    }
}

fn note_fields(note: &NoteMessage) -> (u8, u8, u8) {
    (
        note.channel().get(), // midi_file is 0-based
        note.note_number().get(),
        note.velocity().get(),
    )
}
