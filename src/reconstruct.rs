use std::collections::BTreeMap;
use std::mem;

use tracing::debug;

use crate::error::{Error, Result};
use crate::midi_event::{MessageKind, RawEvent};
use crate::record::EventRecord;

/// Which tick closes a note still sounding once every track has been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosePolicy {
    /// The final tick of the track that opened the note.
    #[default]
    OwnTrack,
    /// The final tick of the last track processed.
    LastTrack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNote {
    start: u64,
    velocity: u8,
    track: usize,
}

/// Notes between their note-on and note-off, keyed by (channel, note).
/// Shared by all tracks of a file.
#[derive(Debug, Default)]
pub struct OpenNotes {
    notes: BTreeMap<(u8, u8), OpenNote>,
}

impl OpenNotes {
    fn open(&mut self, channel: u8, note: u8, open: OpenNote) {
        self.notes.insert((channel, note), open);
    }

    fn take(&mut self, channel: u8, note: u8) -> Option<OpenNote> {
        self.notes.remove(&(channel, note))
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Pairs note-on/note-off messages into records, one track at a time.
#[derive(Debug)]
pub struct Reconstructor {
    policy: ClosePolicy,
    open: OpenNotes,
    records: Vec<EventRecord>,
    track_ends: Vec<u64>,
}

impl Reconstructor {
    pub fn new(policy: ClosePolicy) -> Self {
        Self {
            policy,
            open: OpenNotes::default(),
            records: Vec::new(),
            track_ends: Vec::new(),
        }
    }

    /// Walks one track from tick 0. Returns the track's final tick.
    pub fn track(&mut self, events: &[RawEvent]) -> Result<u64> {
        let track = self.track_ends.len();
        self.track_ends.push(0);
        let mut current_time_ticks: u64 = 0;

        for event in events {
            current_time_ticks += u64::from(event.delta_ticks);

            match event.kind {
                MessageKind::NoteOn {
                    channel,
                    note,
                    velocity,
                } if velocity > 0 => {
                    // retrigger closes the sounding note first
                    if let Some(prior) = self.open.take(channel, note) {
                        self.close(channel, note, prior, current_time_ticks)?;
                    }
                    self.open.open(
                        channel,
                        note,
                        OpenNote {
                            start: current_time_ticks,
                            velocity,
                            track,
                        },
                    );
                    self.records.push(EventRecord::on(
                        channel,
                        note,
                        velocity,
                        current_time_ticks,
                    ));
                }
                MessageKind::NoteOn { channel, note, .. }
                | MessageKind::NoteOff { channel, note, .. } => {
                    match self.open.take(channel, note) {
                        Some(open) => self.close(channel, note, open, current_time_ticks)?,
                        None => debug!(
                            "orphan note-off ch {} note {} at tick {}",
                            channel, note, current_time_ticks
                        ),
                    }
                }
                MessageKind::Tempo { .. } | MessageKind::Other => (),
            }
        }

        self.track_ends[track] = current_time_ticks;
        Ok(current_time_ticks)
    }

    /// Closes whatever is left and hands back the unsorted records.
    pub fn finish(mut self) -> Result<Vec<EventRecord>> {
        let last_end = self.track_ends.last().copied().unwrap_or(0);
        let leftovers = mem::take(&mut self.open.notes);

        for ((channel, note), open) in leftovers {
            let end = match self.policy {
                ClosePolicy::OwnTrack => self.track_ends[open.track],
                ClosePolicy::LastTrack => last_end,
            };
            debug!(
                "closing ch {} note {} held since tick {} at tick {}",
                channel, note, open.start, end
            );
            self.close(channel, note, open, end)?;
        }

        Ok(self.records)
    }

    pub fn open_notes(&self) -> &OpenNotes {
        &self.open
    }

    fn close(&mut self, channel: u8, note: u8, open: OpenNote, end: u64) -> Result<()> {
        let duration = end
            .checked_sub(open.start)
            .ok_or(Error::NegativeDuration {
                channel,
                note,
                start: open.start,
                end,
            })?;
        self.records.push(EventRecord::off(
            channel,
            note,
            open.velocity,
            open.start,
            duration,
        ));
        Ok(())
    }
}

/// Runs every track through a fresh `Reconstructor`.
pub fn reconstruct(tracks: &[Vec<RawEvent>], policy: ClosePolicy) -> Result<Vec<EventRecord>> {
    let mut reconstructor = Reconstructor::new(policy);
    for (i, track) in tracks.iter().enumerate() {
        let end = reconstructor.track(track)?;
        debug!(
            "track {}: {} messages, ends at tick {}",
            i + 1,
            track.len(),
            end
        );
        if !reconstructor.open_notes().is_empty() {
            debug!(
                "{} notes carried past track {}",
                reconstructor.open_notes().len(),
                i + 1
            );
        }
    }
    reconstructor.finish()
}
