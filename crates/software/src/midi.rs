//! Data structures for the MIDI notes the device has received and the routing of those notes to output channels.

mod stream;
pub use stream::*;

use crate::{Change, configuration::NoteWindow, pulse::PulseTimerBank};
use core::fmt;
use embassy_time::Instant;
use wmidi::{Channel, MidiMessage, Note, Velocity};

/// Whether a [`NoteEvent`] is a key press or a key release, as sent on the wire.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NoteKind {
    /// MIDI Note On.
    On,
    /// MIDI Note Off.
    Off,
}

/// A decoded Note On or Note Off message.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteEvent {
    /// On or off, as received; see [`is_on`][Self::is_on] for the effective meaning.
    pub kind: NoteKind,
    /// MIDI channel the message arrived on. The device listens on all of them.
    pub channel: Channel,
    /// Key number.
    pub note: Note,
    /// Key velocity.
    pub velocity: Velocity,
}

impl NoteEvent {
    /// Returns `true` for a Note On with nonzero velocity. By MIDI convention, a Note On with zero velocity is a
    /// Note Off.
    pub fn is_on(&self) -> bool {
        self.kind == NoteKind::On && u8::from(self.velocity) > 0
    }

    /// Extracts a [`NoteEvent`] from a [`MidiMessage`]; any other kind of message yields `None`.
    pub fn from_message(msg: &MidiMessage) -> Option<Self> {
        match *msg {
            MidiMessage::NoteOn(channel, note, velocity) => Some(Self {
                kind: NoteKind::On,
                channel,
                note,
                velocity,
            }),
            MidiMessage::NoteOff(channel, note, velocity) => Some(Self {
                kind: NoteKind::Off,
                channel,
                note,
                velocity,
            }),
            _ => None,
        }
    }
}

/// The most recent note event, kept for display. Only the latest event is retained.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LastNoteEvent {
    /// Key number, `None` until the first note event arrives.
    pub note: Option<Note>,
    /// Velocity of the event; zero when the event released the key.
    pub velocity: u8,
    /// Whether the event pressed the key.
    pub is_on: bool,
}

impl LastNoteEvent {
    /// Returns a [`fmt::Display`] describing the note as its number and name, e.g., `36 (C2)`, or `None`.
    pub fn label(&self) -> NoteLabel {
        NoteLabel(self.note)
    }
}

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Human-readable description of an optional [`Note`]; see [`LastNoteEvent::label`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteLabel(Option<Note>);

impl fmt::Display for NoteLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(note) => {
                let number = u8::from(note);
                // MIDI 60 is middle C, C4
                let octave = i16::from(number / 12) - 1;
                write!(
                    f,
                    "{} ({}{})",
                    number,
                    NOTE_NAMES[usize::from(number % 12)],
                    octave
                )
            }
            None => f.write_str("None"),
        }
    }
}

/// Routes note events onto output channels.
///
/// Each press of a key inside the [`NoteWindow`] fires the matching channel. Releases are recorded but never cut a
/// pulse short: pulse length is governed by the [`PulseTimerBank`] alone.
#[derive(Clone, Debug, PartialEq)]
pub struct MidiEventRouter {
    window: NoteWindow,
    last: LastNoteEvent,
}

impl MidiEventRouter {
    /// Constructs a [`MidiEventRouter`] which has yet to see a note.
    pub fn new(window: NoteWindow) -> Self {
        Self {
            window,
            last: LastNoteEvent::default(),
        }
    }

    /// Records `event` and, for a press inside the window, triggers its channel at `now`.
    ///
    /// Always reports [`Change::NoteEvent`], since the display shows every event.
    pub fn handle(
        &mut self,
        event: NoteEvent,
        pulses: &mut PulseTimerBank,
        now: Instant,
    ) -> Change {
        let is_on = event.is_on();
        let velocity = if is_on { u8::from(event.velocity) } else { 0 };
        self.last = LastNoteEvent {
            note: Some(event.note),
            velocity,
            is_on,
        };
        info!(
            "Received note {}: channel {}, note {}, velocity: {}",
            if is_on { "on" } else { "off" },
            event.channel.number(),
            u8::from(event.note),
            u8::from(event.velocity)
        );

        let mut change = Change::NoteEvent;
        if is_on {
            if let Some(channel) = self.window.channel(event.note) {
                debug!("Triggering channel {} from MIDI", channel);
                change |= pulses.trigger(channel, now);
            }
        }
        change
    }

    /// Getter.
    pub fn last(&self) -> &LastNoteEvent {
        &self.last
    }
}

/// Builds a [`NoteEvent`] on channel 1 from raw numbers, clamping each to its 7-bit range.
#[cfg(test)]
pub(crate) fn note_event(kind: NoteKind, note: u8, velocity: u8) -> NoteEvent {
    NoteEvent {
        kind,
        channel: Channel::Ch1,
        note: Note::from(wmidi::U7::from_u8_lossy(note)),
        velocity: wmidi::U7::from_u8_lossy(velocity),
    }
}
