use super::ConfigError;
use crate::pulse::CHANNEL_COUNT;
use wmidi::{Note, U7};

/// The contiguous run of [`Note`]s which fire the outputs, one note per channel, lowest note on channel 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteWindow {
    first: Note,
}

#[cfg(feature = "defmt")]
impl defmt::Format for NoteWindow {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "NoteWindow {{ first: {} }}", u8::from(self.first));
    }
}

impl NoteWindow {
    /// Constructs a [`NoteWindow`] starting at `first`, which fails if the window would run past the top of the
    /// MIDI note range.
    pub fn new(first: Note) -> Result<Self, ConfigError> {
        if usize::from(u8::from(first)) + CHANNEL_COUNT - 1 > 127 {
            return Err(ConfigError::NoteWindowOutOfRange);
        }
        Ok(Self { first })
    }

    /// Getter.
    pub fn first(&self) -> Note {
        self.first
    }

    /// Returns the highest [`Note`] of the window.
    pub fn last(&self) -> Note {
        Note::from(U7::from_u8_lossy(u8::from(self.first) + CHANNEL_COUNT as u8 - 1))
    }

    /// Returns the channel a [`Note`] fires, or `None` when the note lies outside the window.
    pub fn channel(&self, note: Note) -> Option<usize> {
        let offset = u8::from(note).checked_sub(u8::from(self.first))?;
        let channel = usize::from(offset);
        (channel < CHANNEL_COUNT).then_some(channel)
    }
}

impl Default for NoteWindow {
    /// C2 (MIDI 36) through B2 (MIDI 47), the usual drum map base.
    fn default() -> Self {
        Self { first: Note::C2 }
    }
}
