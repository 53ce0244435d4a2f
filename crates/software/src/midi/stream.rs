//! Provides [`MidiStream`], which reassembles note events from the byte stream of a serial (DIN or TRS) MIDI input.

use super::NoteEvent;
use wmidi::MidiMessage;

/// Reassembles channel messages from a serial MIDI byte stream, honoring running status.
///
/// Only Note On and Note Off come out the other end; everything else is framed so that it can be skipped correctly
/// and then dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MidiStream {
    /// Status byte of the channel message in progress; `None` when running status has been cancelled.
    status: Option<u8>,
    data: [u8; 2],
    received: usize,
}

impl MidiStream {
    /// Constructs a [`MidiStream`] that waits for a status byte.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one byte, returning a [`NoteEvent`] when it completes a Note On or Note Off.
    pub fn push(&mut self, byte: u8) -> Option<NoteEvent> {
        match byte {
            // real-time messages may be interleaved anywhere, even inside another message
            0xF8..=0xFF => None,
            // system exclusive and system common messages cancel running status; their data bytes are dropped below
            0xF0..=0xF7 => {
                self.status = None;
                self.received = 0;
                None
            }
            0x80..=0xEF => {
                self.status = Some(byte);
                self.received = 0;
                None
            }
            _ => self.push_data(byte),
        }
    }

    fn push_data(&mut self, byte: u8) -> Option<NoteEvent> {
        let status = self.status?;
        self.data[self.received] = byte;
        self.received += 1;
        if self.received < data_len(status) {
            return None;
        }
        // leave the status in place for running status
        self.received = 0;

        let frame = [status, self.data[0], self.data[1]];
        match MidiMessage::from_bytes(&frame[..1 + data_len(status)]) {
            Ok(msg) => NoteEvent::from_message(&msg),
            Err(_) => {
                warn!("Dropping malformed MIDI message with status {}", status);
                None
            }
        }
    }
}

/// Number of data bytes following a channel message status byte.
fn data_len(status: u8) -> usize {
    match status & 0xF0 {
        // program change, channel pressure
        0xC0 | 0xD0 => 1,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::{NoteKind, note_event};
    use wmidi::Channel;

    fn feed(stream: &mut MidiStream, bytes: &[u8]) -> heapless::Vec<NoteEvent, 8> {
        bytes.iter().filter_map(|&b| stream.push(b)).collect()
    }

    #[test]
    fn note_on_and_off() {
        let mut stream = MidiStream::new();
        let events = feed(&mut stream, &[0x90, 36, 100, 0x80, 36, 0]);
        assert_eq!(
            [note_event(NoteKind::On, 36, 100), note_event(NoteKind::Off, 36, 0)].as_slice(),
            events.as_slice(),
            "Expected left but got right"
        );
    }

    #[test]
    fn any_channel_is_accepted() {
        let mut stream = MidiStream::new();
        let events = feed(&mut stream, &[0x9F, 40, 1]);
        assert_eq!(1, events.len());
        assert_eq!(Channel::Ch16, events[0].channel);
    }

    #[test]
    fn running_status() {
        let mut stream = MidiStream::new();
        let events = feed(&mut stream, &[0x90, 36, 100, 37, 90, 38, 1]);
        assert_eq!(
            [
                note_event(NoteKind::On, 36, 100),
                note_event(NoteKind::On, 37, 90),
                note_event(NoteKind::On, 38, 1),
            ]
            .as_slice(),
            events.as_slice(),
            "Expected left but got right"
        );
    }

    #[test]
    fn realtime_bytes_are_transparent() {
        let mut stream = MidiStream::new();
        let events = feed(&mut stream, &[0x90, 0xF8, 36, 0xFE, 100]);
        assert_eq!([note_event(NoteKind::On, 36, 100)].as_slice(), events.as_slice());
    }

    #[test]
    fn other_channel_messages_are_framed_and_dropped() {
        let mut stream = MidiStream::new();
        // control change, program change (one data byte), then a note
        let events = feed(&mut stream, &[0xB0, 7, 127, 0xC0, 5, 0x90, 44, 1]);
        assert_eq!([note_event(NoteKind::On, 44, 1)].as_slice(), events.as_slice());
    }

    #[test]
    fn sysex_cancels_running_status() {
        let mut stream = MidiStream::new();
        let events = feed(&mut stream, &[0x90, 36, 100, 0xF0, 0x7E, 36, 100, 0xF7, 36, 100]);
        assert_eq!(
            [note_event(NoteKind::On, 36, 100)].as_slice(),
            events.as_slice(),
            "Data bytes without a status should be dropped"
        );
    }

    #[test]
    fn stray_data_is_dropped_until_status() {
        let mut stream = MidiStream::new();
        let events = feed(&mut stream, &[36, 100, 0x90, 45, 70]);
        assert_eq!([note_event(NoteKind::On, 45, 70)].as_slice(), events.as_slice());
    }

    #[test]
    fn new_status_abandons_partial_message() {
        let mut stream = MidiStream::new();
        let events = feed(&mut stream, &[0x90, 36, 0x80, 37, 0]);
        assert_eq!([note_event(NoteKind::Off, 37, 0)].as_slice(), events.as_slice());
    }
}
