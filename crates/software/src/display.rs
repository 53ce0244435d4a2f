//! Provides [`DisplayModel`], a snapshot of everything the status display shows, and its layout on a 128x32 panel.

use crate::{
    input::InputSampler,
    io::{Fill, Screen},
    midi::LastNoteEvent,
    pulse::{CHANNEL_COUNT, PulseTimerBank},
};
use core::fmt::Write;
use embedded_graphics::{
    prelude::{Point, Size},
    primitives::Rectangle,
};
use heapless::String;

/// Height of a text row, in pixels.
const ROW_HEIGHT: i32 = 8;
/// Left edge of the indicator column.
const INDICATOR_X: i32 = 118;
/// Side length of every indicator box.
const INDICATOR_SIZE: u32 = 8;
/// Horizontal distance between channel indicators.
const CHANNEL_PITCH: i32 = 10;

/// Read-only snapshot of the device state, taken just before a refresh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayModel {
    /// Current encoder detent.
    pub detent: u8,
    /// Toggled state of the encoder switch.
    pub switch_on: bool,
    /// Latest CV reading.
    pub cv_raw: u16,
    /// Whether the gate is held active.
    pub gate_active: bool,
    /// The most recent note event.
    pub last_note: LastNoteEvent,
    /// Whether each channel is mid-pulse.
    pub channels: [bool; CHANNEL_COUNT],
}

impl DisplayModel {
    /// Gathers a snapshot from the components that own the state.
    pub fn snapshot(
        inputs: &InputSampler,
        last_note: &LastNoteEvent,
        pulses: &PulseTimerBank,
    ) -> Self {
        let mut channels = [false; CHANNEL_COUNT];
        for (shown, output) in channels.iter_mut().zip(pulses.iter()) {
            *shown = output.is_active();
        }
        Self {
            detent: inputs.encoder().detent,
            switch_on: inputs.encoder().switch_on,
            cv_raw: inputs.gate_cv().cv_raw,
            gate_active: inputs.gate_cv().is_active(),
            last_note: *last_note,
            channels,
        }
    }

    /// Draws the snapshot and presents it.
    ///
    /// Layout, one 8 pixel row each: encoder detent, CV reading, last note, then one box per channel. The first three
    /// rows end with an indicator box for the switch, the gate and the note velocity respectively.
    pub fn render<S: Screen>(&self, screen: &mut S) -> Result<(), S::Error> {
        screen.clear()?;

        let mut line: String<24> = String::new();

        // a line too long for the buffer is shown truncated rather than not at all
        let _ = write!(line, "Encoder: {}", self.detent);
        self.row(screen, 0, &line, self.switch_on)?;

        line.clear();
        let _ = write!(line, "CV: {}", self.cv_raw);
        self.row(screen, 1, &line, self.gate_active)?;

        line.clear();
        let _ = write!(line, "Note: {}", self.last_note.label());
        self.row(screen, 2, &line, self.last_note.velocity > 0)?;

        for (channel, &active) in self.channels.iter().enumerate() {
            let x = channel as i32 * CHANNEL_PITCH;
            screen.draw_rect(indicator(x, 3 * ROW_HEIGHT), Fill::from(active))?;
        }

        screen.present()
    }

    fn row<S: Screen>(
        &self,
        screen: &mut S,
        row: i32,
        text: &str,
        lit: bool,
    ) -> Result<(), S::Error> {
        let y = row * ROW_HEIGHT;
        screen.set_cursor(0, y);
        screen.print(text)?;
        screen.draw_rect(indicator(INDICATOR_X, y), Fill::from(lit))
    }
}

fn indicator(x: i32, y: i32) -> Rectangle {
    Rectangle::new(Point::new(x, y), Size::new(INDICATOR_SIZE, INDICATOR_SIZE))
}

/// A [`Screen`] that remembers what was drawn, for tests.
#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use heapless::Vec;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Op {
        Clear,
        Print(Point, String<24>),
        Rect(Rectangle, Fill),
        Present,
    }

    #[derive(Default)]
    pub struct RecordingScreen {
        cursor: Point,
        pub ops: Vec<Op, 32>,
        pub presents: usize,
        pub fail: bool,
    }

    impl RecordingScreen {
        /// Texts printed since the last clear, in order.
        pub fn texts(&self) -> Vec<&str, 8> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Print(_, text) => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }

        /// Rectangles drawn since the last clear, in order.
        pub fn rects(&self) -> Vec<(Rectangle, Fill), 16> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Rect(rect, fill) => Some((*rect, *fill)),
                    _ => None,
                })
                .collect()
        }
    }

    impl Screen for RecordingScreen {
        type Error = ();

        fn clear(&mut self) -> Result<(), ()> {
            self.ops.clear();
            self.ops.push(Op::Clear).map_err(|_| ())
        }

        fn set_cursor(&mut self, x: i32, y: i32) {
            self.cursor = Point::new(x, y);
        }

        fn print(&mut self, text: &str) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            let text = String::try_from(text)?;
            self.ops.push(Op::Print(self.cursor, text)).map_err(|_| ())
        }

        fn draw_rect(&mut self, rect: Rectangle, fill: Fill) -> Result<(), ()> {
            self.ops.push(Op::Rect(rect, fill)).map_err(|_| ())
        }

        fn present(&mut self) -> Result<(), ()> {
            self.presents += 1;
            self.ops.push(Op::Present).map_err(|_| ())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{recording::*, *};
    use wmidi::Note;

    fn model() -> DisplayModel {
        DisplayModel {
            detent: 7,
            switch_on: true,
            cv_raw: 1023,
            gate_active: false,
            last_note: LastNoteEvent {
                note: Some(Note::C2),
                velocity: 100,
                is_on: true,
            },
            channels: [
                true, false, false, false, false, false, false, false, false, false, false, true,
            ],
        }
    }

    #[test]
    fn renders_text_rows() {
        let mut screen = RecordingScreen::default();
        model().render(&mut screen).expect("recording screen never fails");

        assert_eq!(
            ["Encoder: 7", "CV: 1023", "Note: 36 (C2)"].as_slice(),
            screen.texts().as_slice(),
            "Expected left but got right"
        );
        assert_eq!(Some(&Op::Clear), screen.ops.first());
        assert_eq!(Some(&Op::Present), screen.ops.last());
        assert_eq!(1, screen.presents);
        let note_row = String::try_from("Note: 36 (C2)").unwrap();
        assert!(screen.ops.contains(&Op::Print(Point::new(0, 16), note_row)));
    }

    #[test]
    fn renders_indicators() {
        let mut screen = RecordingScreen::default();
        model().render(&mut screen).expect("recording screen never fails");
        let rects = screen.rects();
        assert_eq!(15, rects.len());

        // switch, gate, velocity
        assert_eq!((indicator(118, 0), Fill::Solid), rects[0]);
        assert_eq!((indicator(118, 8), Fill::Outline), rects[1]);
        assert_eq!((indicator(118, 16), Fill::Solid), rects[2]);

        // channels
        assert_eq!((indicator(0, 24), Fill::Solid), rects[3]);
        assert_eq!((indicator(10, 24), Fill::Outline), rects[4]);
        assert_eq!((indicator(110, 24), Fill::Solid), rects[14]);
    }

    #[test]
    fn renders_missing_note() {
        let mut screen = RecordingScreen::default();
        let model = DisplayModel {
            last_note: LastNoteEvent::default(),
            ..model()
        };
        model.render(&mut screen).expect("recording screen never fails");
        assert_eq!("Note: None", screen.texts()[2]);
        assert_eq!(Fill::Outline, screen.rects()[2].1, "No velocity, empty box");
    }

    #[test]
    fn screen_errors_are_returned() {
        let mut screen = RecordingScreen::default();
        screen.fail = true;
        assert_eq!(Err(()), model().render(&mut screen));
        assert_eq!(0, screen.presents, "Nothing should be presented after a failure");
    }
}
