//! This module provides traits for the device's inputs (MIDI, encoder, switch, gate, CV) and outputs (trigger lines,
//! status display).
//!
//! The [`Scheduler`][crate::scheduler::Scheduler] only ever talks to hardware through a [`Board`], which keeps the
//! timing logic independent of the microcontroller and lets tests substitute a fake.

use crate::midi::NoteEvent;
use embassy_time::Instant;
use embedded_graphics::primitives::Rectangle;

/// Electrical level of a digital line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Line is pulled or driven high.
    High,
    /// Line is pulled or driven low.
    Low,
}

impl From<bool> for Level {
    /// `true` is [`Level::High`].
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

/// Raw readings of every polled input, taken together once per tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputFrame {
    /// Accumulated quadrature count of the encoder, as the hardware counts it.
    pub encoder_position: i32,
    /// Encoder push switch; pulled up, so [`Level::Low`] means pressed.
    pub switch: Level,
    /// Gate input; pulled up and active low.
    pub gate: Level,
    /// CV input as read by a 10-bit converter (0 to 1023 for 0 to 5V).
    pub cv_raw: u16,
}

/// How a rectangle is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fill {
    /// Border only.
    Outline,
    /// Border and interior.
    Solid,
}

impl From<bool> for Fill {
    /// `true` is [`Fill::Solid`]; handy for indicators.
    fn from(solid: bool) -> Self {
        if solid { Fill::Solid } else { Fill::Outline }
    }
}

/// A monochrome text and graphics display which draws into a buffer and shows it on [`present`][Self::present].
pub trait Screen {
    /// Error reported by the display device.
    type Error;

    /// Blanks the buffer.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Moves the text cursor to a pixel position (top left of the next character).
    fn set_cursor(&mut self, x: i32, y: i32);

    /// Draws text at the cursor and advances the cursor past it.
    fn print(&mut self, text: &str) -> Result<(), Self::Error>;

    /// Draws a rectangle.
    fn draw_rect(&mut self, rect: Rectangle, fill: Fill) -> Result<(), Self::Error>;

    /// Sends the buffer to the display.
    fn present(&mut self) -> Result<(), Self::Error>;
}

/// All the hardware the scheduler needs, behind non-blocking calls.
pub trait Board {
    /// The status display.
    type Screen: Screen;

    /// Returns the current time of the monotonic clock.
    fn now(&self) -> Instant;

    /// Returns the next decoded note event, if one is waiting. Must not block.
    fn poll_midi(&mut self) -> Option<NoteEvent>;

    /// Reads the encoder, switch, gate and CV inputs.
    fn sample_inputs(&mut self) -> InputFrame;

    /// Drives one output line. `channel` is always less than [`CHANNEL_COUNT`][crate::pulse::CHANNEL_COUNT].
    fn set_output(&mut self, channel: usize, level: Level);

    /// Lends out the status display.
    fn screen(&mut self) -> &mut Self::Screen;
}
