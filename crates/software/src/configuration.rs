//! This module contains the device's settings, each with a [`Default`] matching the factory configuration, and the
//! validation that guards them.

mod encoder;
pub use encoder::*;

mod note_window;
pub use note_window::*;

mod timing;
pub use timing::*;

use crate::gate_cv::GateCvRouter;

/// Reasons a configuration may be rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Pulses must last for a nonzero amount of time, otherwise they'd never be observable.
    ZeroPulseDuration,
    /// A zero refresh interval would redraw the display on every tick.
    ZeroRefreshInterval,
    /// The note window must fit entirely inside the MIDI note range.
    NoteWindowOutOfRange,
    /// The encoder must produce at least one count per detent and have between 1 and 256 detents per revolution.
    InvalidEncoderResolution,
}

/// All settings needed to run the [`Scheduler`][crate::scheduler::Scheduler].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    /// Pulse width, debounce window and display refresh rate.
    pub timing: Timing,
    /// Which MIDI notes fire which channels.
    pub note_window: NoteWindow,
    /// Geometry and orientation of the rotary encoder.
    pub encoder: EncoderConfig,
    /// Range of the CV converter.
    pub gate_cv: GateCvRouter,
}
