//! Provides [`InputSampler`], which turns raw readings of the encoder, its switch, the gate and the CV into the
//! debounced, edge-aware state the rest of the device works with.

mod debounce;
pub use debounce::*;

use crate::{
    Change,
    configuration::EncoderConfig,
    io::{InputFrame, Level},
};
use embassy_time::{Duration, Instant};

/// State of the rotary encoder and its push switch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncoderState {
    /// Oriented quadrature count; grows without bound in either direction.
    pub raw_position: i32,
    /// Detent the encoder rests on, always less than the configured detents per revolution.
    pub detent: u8,
    /// Filtered switch level.
    pub switch: Debouncer,
    /// Flips once for every debounced press of the switch.
    pub switch_on: bool,
}

/// Latest reading of the gate and CV inputs, plus the previous gate level for edge detection.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GateCvSample {
    /// Gate level; active low.
    pub gate: Level,
    /// Gate level at the previous sample.
    pub last_gate: Level,
    /// Raw converter reading of the CV input.
    pub cv_raw: u16,
}

impl GateCvSample {
    /// Returns `true` when the gate went from idle (high) to active (low) between the previous sample and this one.
    pub fn is_falling_edge(&self) -> bool {
        self.last_gate == Level::High && self.gate == Level::Low
    }

    /// Returns `true` while the gate is held active.
    pub fn is_active(&self) -> bool {
        self.gate == Level::Low
    }
}

impl Default for GateCvSample {
    /// Inputs are pulled up, so an unpatched gate reads high.
    fn default() -> Self {
        Self {
            gate: Level::High,
            last_gate: Level::High,
            cv_raw: 0,
        }
    }
}

/// Samples the device's inputs once per tick.
#[derive(Clone, Debug, PartialEq)]
pub struct InputSampler {
    config: EncoderConfig,
    encoder: EncoderState,
    gate_cv: GateCvSample,
}

impl InputSampler {
    /// Constructs an [`InputSampler`] assuming the switch has been released since `now`.
    pub fn new(config: EncoderConfig, debounce_window: Duration, now: Instant) -> Self {
        Self {
            config,
            encoder: EncoderState {
                raw_position: 0,
                detent: 0,
                switch: Debouncer::new(Level::High, debounce_window, now),
                switch_on: false,
            },
            gate_cv: GateCvSample::default(),
        }
    }

    /// Folds a new [`InputFrame`] into the sampler's state.
    ///
    /// Reports [`Change::Detent`] when the encoder lands on a different detent and [`Change::Switch`] when a switch
    /// press is confirmed. Gate and CV changes are not reported; acting on them is up to the
    /// [`GateCvRouter`][crate::gate_cv::GateCvRouter].
    pub fn sample(&mut self, frame: &InputFrame, now: Instant) -> Change {
        let mut change = Change::none();

        let position = self.config.orient(frame.encoder_position);
        let detent = self.config.detent(position);
        self.encoder.raw_position = position;
        if detent != self.encoder.detent {
            self.encoder.detent = detent;
            change |= Change::Detent;
        }

        if self.encoder.switch.update(frame.switch, now) == Some(Level::Low) {
            self.encoder.switch_on = !self.encoder.switch_on;
            change |= Change::Switch;
            info!("Switch pressed, now {}", self.encoder.switch_on);
        }

        self.gate_cv = GateCvSample {
            gate: frame.gate,
            last_gate: self.gate_cv.gate,
            cv_raw: frame.cv_raw,
        };

        change
    }

    /// Getter.
    pub fn encoder(&self) -> &EncoderState {
        &self.encoder
    }

    /// Getter.
    pub fn gate_cv(&self) -> &GateCvSample {
        &self.gate_cv
    }
}
