//! Provides [`GateCvRouter`], which lets an external gate/CV pair fire the outputs: the gate says when, the CV says
//! which channel.

use crate::{
    Change,
    input::GateCvSample,
    pulse::{CHANNEL_COUNT, PulseTimerBank},
};
use embassy_time::Instant;

/// Fires a channel chosen by the CV level each time the gate becomes active.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GateCvRouter {
    full_scale: u32,
}

impl GateCvRouter {
    /// Full scale of a 10-bit converter.
    pub const FULL_SCALE_10_BIT: u16 = 1024;

    /// Constructs a [`GateCvRouter`] for a converter whose readings run from 0 to `full_scale - 1`.
    pub fn new(full_scale: u16) -> Self {
        Self {
            // a zero full scale would divide by zero below
            full_scale: u32::from(full_scale.max(1)),
        }
    }

    /// Maps a CV reading onto a channel index, splitting the range into twelve equal bands. Readings at or beyond
    /// full scale land on the last channel.
    pub fn quantize(&self, cv_raw: u16) -> usize {
        let index = u32::from(cv_raw) * CHANNEL_COUNT as u32 / self.full_scale;
        (index as usize).min(CHANNEL_COUNT - 1)
    }

    /// Triggers the channel selected by the CV when `sample` shows a falling edge on the gate.
    ///
    /// A gate held low fires only once; it must return high before it can fire again.
    pub fn route(
        &self,
        sample: &GateCvSample,
        pulses: &mut PulseTimerBank,
        now: Instant,
    ) -> Change {
        if !sample.is_falling_edge() {
            return Change::none();
        }
        let channel = self.quantize(sample.cv_raw);
        debug!("Triggering channel {} from gate, CV {}", channel, sample.cv_raw);
        pulses.trigger(channel, now)
    }
}

impl Default for GateCvRouter {
    fn default() -> Self {
        Self::new(Self::FULL_SCALE_10_BIT)
    }
}
