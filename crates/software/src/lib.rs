//! This crate contains architecture-agnostic logic for Solenoise, a trigger generator for modular synthesizers which
//! turns [MIDI](https://midi.org/midi-1-0) notes and an analog [gate/CV](https://en.wikipedia.org/wiki/CV/gate) pair
//! into short pulses on twelve independent outputs, while tracking a rotary encoder with a push switch and keeping a
//! small status display up to date.
//!
//! Everything that touches hardware is reached through the traits in [`io`], so the whole scheduling loop can be
//! exercised on a host machine.

#![deny(missing_docs)]
#![no_std]

#[macro_use]
mod fmt;

pub mod configuration;
pub mod display;
pub mod gate_cv;
pub mod input;
pub mod io;
pub mod midi;
pub mod pulse;
pub mod scheduler;

use bitmask_enum::bitmask;
use embassy_time::{Duration, Instant};

/// Kinds of state change that may happen during a step of the [`Scheduler`][scheduler::Scheduler].
///
/// Any non-empty value means the status display is stale.
#[bitmask(u8)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Change {
    /// A note event was received, whether or not it fired a pulse.
    NoteEvent,
    /// A channel started (or restarted) a pulse.
    PulseStart,
    /// A channel's pulse ran out.
    PulseEnd,
    /// The debounced encoder switch toggled.
    Switch,
    /// The encoder moved onto a different detent.
    Detent,
}

/// Returns the time from `since` to `now`, measured in ticks modulo the counter width so that it stays correct when
/// the clock wraps between the two readings.
pub(crate) fn elapsed(since: Instant, now: Instant) -> Duration {
    Duration::from_ticks(now.as_ticks().wrapping_sub(since.as_ticks()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_spans_clock_wrap() {
        let since = Instant::from_ticks(u64::MAX - 5);
        let now = Instant::from_ticks(10);
        assert_eq!(Duration::from_ticks(16), elapsed(since, now), "Expected left but got right");
    }

    #[test]
    fn elapsed_without_wrap() {
        assert_eq!(
            Duration::from_millis(30),
            elapsed(Instant::from_millis(1_000), Instant::from_millis(1_030))
        );
        assert_eq!(
            Duration::from_ticks(0),
            elapsed(Instant::from_millis(7), Instant::from_millis(7))
        );
    }
}
