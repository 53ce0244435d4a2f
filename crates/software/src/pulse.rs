//! Provides [`PulseTimerBank`], the set of monostable timers behind the device's outputs.
//!
//! A trigger drives a channel high; the channel returns low on its own once the pulse duration has elapsed. There is
//! no way to end a pulse early: outputs behave like the fixed-width triggers of a modular system rather
//! than like gates that follow a held key.

use crate::{Change, elapsed};
use embassy_time::{Duration, Instant};

/// Number of independent output channels.
pub const CHANNEL_COUNT: usize = 12;

/// One output channel.
///
/// The start [`Instant`] doubles as the activity flag, so a channel is active exactly when it knows when its pulse
/// began.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OutputChannel {
    started: Option<Instant>,
}

impl OutputChannel {
    /// Returns `true` while the channel's pulse is running.
    pub fn is_active(&self) -> bool {
        self.started.is_some()
    }

    /// Getter.
    pub fn started(&self) -> Option<Instant> {
        self.started
    }
}

/// Twelve independent monostable timers sharing a single pulse duration.
#[derive(Clone, Debug, PartialEq)]
pub struct PulseTimerBank {
    channels: [OutputChannel; CHANNEL_COUNT],
    pulse_duration: Duration,
}

impl PulseTimerBank {
    /// Constructs a [`PulseTimerBank`] with every channel idle.
    pub fn new(pulse_duration: Duration) -> Self {
        Self {
            channels: [OutputChannel::default(); CHANNEL_COUNT],
            pulse_duration,
        }
    }

    /// Starts a pulse on `channel` at `now`.
    ///
    /// Triggering an active channel restarts its pulse rather than queueing a second one. Indices past the last
    /// channel are ignored.
    pub fn trigger(&mut self, channel: usize, now: Instant) -> Change {
        match self.channels.get_mut(channel) {
            Some(output) => {
                output.started = Some(now);
                Change::PulseStart
            }
            None => {
                warn!("Ignoring trigger for nonexistent channel {}", channel);
                Change::none()
            }
        }
    }

    /// Ends every pulse which has lasted at least the pulse duration as of `now`.
    pub fn tick(&mut self, now: Instant) -> Change {
        let mut change = Change::none();
        for (index, output) in self.channels.iter_mut().enumerate() {
            let Some(started) = output.started else {
                continue;
            };
            // elapsed time rather than an absolute deadline, so the comparison survives a clock wrap
            if elapsed(started, now) >= self.pulse_duration {
                output.started = None;
                change |= Change::PulseEnd;
                trace!("Pulse ended on channel {}", index);
            }
        }
        change
    }

    /// Returns `true` while `channel`'s pulse is running; `false` for idle or nonexistent channels.
    pub fn is_active(&self, channel: usize) -> bool {
        self.channels
            .get(channel)
            .is_some_and(OutputChannel::is_active)
    }

    /// Returns an [`Iterator`] over the channels, in index order.
    pub fn iter(&self) -> impl Iterator<Item = &OutputChannel> {
        self.channels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PULSE: Duration = Duration::from_millis(30);

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn active_channels(bank: &PulseTimerBank) -> [bool; CHANNEL_COUNT] {
        let mut active = [false; CHANNEL_COUNT];
        for (slot, output) in active.iter_mut().zip(bank.iter()) {
            *slot = output.is_active();
        }
        active
    }

    #[test]
    fn new_bank_is_idle() {
        let bank = PulseTimerBank::new(PULSE);
        assert_eq!([false; CHANNEL_COUNT], active_channels(&bank));
        assert!(bank.iter().all(|output| output.started().is_none()));
    }

    #[test]
    fn trigger_only_affects_its_channel() {
        for channel in 0..CHANNEL_COUNT {
            let mut bank = PulseTimerBank::new(PULSE);
            let change = bank.trigger(channel, at(100));
            assert_eq!(Change::PulseStart, change, "Expected left but got right");

            let mut expected = [false; CHANNEL_COUNT];
            expected[channel] = true;
            assert_eq!(expected, active_channels(&bank), "Expected left but got right");
            assert_eq!(Some(at(100)), bank.iter().nth(channel).and_then(OutputChannel::started));
        }
    }

    #[test]
    fn out_of_range_trigger_is_ignored() {
        let mut bank = PulseTimerBank::new(PULSE);
        assert!(bank.trigger(CHANNEL_COUNT, at(0)).is_none());
        assert_eq!([false; CHANNEL_COUNT], active_channels(&bank));
        assert!(!bank.is_active(CHANNEL_COUNT));
    }

    #[test]
    fn pulse_ends_at_first_tick_past_duration() {
        let mut bank = PulseTimerBank::new(PULSE);
        bank.trigger(5, at(1_000));

        assert!(bank.tick(at(1_000)).is_none());
        assert!(bank.tick(at(1_029)).is_none());
        assert!(bank.is_active(5), "Should still be active 1ms before the end");

        assert_eq!(Change::PulseEnd, bank.tick(at(1_030)));
        assert!(!bank.is_active(5), "Should end exactly at the pulse duration");

        assert!(bank.tick(at(1_031)).is_none(), "Should only report the end once");
    }

    #[test]
    fn late_tick_still_ends_pulse() {
        let mut bank = PulseTimerBank::new(PULSE);
        bank.trigger(0, at(0));
        assert_eq!(Change::PulseEnd, bank.tick(at(500)));
        assert!(!bank.is_active(0));
    }

    #[test]
    fn retrigger_restarts_window() {
        let mut bank = PulseTimerBank::new(PULSE);
        bank.trigger(3, at(1_000));
        bank.trigger(3, at(1_015));

        assert!(bank.tick(at(1_030)).is_none());
        assert!(bank.is_active(3), "Should outlast the first trigger's window");
        assert!(bank.tick(at(1_044)).is_none());
        assert!(bank.is_active(3));

        assert_eq!(Change::PulseEnd, bank.tick(at(1_045)));
        assert!(!bank.is_active(3));
    }

    #[test]
    fn channels_expire_independently() {
        let mut bank = PulseTimerBank::new(PULSE);
        bank.trigger(0, at(0));
        bank.trigger(11, at(20));

        bank.tick(at(30));
        assert!(!bank.is_active(0));
        assert!(bank.is_active(11));

        bank.tick(at(50));
        assert!(!bank.is_active(11));
    }

    #[test]
    fn pulse_expires_across_clock_wrap() {
        let mut bank = PulseTimerBank::new(PULSE);
        let start = Instant::from_ticks(u64::MAX - 5);
        bank.trigger(2, start);

        assert!(bank.tick(Instant::from_ticks(3)).is_none(), "Only a few ticks have passed");
        assert!(bank.is_active(2));

        let end = Instant::from_ticks(PULSE.as_ticks() - 6);
        assert_eq!(Change::PulseEnd, bank.tick(end), "Expected left but got right");
        assert!(!bank.is_active(2));
    }
}
