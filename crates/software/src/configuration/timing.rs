use super::ConfigError;
use embassy_time::Duration;

/// Time constants of the device.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    pulse_duration: Duration,
    debounce_window: Duration,
    refresh_interval: Duration,
}

impl Timing {
    /// Factory pulse width. Long enough to reliably fire a solenoid driver or a module's trigger input.
    pub const PULSE_DURATION: Duration = Duration::from_millis(30);
    /// Factory debounce window for the encoder switch.
    pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(50);
    /// Factory upper bound on the time between two display refreshes, i.e., 20 frames per second.
    pub const REFRESH_INTERVAL: Duration = Duration::from_millis(50);

    /// Constructs a [`Timing`], rejecting durations the scheduler can't work with.
    pub fn new(
        pulse_duration: Duration,
        debounce_window: Duration,
        refresh_interval: Duration,
    ) -> Result<Self, ConfigError> {
        if pulse_duration == Duration::from_ticks(0) {
            return Err(ConfigError::ZeroPulseDuration);
        }
        if refresh_interval == Duration::from_ticks(0) {
            return Err(ConfigError::ZeroRefreshInterval);
        }
        Ok(Self {
            pulse_duration,
            debounce_window,
            refresh_interval,
        })
    }

    /// How long each output stays high after a trigger.
    pub fn pulse_duration(&self) -> Duration {
        self.pulse_duration
    }

    /// How long the switch level must hold still before it is believed.
    pub fn debounce_window(&self) -> Duration {
        self.debounce_window
    }

    /// Longest time the display may go without a refresh.
    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            pulse_duration: Self::PULSE_DURATION,
            debounce_window: Self::DEBOUNCE_WINDOW,
            refresh_interval: Self::REFRESH_INTERVAL,
        }
    }
}
