use super::ConfigError;

/// Which way the raw quadrature count runs relative to clockwise rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Raw count is used as read.
    Normal,
    /// Raw count is negated before use; needed when the A and B phases are wired the other way around.
    Inverted,
}

/// Geometry and orientation of the rotary encoder.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderConfig {
    counts_per_detent: i32,
    detents_per_revolution: i32,
    direction: Direction,
}

impl EncoderConfig {
    /// Constructs an [`EncoderConfig`].
    pub fn new(
        counts_per_detent: i32,
        detents_per_revolution: i32,
        direction: Direction,
    ) -> Result<Self, ConfigError> {
        if counts_per_detent <= 0 || !(1..=256).contains(&detents_per_revolution) {
            return Err(ConfigError::InvalidEncoderResolution);
        }
        Ok(Self {
            counts_per_detent,
            detents_per_revolution,
            direction,
        })
    }

    /// Applies the configured [`Direction`] to a raw count.
    pub fn orient(&self, raw: i32) -> i32 {
        match self.direction {
            Direction::Normal => raw,
            Direction::Inverted => raw.wrapping_neg(),
        }
    }

    /// Returns the detent (`0..detents_per_revolution`) a position lands on.
    ///
    /// Floor division and Euclidean remainder keep negative positions in range, e.g., with 4 counts per detent and
    /// 24 detents, a position of -1 is detent 23.
    pub fn detent(&self, position: i32) -> u8 {
        position
            .div_euclid(self.counts_per_detent)
            .rem_euclid(self.detents_per_revolution) as u8
    }
}

impl Default for EncoderConfig {
    /// A 24 detent, 4x quadrature encoder (e.g., Bourns PEC11R) wired with its phases reversed.
    fn default() -> Self {
        Self {
            counts_per_detent: 4,
            detents_per_revolution: 24,
            direction: Direction::Inverted,
        }
    }
}
