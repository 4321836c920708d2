//! Capability flags advertised by climate devices.

use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Bitset of climate capabilities, using the host's bit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClimateFeatures(u32);

impl ClimateFeatures {
    pub const TARGET_TEMPERATURE: Self = Self(1);
    pub const TARGET_TEMPERATURE_RANGE: Self = Self(2);
    pub const TARGET_HUMIDITY: Self = Self(4);
    pub const FAN_MODE: Self = Self(8);
    pub const PRESET_MODE: Self = Self(16);
    pub const SWING_MODE: Self = Self(32);
    pub const AUX_HEAT: Self = Self(64);
    pub const TURN_OFF: Self = Self(128);
    pub const TURN_ON: Self = Self(256);

    /// Everything a climate group implements itself. A group never
    /// advertises a capability outside this mask, whatever its members do.
    pub const GROUP_SUPPORTED: Self = Self(
        Self::TARGET_TEMPERATURE.0
            | Self::TARGET_TEMPERATURE_RANGE.0
            | Self::PRESET_MODE.0
            | Self::SWING_MODE.0
            | Self::FAN_MODE.0,
    );

    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Wrap raw bits, keeping unknown ones.
    #[must_use]
    pub const fn from_bits_retain(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ClimateFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ClimateFeatures {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ClimateFeatures {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}
