//! Temperature unit of a climate group.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Interpret a free-form configuration value.
    ///
    /// Anything containing a `c` (any case) is Celsius, everything else is
    /// Fahrenheit: `"°C"`, `"celsius"`, `"C"` all select Celsius.
    #[must_use]
    pub fn from_config_value(value: &str) -> Self {
        if value.to_lowercase().contains('c') {
            Self::Celsius
        } else {
            Self::Fahrenheit
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "\u{b0}C",
            Self::Fahrenheit => "\u{b0}F",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
