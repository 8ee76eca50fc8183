//! Form configuration types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default quiet period before a debounced validation runs.
pub const DEFAULT_VALIDATION_DELAY: Duration = Duration::from_millis(300);

/// Per-form configuration.
///
/// Deserializes from `{ "on_blur": true, "validation_delay_ms": 250 }`; both
/// keys are optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    /// On-blur mode: suppress live validation for fields that have not
    /// failed yet. Blur and submit still validate.
    pub on_blur: bool,

    /// Quiet period for debounced validation.
    #[serde(rename = "validation_delay_ms", with = "millis")]
    pub validation_delay: Duration,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            on_blur: false,
            validation_delay: DEFAULT_VALIDATION_DELAY,
        }
    }
}

impl FormOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch on-blur mode on or off.
    pub fn on_blur(mut self, on_blur: bool) -> Self {
        self.on_blur = on_blur;
        self
    }

    /// Set the debounce delay.
    pub fn validation_delay(mut self, delay: Duration) -> Self {
        self.validation_delay = delay;
        self
    }
}

/// Per-field overrides, given at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    /// Validate live even when the form is in on-blur mode.
    pub override_on_blur: bool,

    /// Route live validation through the debouncer. When false, every
    /// change validates immediately.
    pub use_debounce: bool,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            override_on_blur: false,
            use_debounce: true,
        }
    }
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate live regardless of on-blur mode.
    pub fn override_on_blur(mut self) -> Self {
        self.override_on_blur = true;
        self
    }

    /// Validate on every change without debouncing.
    pub fn immediate(mut self) -> Self {
        self.use_debounce = false;
        self
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(delay: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
