#![forbid(unsafe_code)]

//! Selector configuration.
//!
//! Only a handful of scalars reach the selector from the host's settings:
//! how long transitions take and whether bells ring. The remaining fields
//! are interaction constants with sensible defaults.

use std::time::Duration;

use crate::error::SelectorError;

/// Tunables consumed by [`Selector`](crate::Selector).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SelectorConfig {
    /// Duration of selection and zoom transitions.
    /// Default: 500ms
    #[cfg_attr(feature = "serde", serde(with = "secs"))]
    pub transition: Duration,

    /// Whether bells ring. When `false`, entries added with a bell also get
    /// the [`Cue::BellRing`](crate::Cue::BellRing) cue.
    /// Default: true
    pub bell_rings: bool,

    /// Largest press-to-release travel, per axis, still treated as a tap.
    /// Default: 40px
    pub tap_tolerance: u32,

    /// Transition length used when hovering pans the grid.
    /// Default: 500ms
    #[cfg_attr(feature = "serde", serde(with = "secs"))]
    pub hover_pan_duration: Duration,

    /// Navigation commands closer together than this zoom the grid out, and
    /// the zoom is restored this long after the last one.
    /// Default: 500ms
    #[cfg_attr(feature = "serde", serde(with = "secs"))]
    pub autozoom_window: Duration,

    /// Zoom multiplier applied on each rapid navigation command.
    /// Default: 0.9
    pub autozoom_factor: f64,

    /// Label shown for content that reports no title.
    /// Default: "Terminal"
    pub default_label: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            transition: Duration::from_millis(500),
            bell_rings: true,
            tap_tolerance: 40,
            hover_pan_duration: Duration::from_millis(500),
            autozoom_window: Duration::from_millis(500),
            autozoom_factor: 0.9,
            default_label: "Terminal".to_string(),
        }
    }
}

impl SelectorConfig {
    /// Set the transition duration.
    #[must_use]
    pub fn transition(mut self, duration: Duration) -> Self {
        self.transition = duration;
        self
    }

    /// Set whether bells ring.
    #[must_use]
    pub fn bell_rings(mut self, rings: bool) -> Self {
        self.bell_rings = rings;
        self
    }

    /// Set the tap tolerance in pixels.
    #[must_use]
    pub fn tap_tolerance(mut self, pixels: u32) -> Self {
        self.tap_tolerance = pixels;
        self
    }

    /// Set the hover-pan transition length.
    #[must_use]
    pub fn hover_pan_duration(mut self, duration: Duration) -> Self {
        self.hover_pan_duration = duration;
        self
    }

    /// Set the autozoom debounce window.
    #[must_use]
    pub fn autozoom_window(mut self, window: Duration) -> Self {
        self.autozoom_window = window;
        self
    }

    /// Set the autozoom multiplier.
    #[must_use]
    pub fn autozoom_factor(mut self, factor: f64) -> Self {
        self.autozoom_factor = factor;
        self
    }

    /// Set the fallback label.
    #[must_use]
    pub fn default_label(mut self, label: impl Into<String>) -> Self {
        self.default_label = label.into();
        self
    }

    /// Check the values the selector cannot work with.
    pub fn validate(&self) -> Result<(), SelectorError> {
        if self.autozoom_window.is_zero() {
            return Err(SelectorError::InvalidConfig("autozoom window must be nonzero"));
        }
        if !self.autozoom_factor.is_finite() || self.autozoom_factor <= 0.0 {
            return Err(SelectorError::InvalidConfig(
                "autozoom factor must be finite and positive",
            ));
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
