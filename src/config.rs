//! Lifecycle configuration: gate margins/thresholds and the poster fade
//! delay. Every field has a serde default so a partial TOML table works.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LifecycleError;
use crate::host::ObserverOptions;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LifecycleConfig {
    /// Root margin for the section-level gate, in CSS pixels.
    #[serde(default)]
    pub section_margin_px: i32,

    /// Visibility fraction at which a section counts as intersecting.
    #[serde(default = "default_section_threshold")]
    pub section_threshold: f32,

    /// Visibility fraction at which an autoplay-eligible player starts.
    #[serde(default = "default_autoplay_threshold")]
    pub autoplay_threshold: f32,

    /// Root margin for the per-frame load gate, in CSS pixels. Frames start
    /// fetching this far before they scroll into view.
    #[serde(default = "default_frame_load_margin_px")]
    pub frame_load_margin_px: i32,

    /// Delay between the poster going transparent and being removed from
    /// layout, in milliseconds.
    #[serde(default = "default_poster_fade_ms")]
    pub poster_fade_ms: u64,
}

fn default_section_threshold() -> f32 {
    0.1
}

fn default_autoplay_threshold() -> f32 {
    0.5
}

fn default_frame_load_margin_px() -> i32 {
    100
}

fn default_poster_fade_ms() -> u64 {
    300
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            section_margin_px: 0,
            section_threshold: default_section_threshold(),
            autoplay_threshold: default_autoplay_threshold(),
            frame_load_margin_px: default_frame_load_margin_px(),
            poster_fade_ms: default_poster_fade_ms(),
        }
    }
}

impl LifecycleConfig {
    /// Parse a configuration from a TOML document and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self, LifecycleError> {
        let config: Self =
            toml::from_str(content).map_err(|e| LifecycleError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LifecycleError> {
        if !(0.0..=1.0).contains(&self.section_threshold) {
            return Err(LifecycleError::Config(format!(
                "section_threshold must be within 0..=1, got {}",
                self.section_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.autoplay_threshold) {
            return Err(LifecycleError::Config(format!(
                "autoplay_threshold must be within 0..=1, got {}",
                self.autoplay_threshold
            )));
        }
        if self.poster_fade_ms == 0 {
            return Err(LifecycleError::Config(
                "poster_fade_ms must be nonzero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn section_gate(&self) -> ObserverOptions {
        ObserverOptions {
            root_margin_px: self.section_margin_px,
            threshold: self.section_threshold,
        }
    }

    pub fn autoplay_gate(&self) -> ObserverOptions {
        ObserverOptions {
            root_margin_px: 0,
            threshold: self.autoplay_threshold,
        }
    }

    pub fn frame_load_gate(&self) -> ObserverOptions {
        ObserverOptions {
            root_margin_px: self.frame_load_margin_px,
            threshold: 0.0,
        }
    }

    pub fn poster_fade(&self) -> Duration {
        Duration::from_millis(self.poster_fade_ms)
    }
}
