//! Wall configuration parsed from environment variables.
//!
//! Numeric tunables fall back to their defaults when absent or unparsable.
//! Values whose misreading would change behaviour silently (`WALL_DEVICE`,
//! a zero frame interval) are strict and fail with [`ConfigError`].

use std::str::FromStr;
use std::time::Duration;

use canvas::camera::ScreenSize;
use canvas::consts::{
    CANVAS_SIZE, CLICK_DELAY_MS, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, NOTES_PATH, UNDO_GRACE_MS,
};
use canvas::engine::EngineSettings;
use canvas::input::DeviceClass;

pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WallConfig {
    pub notes_path: String,
    pub canvas_size: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub frame_interval_ms: u64,
    pub undo_grace_ms: u64,
    pub click_delay_ms: u64,
    pub device: DeviceClass,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            notes_path: NOTES_PATH.to_owned(),
            canvas_size: CANVAS_SIZE,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            undo_grace_ms: UNDO_GRACE_MS,
            click_delay_ms: CLICK_DELAY_MS,
            device: DeviceClass::default(),
        }
    }
}

impl WallConfig {
    /// Build config from the process environment.
    ///
    /// Optional:
    /// - `WALL_NOTES_PATH`: default `notes`
    /// - `WALL_CANVAS_SIZE`: default 5000
    /// - `WALL_VIEWPORT_WIDTH` / `WALL_VIEWPORT_HEIGHT`: default 1280 × 800
    /// - `WALL_FRAME_INTERVAL_MS`: default 16, must be at least 1
    /// - `WALL_UNDO_GRACE_MS`: default 3000
    /// - `WALL_CLICK_DELAY_MS`: default 200
    /// - `WALL_DEVICE`: `hover` (default) or `touch`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unknown device class or a zero
    /// frame interval.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`WallConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let parse = |key: &str, default| lookup_parse(&lookup, key, default);

        let device = match lookup("WALL_DEVICE") {
            None => defaults.device,
            Some(raw) => DeviceClass::parse(&raw).ok_or(ConfigError::Invalid { key: "WALL_DEVICE", value: raw })?,
        };
        let frame_interval_ms = lookup_parse(&lookup, "WALL_FRAME_INTERVAL_MS", defaults.frame_interval_ms);
        if frame_interval_ms == 0 {
            return Err(ConfigError::Invalid { key: "WALL_FRAME_INTERVAL_MS", value: "0".into() });
        }

        Ok(Self {
            notes_path: lookup("WALL_NOTES_PATH").unwrap_or(defaults.notes_path),
            canvas_size: parse("WALL_CANVAS_SIZE", defaults.canvas_size),
            viewport_width: parse("WALL_VIEWPORT_WIDTH", defaults.viewport_width),
            viewport_height: parse("WALL_VIEWPORT_HEIGHT", defaults.viewport_height),
            frame_interval_ms,
            undo_grace_ms: lookup_parse(&lookup, "WALL_UNDO_GRACE_MS", defaults.undo_grace_ms),
            click_delay_ms: lookup_parse(&lookup, "WALL_CLICK_DELAY_MS", defaults.click_delay_ms),
            device,
        })
    }

    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Engine tunables for this wall.
    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            canvas_size: self.canvas_size,
            screen: ScreenSize::new(self.viewport_width, self.viewport_height),
            click_delay: Duration::from_millis(self.click_delay_ms),
            undo_grace: Duration::from_millis(self.undo_grace_ms),
            device: self.device,
            notes_path: self.notes_path.clone(),
        }
    }
}

fn lookup_parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key).and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
