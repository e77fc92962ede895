//! Persisted user preferences.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::color::Color;

pub const KEY_ENABLED: &str = "background-enabled";
pub const KEY_MODE: &str = "background-mode";
pub const KEY_COLOR: &str = "background-color";
pub const KEY_INTENSITY: &str = "background-intensity";
pub const KEY_POINT_COUNT: &str = "background-point-count";

pub const DEFAULT_INTENSITY: f64 = 1.0;
pub const DEFAULT_POINT_COUNT: usize = 6;

/// Persistent string storage (`localStorage` in the browser).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory store, used when the browser denies storage access and in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Which visual backend the user asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// 3-D scene when the runtime has it registered, fallback otherwise.
    #[default]
    Auto,
    Backend3D,
    Canvas,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Auto => "auto",
            Mode::Backend3D => "backend3d",
            Mode::Canvas => "canvas",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "auto" => Ok(Mode::Auto),
            // older pages stored the scene viewer's name
            "backend3d" | "spline" => Ok(Mode::Backend3D),
            "canvas" => Ok(Mode::Canvas),
            other => Err(format!("unknown background mode {other:?}")),
        }
    }
}

/// Effective preference values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub enabled: bool,
    pub mode: Mode,
    pub color: Color,
    pub intensity: f64,
    pub point_count: usize,
}

/// One field update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Setting {
    Enabled(bool),
    Mode(Mode),
    Color(Color),
    Intensity(f64),
    PointCount(usize),
}

/// Defaults that come from the page rather than from constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageDefaults {
    /// Theme color read once at startup.
    pub color: Color,
    pub reduced_motion: bool,
}

pub struct SettingsStore {
    store: Box<dyn KeyValueStore>,
    defaults: PageDefaults,
    current: Settings,
}

impl SettingsStore {
    /// Read every field once; missing or malformed values take their default.
    pub fn load(store: Box<dyn KeyValueStore>, defaults: PageDefaults) -> Self {
        let enabled = store
            .get(KEY_ENABLED)
            .and_then(|v| v.trim().parse::<bool>().ok())
            .unwrap_or(!defaults.reduced_motion);
        let mode = store
            .get(KEY_MODE)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        let color = store
            .get(KEY_COLOR)
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.color);
        let intensity = store
            .get(KEY_INTENSITY)
            .and_then(|v| parse_intensity(&v))
            .unwrap_or(DEFAULT_INTENSITY);
        let point_count = store
            .get(KEY_POINT_COUNT)
            .and_then(|v| parse_point_count(&v))
            .unwrap_or(DEFAULT_POINT_COUNT);
        Self {
            store,
            defaults,
            current: Settings {
                enabled,
                mode,
                color,
                intensity,
                point_count,
            },
        }
    }

    pub fn get(&self) -> Settings {
        self.current
    }

    pub fn defaults(&self) -> PageDefaults {
        self.defaults
    }

    /// Persist one override and return the new effective settings.
    ///
    /// Intensities that are negative or not finite and a point count of zero
    /// are ignored.
    pub fn set(&mut self, setting: Setting) -> Settings {
        match setting {
            Setting::Enabled(on) => {
                self.current.enabled = on;
                self.store.set(KEY_ENABLED, if on { "true" } else { "false" });
            }
            Setting::Mode(mode) => {
                self.current.mode = mode;
                self.store.set(KEY_MODE, mode.as_str());
            }
            Setting::Color(color) => {
                self.current.color = color;
                self.store.set(KEY_COLOR, &color.to_hex());
            }
            Setting::Intensity(value) => {
                if valid_intensity(value) {
                    self.current.intensity = value;
                    self.store.set(KEY_INTENSITY, &value.to_string());
                } else {
                    log::debug!("ignoring intensity {value}");
                }
            }
            Setting::PointCount(count) => {
                if count > 0 {
                    self.current.point_count = count;
                    self.store.set(KEY_POINT_COUNT, &count.to_string());
                } else {
                    log::debug!("ignoring point count 0");
                }
            }
        }
        self.current
    }

    /// Drop the color, intensity and point-count overrides. `enabled` and
    /// `mode` keep their persisted values.
    pub fn reset(&mut self) -> Settings {
        for key in [KEY_COLOR, KEY_INTENSITY, KEY_POINT_COUNT] {
            self.store.remove(key);
        }
        self.current.color = self.defaults.color;
        self.current.intensity = DEFAULT_INTENSITY;
        self.current.point_count = DEFAULT_POINT_COUNT;
        self.current
    }
}

fn valid_intensity(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

pub fn parse_intensity(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| valid_intensity(*v))
}

pub fn parse_point_count(text: &str) -> Option<usize> {
    text.trim().parse::<usize>().ok().filter(|n| *n > 0)
}
