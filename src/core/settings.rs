//! Persisted converter settings
//!
//! Stored as pretty JSON at `<config dir>/pcmconv/settings.json`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Output sample rate in Hz. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SampleRate(u32);

impl SampleRate {
    /// Rates offered by default: CD and DVD/broadcast audio
    pub const PRESETS: [SampleRate; 2] = [SampleRate(44100), SampleRate(48000)];

    pub const DEFAULT: SampleRate = SampleRate(48000);

    pub fn new(hz: u32) -> Result<Self, String> {
        if hz == 0 {
            return Err("Sample rate must be greater than zero".to_string());
        }
        Ok(Self(hz))
    }

    pub fn hz(self) -> u32 {
        self.0
    }

    pub fn is_preset(self) -> bool {
        Self::PRESETS.contains(&self)
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for SampleRate {
    type Error = String;

    fn try_from(hz: u32) -> Result<Self, Self::Error> {
        Self::new(hz)
    }
}

impl From<SampleRate> for u32 {
    fn from(rate: SampleRate) -> Self {
        rate.0
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

impl std::str::FromStr for SampleRate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hz: u32 = s
            .trim()
            .parse()
            .map_err(|_| format!("Invalid sample rate: {}", s))?;
        Self::new(hz)
    }
}

/// Converter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Output sample rate
    #[serde(default)]
    pub sample_rate: SampleRate,
    /// Directory receiving converted files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Files converted at once; 1 runs the batch sequentially
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

fn default_output_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
}

fn default_jobs() -> usize {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_rate: SampleRate::default(),
            output_dir: default_output_dir(),
            jobs: default_jobs(),
        }
    }
}

impl Settings {
    const SETTINGS_FILE: &'static str = "settings.json";

    /// Get the config directory (`<config dir>/pcmconv/`)
    fn get_config_dir() -> Result<PathBuf, String> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| "Could not determine config directory".to_string())?;
        Ok(config_dir.join("pcmconv"))
    }

    /// Location of the settings file
    pub fn settings_path() -> Result<PathBuf, String> {
        Ok(Self::get_config_dir()?.join(Self::SETTINGS_FILE))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        match Self::settings_path().and_then(|path| Self::try_load(&path)) {
            Ok(settings) => {
                log::debug!("Loaded settings from disk");
                settings
            }
            Err(e) => {
                log::debug!("Using default settings: {}", e);
                Self::default()
            }
        }
    }

    fn try_load(settings_path: &Path) -> Result<Self, String> {
        if !settings_path.exists() {
            return Err("Settings file not found".to_string());
        }

        let contents = std::fs::read_to_string(settings_path)
            .map_err(|e| format!("Failed to read settings: {}", e))?;

        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse settings: {}", e))
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<PathBuf, String> {
        let settings_path = Self::settings_path()?;
        self.save_to(&settings_path)?;
        Ok(settings_path)
    }

    fn save_to(&self, settings_path: &Path) -> Result<(), String> {
        if let Some(dir) = settings_path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        std::fs::write(settings_path, json)
            .map_err(|e| format!("Failed to write settings: {}", e))?;

        log::debug!("Saved settings to {:?}", settings_path);
        Ok(())
    }
}
