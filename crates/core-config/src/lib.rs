//! Configuration loading and parsing.
//!
//! Parses `oxmodal.toml` (or an override path provided by the binary) into a
//! `ConfigFile`. Every section is optional and every field has a default, so
//! an absent file and an empty file behave the same. Unknown fields are
//! ignored to allow forward evolution without immediate warnings.
//!
//! After parsing, `Config::effective` clamps values into the ranges the
//! engine accepts. Each clamp is reported once on the `config` target.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, io, path::PathBuf};
use tracing::{info, warn};

/// Largest count prefix the accumulator will build (vi caps near 1e6 too).
pub const MAX_COUNT_CEILING: u32 = 999_999;
/// Upper bound for one indent unit.
pub const SHIFT_WIDTH_CEILING: usize = 32;
/// Upper bound for retained undo groups.
pub const HISTORY_MAX_CEILING: usize = 10_000;

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "InputConfig::default_max_count")]
    pub max_count: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_count: Self::default_max_count(),
        }
    }
}

impl InputConfig {
    const fn default_max_count() -> u32 {
        MAX_COUNT_CEILING
    }
}

/// Extra keyword characters for word motions and word objects, in addition
/// to alphanumerics and `_` (vi's `iskeyword`).
#[derive(Debug, Deserialize, Default, Clone)]
pub struct WordsConfig {
    #[serde(default)]
    pub extra_word_chars: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditConfig {
    #[serde(default = "EditConfig::default_shift_width")]
    pub shift_width: usize,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            shift_width: Self::default_shift_width(),
        }
    }
}

impl EditConfig {
    const fn default_shift_width() -> usize {
        4
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UndoConfig {
    #[serde(default = "UndoConfig::default_history_max")]
    pub history_max: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            history_max: Self::default_history_max(),
        }
    }
}

impl UndoConfig {
    const fn default_history_max() -> usize {
        200
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub words: WordsConfig,
    #[serde(default)]
    pub edit: EditConfig,
    #[serde(default)]
    pub undo: UndoConfig,
}

/// Clamped settings handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub max_count: u32,
    pub extra_word_chars: Vec<char>,
    pub shift_width: usize,
    pub history_max: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Config::default().effective()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub source: Option<PathBuf>,
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    // A local `oxmodal.toml` wins over the platform config dir.
    let local = PathBuf::from("oxmodal.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("oxmodal").join("oxmodal.toml");
    }
    // Final fallback relative filename.
    PathBuf::from("oxmodal.toml")
}

/// Load configuration. A missing file yields defaults; a malformed file
/// yields defaults plus a warning. Only I/O failures other than "not found"
/// are errors.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(target: "config", path = %path.display(), "config_absent_using_defaults");
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading config {}", path.display()));
        }
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                file,
                source: Some(path),
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Settings clamped to what the engine accepts.
    pub fn effective(&self) -> EngineSettings {
        let raw_count = self.file.input.max_count;
        let max_count = raw_count.clamp(1, MAX_COUNT_CEILING);
        if max_count != raw_count {
            info!(target: "config", raw = raw_count, clamped = max_count, "max_count_clamped");
        }

        let raw_sw = self.file.edit.shift_width;
        let shift_width = raw_sw.clamp(1, SHIFT_WIDTH_CEILING);
        if shift_width != raw_sw {
            info!(target: "config", raw = raw_sw, clamped = shift_width, "shift_width_clamped");
        }

        let raw_hist = self.file.undo.history_max;
        let history_max = raw_hist.clamp(1, HISTORY_MAX_CEILING);
        if history_max != raw_hist {
            info!(target: "config", raw = raw_hist, clamped = history_max, "history_max_clamped");
        }

        let mut extra_word_chars = Vec::new();
        for c in self.file.words.extra_word_chars.chars() {
            if c.is_whitespace() {
                info!(target: "config", ?c, "extra_word_char_ignored");
                continue;
            }
            if !extra_word_chars.contains(&c) {
                extra_word_chars.push(c);
            }
        }

        EngineSettings {
            max_count,
            extra_word_chars,
            shift_width,
            history_max,
        }
    }
}
