//! Configuration loading and parsing.
//!
//! Parses `kestrel.toml` (or an override path provided by the binary). Every
//! field is optional and unknown fields are ignored so older files keep
//! loading. Missing files and parse errors fall back to defaults. Values that
//! would break editing (a zero shiftwidth, zero undo depth) are clamped and the
//! clamp is logged on the `config` target.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_shiftwidth")]
    pub shiftwidth: usize,
    #[serde(default = "EditorConfig::default_expandtab")]
    pub expandtab: bool,
    #[serde(default)]
    pub autoindent: bool,
    #[serde(default = "EditorConfig::default_normalize_line_endings")]
    pub normalize_line_endings: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            shiftwidth: Self::default_shiftwidth(),
            expandtab: Self::default_expandtab(),
            autoindent: false,
            normalize_line_endings: Self::default_normalize_line_endings(),
        }
    }
}

impl EditorConfig {
    const fn default_shiftwidth() -> usize {
        4
    }
    const fn default_expandtab() -> bool {
        true
    }
    const fn default_normalize_line_endings() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct UndoConfig {
    #[serde(default = "UndoConfig::default_max_groups")]
    pub max_groups: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_groups: Self::default_max_groups(),
        }
    }
}

impl UndoConfig {
    const fn default_max_groups() -> usize {
        1000
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub undo: UndoConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data, clamped
    pub source: Option<PathBuf>,
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("kestrel.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("kestrel").join("kestrel.toml");
    }
    PathBuf::from("kestrel.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            let mut cfg = Config {
                raw: Some(content),
                file,
                source: Some(path),
            };
            cfg.clamp();
            Ok(cfg)
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

/// Parse configuration text directly (tests, embedded defaults).
pub fn from_toml_str(content: &str) -> Result<Config> {
    let file = toml::from_str::<ConfigFile>(content)?;
    let mut cfg = Config {
        raw: Some(content.to_string()),
        file,
        source: None,
    };
    cfg.clamp();
    Ok(cfg)
}

impl Config {
    fn clamp(&mut self) {
        let sw = self.file.editor.shiftwidth;
        if sw == 0 {
            self.file.editor.shiftwidth = 1;
            info!(target: "config", raw = sw, effective = 1, "shiftwidth_clamped");
        }
        let depth = self.file.undo.max_groups;
        if depth == 0 {
            self.file.undo.max_groups = 1;
            info!(target: "config", raw = depth, effective = 1, "undo_max_groups_clamped");
        }
    }

    pub fn editor(&self) -> &EditorConfig {
        &self.file.editor
    }

    pub fn undo(&self) -> &UndoConfig {
        &self.file.undo
    }
}
