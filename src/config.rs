/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub display: DisplayConfig,
    pub give_up: GiveUpConfig,
    pub puzzles_dir: PathBuf,
    pub solves_dir: PathBuf,
    pub log_file: PathBuf,
    pub log_filter: String,
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub cell_width: u16,   // terminal columns per board cell
    pub cell_height: u16,  // terminal rows per board cell
}

#[derive(Clone, Debug)]
pub struct GiveUpConfig {
    pub after: Duration,
    pub min_records: usize,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    give_up: TomlGiveUp,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_cell_width")]
    cell_width: u16,
    #[serde(default = "default_cell_height")]
    cell_height: u16,
}

#[derive(Deserialize, Debug)]
struct TomlGiveUp {
    #[serde(default = "default_after_secs")]
    after_secs: u64,
    #[serde(default = "default_min_records")]
    min_records: usize,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_puzzles_dir")]
    puzzles_dir: String,
    #[serde(default = "default_solves_dir")]
    solves_dir: String,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_log_filter")]
    log_filter: String,
}

// ── Defaults ──

fn default_cell_width() -> u16 { 6 }
fn default_cell_height() -> u16 { 3 }
fn default_after_secs() -> u64 { 300 }
fn default_min_records() -> usize { 50 }
fn default_puzzles_dir() -> String { "puzzles".into() }
fn default_solves_dir() -> String { "solves".into() }
fn default_log_file() -> String { "gridlock.log".into() }
fn default_log_filter() -> String { "info".into() }

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            cell_width: default_cell_width(),
            cell_height: default_cell_height(),
        }
    }
}

impl Default for TomlGiveUp {
    fn default() -> Self {
        TomlGiveUp {
            after_secs: default_after_secs(),
            min_records: default_min_records(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            puzzles_dir: default_puzzles_dir(),
            solves_dir: default_solves_dir(),
            log_file: default_log_file(),
            log_filter: default_log_filter(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) XDG data home. Missing file or missing keys fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::from_toml(toml_cfg, &search_dirs)
    }

    /// Build from config text. Relative paths stay relative to the CWD.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(toml_cfg, &[]))
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let general = toml_cfg.general;
        GameConfig {
            display: DisplayConfig {
                cell_width: toml_cfg.display.cell_width.max(2),
                cell_height: toml_cfg.display.cell_height.max(1),
            },
            give_up: GiveUpConfig {
                after: Duration::from_secs(toml_cfg.give_up.after_secs),
                min_records: toml_cfg.give_up.min_records,
            },
            puzzles_dir: resolve_dir(&general.puzzles_dir, search_dirs),
            solves_dir: PathBuf::from(general.solves_dir),
            log_file: PathBuf::from(general.log_file),
            log_filter: general.log_filter,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), &[])
    }
}

/// Absolute paths are used as-is; relative ones are looked up in the
/// candidate dirs, defaulting to CWD-relative.
fn resolve_dir(name: &str, search_dirs: &[PathBuf]) -> PathBuf {
    if Path::new(name).is_absolute() {
        return PathBuf::from(name);
    }
    search_dirs.iter()
        .map(|d| d.join(name))
        .find(|p| p.is_dir())
        .unwrap_or_else(|| PathBuf::from(name))
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/gridlock)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/gridlock");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
