use anyhow::{Context, Result};
use log::warn;
use reflex_core::Difficulty;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SETTINGS_FILE: &str = "settings.json";
const DEFAULT_DATA_DIR: &str = ".reflex";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    #[serde(default = "default_version")]
    version: u32,

    /// Used by color and dual when `play` names no difficulty.
    #[serde(default)]
    pub difficulty: Difficulty,

    /// Event loop poll interval.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_version() -> u32 {
    1
}
fn default_tick_ms() -> u64 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: default_version(),
            difficulty: Difficulty::default(),
            tick_ms: default_tick_ms(),
        }
    }
}

impl Settings {
    /// Reads `settings.json` from `data_dir`, falling back to (and writing)
    /// the defaults when it is missing or unreadable.
    pub fn load(data_dir: &Path) -> Self {
        let path = Self::settings_path(data_dir);
        if let Ok(contents) = fs::read_to_string(&path) {
            match serde_json::from_str::<Settings>(&contents) {
                Ok(mut settings) => {
                    settings.migrate();
                    return settings;
                }
                Err(e) => warn!(target: "app", "Ignoring unreadable {}: {}", path.display(), e),
            }
        }
        let default = Settings::default();
        if let Err(e) = default.save(data_dir) {
            warn!(target: "app", "Could not write default settings: {:#}", e);
        }
        default
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;
        let path = Self::settings_path(data_dir);
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
    }

    fn settings_path(data_dir: &Path) -> PathBuf {
        data_dir.join(SETTINGS_FILE)
    }

    fn migrate(&mut self) {
        if self.version == 0 {
            self.version = 1;
        }
        if self.tick_ms == 0 {
            self.tick_ms = default_tick_ms();
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn data_dir() -> PathBuf {
        std::env::var("REFLEX_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn is_debug_mode() -> bool {
        std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false)
    }

    pub fn seed_from_env() -> Option<u64> {
        std::env::var("SEED").ok().and_then(|v| v.parse::<u64>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflex_testkit::UsingDataDir;
    use test_context::test_context;

    #[test_context(UsingDataDir)]
    #[test]
    fn test_defaults_written_on_first_load(ctx: &mut UsingDataDir) {
        let settings = Settings::load(&ctx.dir);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.tick(), Duration::from_millis(10));
        assert!(ctx.dir.join(SETTINGS_FILE).exists());
    }

    #[test_context(UsingDataDir)]
    #[test]
    fn test_missing_fields_take_defaults(ctx: &mut UsingDataDir) {
        fs::create_dir_all(&ctx.dir).unwrap();
        fs::write(ctx.dir.join(SETTINGS_FILE), r#"{"difficulty":"hard"}"#).unwrap();
        let settings = Settings::load(&ctx.dir);
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert_eq!(settings.tick_ms, 10);
        assert_eq!(settings.version, 1);
    }

    #[test_context(UsingDataDir)]
    #[test]
    fn test_migrate_old_version(ctx: &mut UsingDataDir) {
        fs::create_dir_all(&ctx.dir).unwrap();
        fs::write(ctx.dir.join(SETTINGS_FILE), r#"{"version":0,"tick_ms":0}"#).unwrap();
        let settings = Settings::load(&ctx.dir);
        assert_eq!(settings.version, 1);
        assert_eq!(settings.tick_ms, 10);
    }

    #[test_context(UsingDataDir)]
    #[test]
    fn test_save_round_trip(ctx: &mut UsingDataDir) {
        let settings = Settings {
            difficulty: Difficulty::Medium,
            tick_ms: 5,
            ..Settings::default()
        };
        settings.save(&ctx.dir).unwrap();
        assert_eq!(Settings::load(&ctx.dir), settings);
    }

    #[test_context(UsingDataDir)]
    #[test]
    fn test_corrupt_file_falls_back(ctx: &mut UsingDataDir) {
        fs::create_dir_all(&ctx.dir).unwrap();
        fs::write(ctx.dir.join(SETTINGS_FILE), "{{{").unwrap();
        assert_eq!(Settings::load(&ctx.dir), Settings::default());
    }
}
