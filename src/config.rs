//! Engine configuration loaded from `~/.config/irkit/config.ini`.
//!
//! Missing keys fall back to compiled defaults; a commented default file is
//! written on first run so the tunables are discoverable.

use anyhow::{Context, Result};
use configparser::ini::Ini;
use std::fs;
use std::path::{Path, PathBuf};

/// Engine tunables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    // [learn]
    /// Seconds the learner stays armed before failing.
    pub learn_timeout_secs: u64,
    /// Consecutive agreeing frames required (3 commercial, 2 minimum).
    pub frames_required: u8,
    /// Percent window for raw-capture agreement.
    pub raw_tolerance_pct: u32,

    // [receive]
    /// Bounded pulse queue depth between the source and the engine.
    pub queue_capacity: usize,

    // [transmit]
    /// Default emitter duty cycle, percent.
    pub duty_pct: u8,

    // [storage]
    /// Base directory for the file-backed store.
    pub store_dir: PathBuf,
}

impl EngineConfig {
    fn default_for(config_dir: &Path) -> Self {
        Self {
            learn_timeout_secs: 30,
            frames_required: 3,
            raw_tolerance_pct: crate::pulse::RAW_VERIFY_TOLERANCE_PCT,
            queue_capacity: 10,
            duty_pct: 33,
            store_dir: config_dir.join("store"),
        }
    }

    fn load_from_ini(path: &Path, config_dir: &Path) -> Result<Self> {
        let mut ini = Ini::new();
        ini.load(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        let defaults = Self::default_for(config_dir);

        let learn_timeout_secs = ini
            .getuint("learn", "timeout_secs")
            .ok()
            .flatten()
            .unwrap_or(defaults.learn_timeout_secs);

        let frames_required = ini
            .getuint("learn", "frames_required")
            .ok()
            .flatten()
            .map(|v| v as u8)
            .unwrap_or(defaults.frames_required);

        let raw_tolerance_pct = ini
            .getuint("learn", "raw_tolerance_pct")
            .ok()
            .flatten()
            .map(|v| v as u32)
            .unwrap_or(defaults.raw_tolerance_pct);

        let queue_capacity = ini
            .getuint("receive", "queue_capacity")
            .ok()
            .flatten()
            .map(|v| v as usize)
            .unwrap_or(defaults.queue_capacity);

        let duty_pct = ini
            .getuint("transmit", "duty_pct")
            .ok()
            .flatten()
            .map(|v| v as u8)
            .unwrap_or(defaults.duty_pct);

        let store_dir = ini
            .get("storage", "store_dir")
            .map(|s| expand_tilde(&s))
            .unwrap_or(defaults.store_dir);

        Ok(Self {
            learn_timeout_secs,
            frames_required,
            raw_tolerance_pct,
            queue_capacity,
            duty_pct,
            store_dir,
        })
    }

    fn save_to_ini(&self, path: &Path) -> Result<()> {
        let content = format!(
            r#"; irkit engine configuration
; Location: {path}
;
; Lines starting with ; or # are comments.

[learn]
; Seconds the learner stays armed before the fail callback fires.
timeout_secs = {timeout}

; Consecutive agreeing frames before a code is accepted.
; 3 = commercial grade, 2 = minimum.
frames_required = {frames}

; Percent tolerance when comparing two raw captures.
raw_tolerance_pct = {raw_tol}

[receive]
; Depth of the bounded queue between the pulse source and the engine.
; Overflow is recorded on the next accepted code.
queue_capacity = {queue}

[transmit]
; Default carrier duty cycle in percent.
duty_pct = {duty}

[storage]
; Base directory for the file-backed persistent store.
; Supports ~ for home directory.
store_dir = {store_dir}
"#,
            path = path.display(),
            timeout = self.learn_timeout_secs,
            frames = self.frames_required,
            raw_tol = self.raw_tolerance_pct,
            queue = self.queue_capacity,
            duty = self.duty_pct,
            store_dir = self.store_dir.to_string_lossy(),
        );

        fs::write(path, content).with_context(|| format!("Failed to write config to {path:?}"))?;
        Ok(())
    }

    /// Load `config.ini` from the irkit config directory, writing a default
    /// file on first run.
    pub fn load() -> Result<Self> {
        let config_dir = resolve_config_dir()
            .context("Could not determine home directory (is $HOME set?)")?;
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config dir: {config_dir:?}"))?;
            tracing::info!("Created config directory: {:?}", config_dir);
        }

        let config_path = config_dir.join("config.ini");
        let config = if config_path.exists() {
            tracing::info!("Loading config from {:?}", config_path);
            match Self::load_from_ini(&config_path, &config_dir) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse config.ini, using defaults: {}", e);
                    Self::default_for(&config_dir)
                }
            }
        } else {
            tracing::info!("No config.ini found - creating default at {:?}", config_path);
            let config = Self::default_for(&config_dir);
            if let Err(e) = config.save_to_ini(&config_path) {
                tracing::warn!("Could not write default config.ini: {}", e);
            }
            config
        };
        Ok(config)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let fallback = resolve_config_dir().unwrap_or_else(|| PathBuf::from(".").join("irkit"));
        Self::default_for(&fallback)
    }
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(s: &str) -> PathBuf {
    if let Some(rest) = s.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(s)
}

/// `~/.config/irkit/` regardless of OS.
pub fn resolve_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("irkit"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.learn_timeout_secs, 30);
        assert_eq!(cfg.frames_required, 3);
        assert_eq!(cfg.queue_capacity, 10);
        assert_eq!(cfg.duty_pct, 33);
    }

    #[test]
    fn ini_round_trip_preserves_tunables() {
        let dir = std::env::temp_dir().join(format!("irkit-cfg-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.ini");

        let mut cfg = EngineConfig::default_for(&dir);
        cfg.learn_timeout_secs = 12;
        cfg.frames_required = 2;
        cfg.queue_capacity = 4;
        cfg.save_to_ini(&path).unwrap();

        let back = EngineConfig::load_from_ini(&path, &dir).unwrap();
        assert_eq!(back.learn_timeout_secs, 12);
        assert_eq!(back.frames_required, 2);
        assert_eq!(back.queue_capacity, 4);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn tilde_paths_expand() {
        let p = expand_tilde("~/x/y");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(p, home.join("x/y"));
        }
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
    }
}
