use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::engine::EngineConfig;

/// Parameters of the bundled demo run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DemoSettings {
    pub session_secs: u64,
    pub identities: Vec<String>,
    pub seed: Option<u64>,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            session_secs: 30,
            identities: vec!["alice".into(), "bob".into()],
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub engine: EngineConfig,
    /// SQLite file; `None` keeps everything in memory.
    pub database_path: Option<PathBuf>,
    pub demo: DemoSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            database_path: Some(PathBuf::from("moodlog.sqlite3")),
            demo: DemoSettings::default(),
        }
    }
}

impl AppSettings {
    /// Applies `MOODLOG_HOLD_MS` and `MOODLOG_CYCLE_DELAY_MS` when they parse.
    pub fn apply_env_overrides(&mut self) {
        apply_u64_override("MOODLOG_HOLD_MS", &mut self.engine.hold_ms);
        apply_u64_override("MOODLOG_CYCLE_DELAY_MS", &mut self.engine.cycle_delay_ms);
    }
}

/// `MOODLOG_DEBUG=1|true` turns on per-cycle heartbeats and debug logging.
pub fn debug_mode_enabled() -> bool {
    std::env::var("MOODLOG_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn apply_u64_override(var: &str, target: &mut u64) {
    let Ok(raw) = std::env::var(var) else {
        return;
    };
    match raw.trim().parse::<u64>() {
        Ok(value) => *target = value,
        Err(_) => warn!("ignoring {var}={raw:?}: not a non-negative integer"),
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<AppSettings>,
}

impl SettingsStore {
    /// Loads settings from `path`. A missing file yields defaults; an unreadable
    /// one yields defaults with a warning.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "Malformed settings in {} ({err}); using defaults",
                    path.display()
                );
                AppSettings::default()
            })
        } else {
            AppSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn settings(&self) -> AppSettings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update_engine(&self, engine: EngineConfig) -> Result<()> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.engine = engine;
        self.persist(&guard)
    }

    fn persist(&self, data: &AppSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
