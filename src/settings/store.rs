// Settings persistence module
// Saves the promotion record and the installed version to a TOML state file

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::PromotionConfig;
use crate::error::PromoResult;
use crate::logger;

/// Configuration store handed to the route resolver and both handlers
///
/// `update` runs read-modify-write under a single lock so concurrent
/// requests never lose each other's changes.
pub trait SettingsStore: Send + Sync {
    /// Current record, defaults when nothing was stored yet
    fn get(&self) -> PromotionConfig;

    /// Replace the whole record
    fn set(&self, config: &PromotionConfig) -> PromoResult<()>;

    /// Mutate the record atomically and return the stored result
    fn update(&self, apply: &mut dyn FnMut(&mut PromotionConfig)) -> PromoResult<PromotionConfig>;

    /// Whether a record has ever been stored
    fn is_initialized(&self) -> bool;

    fn installed_version(&self) -> Option<String>;

    fn set_installed_version(&self, version: &str) -> PromoResult<()>;
}

pub type SharedSettingsStore = Arc<dyn SettingsStore>;

/// On-disk layout of the state file
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
struct PersistentState {
    /// Version that last ran the install steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    installed_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    promotion: Option<PromotionConfig>,
}

/// State file backed store
pub struct TomlSettingsStore {
    /// Path to state file
    state_path: PathBuf,
    /// Current state (cached in memory)
    state: Mutex<PersistentState>,
}

impl TomlSettingsStore {
    pub fn open(state_path: impl Into<PathBuf>) -> Self {
        let state_path = state_path.into();
        let state = Self::load_state(&state_path).unwrap_or_default();
        Self {
            state_path,
            state: Mutex::new(state),
        }
    }

    /// Load state from file
    fn load_state(path: &Path) -> Option<PersistentState> {
        if !path.exists() {
            return None;
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(state) => {
                    logger::log_info(&format!("Loaded settings from {}", path.display()));
                    Some(state)
                }
                Err(e) => {
                    logger::log_error(&format!(
                        "Failed to parse state file {}: {e}",
                        path.display()
                    ));
                    None
                }
            },
            Err(e) => {
                logger::log_error(&format!(
                    "Failed to read state file {}: {e}",
                    path.display()
                ));
                None
            }
        }
    }

    /// Write the given state to disk
    fn save_state(&self, state: &PersistentState) -> PromoResult<()> {
        let content = toml::to_string_pretty(state)?;

        if let Some(parent) = self.state_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write-then-rename so a crash never leaves a truncated record
        let tmp_path = self.state_path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.state_path)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, PersistentState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Get state file path
    #[allow(clippy::missing_const_for_fn)]
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }
}

impl SettingsStore for TomlSettingsStore {
    fn get(&self) -> PromotionConfig {
        self.lock().promotion.clone().unwrap_or_default()
    }

    fn set(&self, config: &PromotionConfig) -> PromoResult<()> {
        let mut state = self.lock();
        let mut next = state.clone();
        next.promotion = Some(config.clone());
        self.save_state(&next)?;
        *state = next;
        drop(state);
        Ok(())
    }

    fn update(&self, apply: &mut dyn FnMut(&mut PromotionConfig)) -> PromoResult<PromotionConfig> {
        let mut state = self.lock();
        let mut next = state.clone();
        let mut record = next.promotion.take().unwrap_or_default();
        apply(&mut record);
        next.promotion = Some(record.clone());
        self.save_state(&next)?;
        *state = next;
        drop(state);
        Ok(record)
    }

    fn is_initialized(&self) -> bool {
        self.lock().promotion.is_some()
    }

    fn installed_version(&self) -> Option<String> {
        self.lock().installed_version.clone()
    }

    fn set_installed_version(&self, version: &str) -> PromoResult<()> {
        let mut state = self.lock();
        let mut next = state.clone();
        next.installed_version = Some(version.to_string());
        self.save_state(&next)?;
        *state = next;
        drop(state);
        Ok(())
    }
}

/// In-process store without persistence
#[cfg(test)]
#[derive(Default)]
pub struct MemorySettingsStore {
    state: Mutex<PersistentState>,
}

#[cfg(test)]
impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PromotionConfig) -> Self {
        Self {
            state: Mutex::new(PersistentState {
                installed_version: None,
                promotion: Some(config),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PersistentState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
impl SettingsStore for MemorySettingsStore {
    fn get(&self) -> PromotionConfig {
        self.lock().promotion.clone().unwrap_or_default()
    }

    fn set(&self, config: &PromotionConfig) -> PromoResult<()> {
        self.lock().promotion = Some(config.clone());
        Ok(())
    }

    fn update(&self, apply: &mut dyn FnMut(&mut PromotionConfig)) -> PromoResult<PromotionConfig> {
        let mut state = self.lock();
        let record = state.promotion.get_or_insert_with(PromotionConfig::default);
        apply(record);
        Ok(record.clone())
    }

    fn is_initialized(&self) -> bool {
        self.lock().promotion.is_some()
    }

    fn installed_version(&self) -> Option<String> {
        self.lock().installed_version.clone()
    }

    fn set_installed_version(&self, version: &str) -> PromoResult<()> {
        self.lock().installed_version = Some(version.to_string());
        Ok(())
    }
}
