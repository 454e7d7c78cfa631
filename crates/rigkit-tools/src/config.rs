//! Tool configuration persisted as RON

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Naming conventions the tools read and write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub deform_prefix: String,
    pub mechanism_prefix: String,
    pub control_prefix: String,
    /// Older control prefix still recognised by the auditor
    pub alt_control_prefix: String,
    pub deform_group: String,
    pub mechanism_group: String,
    pub control_group: String,
    /// Group new joints land in when nobody organised them
    pub default_group: String,
    pub driver_group: String,
    pub ik_suffix: String,
    pub ik_pole_suffix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            deform_prefix: "DEF_".into(),
            mechanism_prefix: "MCH_".into(),
            control_prefix: "CTRL_".into(),
            alt_control_prefix: "CTL_".into(),
            deform_group: "DEF".into(),
            mechanism_group: "MCH".into(),
            control_group: "CTRL".into(),
            default_group: "Bones".into(),
            driver_group: "CTL".into(),
            ik_suffix: "_IK".into(),
            ik_pole_suffix: "_IKPOLE".into(),
        }
    }
}

impl NamingConfig {
    pub fn is_control(&self, name: &str) -> bool {
        name.starts_with(&self.control_prefix) || name.starts_with(&self.alt_control_prefix)
    }

    pub fn is_deform(&self, name: &str) -> bool {
        name.starts_with(&self.deform_prefix)
    }

    /// Whether a name follows one of the deform/control/mechanism conventions
    pub fn is_organised(&self, name: &str) -> bool {
        name.starts_with(&self.deform_prefix)
            || name.starts_with(&self.control_prefix)
            || name.starts_with(&self.mechanism_prefix)
    }
}

/// Numeric tolerances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceConfig {
    /// Rotation/scale deviation below which a transform counts as identity
    pub transform_identity: f32,
    /// Vector length below which a projection is unusable
    pub degenerate: f32,
    /// Smallest accepted driver input range
    pub driver_range: f32,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            transform_identity: 1e-4,
            degenerate: 1e-6,
            driver_range: 1e-4,
        }
    }
}

/// Dialog defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub ik_chain_length: u32,
    pub ik_iterations: u32,
    pub armature_bone_count: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            ik_chain_length: 2,
            ik_iterations: 500,
            armature_bone_count: 1,
        }
    }
}

/// All tool settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub naming: NamingConfig,
    pub tolerances: ToleranceConfig,
    pub defaults: DefaultsConfig,
}

/// Owns the active configuration and where it is stored
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    config: ToolConfig,
    path: Option<PathBuf>,
}

impl ConfigManager {
    /// In-memory configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`; a missing file yields defaults bound to that path
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
            ron::from_str(&content).map_err(|e| ConfigError::Deserialize(e.to_string()))?
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            ToolConfig::default()
        };
        Ok(Self {
            config,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ToolConfig {
        &mut self.config
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the configuration back to its file
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self.path.as_ref().ok_or(ConfigError::NoPath)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        let content = ron::ser::to_string_pretty(&self.config, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))?;
        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }
}

pub type SharedConfig = Arc<RwLock<ConfigManager>>;

pub fn create_shared_config(manager: ConfigManager) -> SharedConfig {
    Arc::new(RwLock::new(manager))
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Config has no file path")]
    NoPath,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::load(dir.path().join("rigkit.ron")).unwrap();
        assert_eq!(manager.config(), &ToolConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rigkit.ron");
        let mut manager = ConfigManager::load(&path).unwrap();
        manager.config_mut().naming.driver_group = "Widgets".into();
        manager.config_mut().defaults.armature_bone_count = 4;
        manager.save().unwrap();

        let reloaded = ConfigManager::load(&path).unwrap();
        assert_eq!(reloaded.config().naming.driver_group, "Widgets");
        assert_eq!(reloaded.config().defaults.armature_bone_count, 4);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rigkit.ron");
        std::fs::write(&path, "(naming: (deform_prefix: \"D_\"))").unwrap();
        let manager = ConfigManager::load(&path).unwrap();
        assert_eq!(manager.config().naming.deform_prefix, "D_");
        assert_eq!(manager.config().naming.control_prefix, "CTRL_");
        assert_eq!(manager.config().tolerances, ToleranceConfig::default());
    }

    #[test]
    fn test_in_memory_save_fails() {
        assert!(matches!(ConfigManager::new().save(), Err(ConfigError::NoPath)));
    }

    #[test]
    fn test_naming_predicates() {
        let naming = NamingConfig::default();
        assert!(naming.is_control("CTL_Jaw"));
        assert!(naming.is_control("CTRL_Hand_IK.L"));
        assert!(naming.is_organised("MCH_Twist"));
        assert!(!naming.is_organised("CTL_Jaw"));
        assert!(!naming.is_deform("Bone"));
    }
}
