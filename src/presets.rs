use crate::error::{PercolationError, Result};
use crate::settings::{clamp_probability, clamp_size};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Site percolation threshold on the square lattice
pub const CRITICAL_PROBABILITY: f64 = 0.5927;

/// A named lattice size and occupation probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub size: usize,
    pub probability: f64,
}

impl Preset {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        size: usize,
        probability: f64,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            size: clamp_size(size as i64),
            probability: clamp_probability(probability),
        }
    }
}

/// Manager for loading and saving presets
pub struct PresetManager {
    /// Built-in presets that ship with the app
    pub builtin: Vec<Preset>,
    /// User-created presets loaded from disk
    pub user: Vec<Preset>,
    dir: Option<PathBuf>,
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetManager {
    /// Built-ins plus user presets from the config directory
    pub fn new() -> Self {
        Self::with_dir(Self::presets_dir())
    }

    /// Built-ins plus user presets from an explicit directory
    pub fn with_dir(dir: Option<PathBuf>) -> Self {
        let mut manager = Self {
            builtin: Self::builtin_presets(),
            user: Vec::new(),
            dir,
        };
        manager.load_user_presets();
        manager
    }

    fn builtin_presets() -> Vec<Preset> {
        vec![
            Preset::new("Sparse", "Mostly isolated sites", 30, 0.30),
            Preset::new("Subcritical", "Many small clusters", 30, 0.50),
            Preset::new(
                "Critical",
                "At the square-lattice threshold",
                50,
                CRITICAL_PROBABILITY,
            ),
            Preset::new("Supercritical", "A dominant spanning cluster", 30, 0.70),
            Preset::new("Dense", "Nearly every site occupied", 30, 0.85),
        ]
    }

    /// Get the presets directory path
    fn presets_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("site-percolation").join("presets"))
    }

    /// Load user presets from disk, skipping unreadable files
    fn load_user_presets(&mut self) {
        let Some(dir) = self.dir.as_deref() else {
            return;
        };
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            match Self::read_preset(&path) {
                Ok(preset) => self.user.push(preset),
                Err(err) => tracing::warn!(path = %path.display(), %err, "skipping preset"),
            }
        }
        tracing::debug!(count = self.user.len(), "loaded user presets");
    }

    fn read_preset(path: &Path) -> Result<Preset> {
        let content = fs::read_to_string(path)?;
        let preset: Preset = serde_json::from_str(&content)?;
        Ok(Preset::new(
            preset.name,
            preset.description,
            preset.size,
            preset.probability,
        ))
    }

    fn file_name(name: &str) -> String {
        let stem = name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect::<String>();
        format!("{}.json", stem)
    }

    /// Save a preset to disk, replacing any user preset with the same name.
    /// Built-in names are reserved, and a file holding a different preset is
    /// never overwritten.
    pub fn save_preset(&mut self, preset: Preset) -> Result<()> {
        if self
            .builtin
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(&preset.name))
        {
            return Err(PercolationError::ReservedPresetName(preset.name));
        }

        let dir = self.dir.as_ref().ok_or(PercolationError::NoConfigDir)?;
        let path = dir.join(Self::file_name(&preset.name));
        if path.exists() {
            // Unreadable files are replaced
            if let Ok(existing) = Self::read_preset(&path) {
                if existing.name != preset.name {
                    return Err(PercolationError::PresetFileConflict {
                        name: preset.name,
                        existing: existing.name,
                    });
                }
            }
        }

        fs::create_dir_all(dir)?;
        let json = serde_json::to_string_pretty(&preset)?;
        fs::write(&path, json)?;
        tracing::info!(name = %preset.name, path = %path.display(), "saved preset");

        self.user.retain(|p| p.name != preset.name);
        self.user.push(preset);
        Ok(())
    }

    /// Delete a user preset
    pub fn delete_preset(&mut self, name: &str) -> Result<()> {
        let dir = self.dir.as_ref().ok_or(PercolationError::NoConfigDir)?;
        let before = self.user.len();
        self.user.retain(|p| p.name != name);
        let in_list = self.user.len() != before;

        let path = dir.join(Self::file_name(name));
        let on_disk = path.exists();
        if on_disk {
            fs::remove_file(&path)?;
        }

        if !in_list && !on_disk {
            return Err(PercolationError::UnknownPreset(name.to_string()));
        }
        tracing::info!(name, "deleted preset");
        Ok(())
    }

    /// Get all presets (builtin + user)
    pub fn all_presets(&self) -> impl Iterator<Item = &Preset> {
        self.builtin.iter().chain(self.user.iter())
    }

    /// Find a preset by name, case-insensitively
    pub fn find(&self, name: &str) -> Result<&Preset> {
        self.all_presets()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| PercolationError::UnknownPreset(name.to_string()))
    }

    /// Built-in preset by 1-based hotkey slot
    pub fn slot(&self, slot: usize) -> Option<&Preset> {
        slot.checked_sub(1).and_then(|i| self.builtin.get(i))
    }

    /// Get preset names for display
    pub fn preset_names(&self) -> Vec<&str> {
        self.all_presets().map(|p| p.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_presets() {
        let manager = PresetManager::with_dir(None);
        assert_eq!(manager.builtin.len(), 5);
        assert!(manager.user.is_empty());

        let critical = manager.find("critical").unwrap();
        assert_eq!(critical.probability, CRITICAL_PROBABILITY);
        assert_eq!(manager.slot(1).unwrap().name, "Sparse");
        assert!(manager.slot(0).is_none());
        assert!(manager.slot(6).is_none());
    }

    #[test]
    fn test_unknown_preset() {
        let manager = PresetManager::with_dir(None);
        assert!(matches!(
            manager.find("nope"),
            Err(PercolationError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_save_reload_delete() {
        let dir = TempDir::new().unwrap();
        let mut manager = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        manager
            .save_preset(Preset::new("My Lattice", "custom", 12, 0.42))
            .unwrap();
        assert!(dir.path().join("My_Lattice.json").exists());

        let reloaded = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        let preset = reloaded.find("my lattice").unwrap();
        assert_eq!(preset.size, 12);
        assert_eq!(preset.probability, 0.42);
        assert!(reloaded.preset_names().contains(&"My Lattice"));

        manager.delete_preset("My Lattice").unwrap();
        assert!(!dir.path().join("My_Lattice.json").exists());
        assert!(manager.find("My Lattice").is_err());
    }

    #[test]
    fn test_saving_same_name_replaces() {
        let dir = TempDir::new().unwrap();
        let mut manager = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        manager.save_preset(Preset::new("x", "", 10, 0.1)).unwrap();
        manager.save_preset(Preset::new("x", "", 20, 0.2)).unwrap();
        assert_eq!(manager.user.len(), 1);
        assert_eq!(manager.find("x").unwrap().size, 20);
    }

    #[test]
    fn test_builtin_names_are_reserved() {
        let dir = TempDir::new().unwrap();
        let mut manager = PresetManager::with_dir(Some(dir.path().to_path_buf()));

        let result = manager.save_preset(Preset::new("critical", "mine", 7, 0.11));

        assert!(matches!(result, Err(PercolationError::ReservedPresetName(_))));
        assert!(manager.user.is_empty());
        assert!(!dir.path().join("critical.json").exists());
        assert_eq!(manager.find("Critical").unwrap().probability, CRITICAL_PROBABILITY);
    }

    #[test]
    fn test_colliding_file_names_are_refused() {
        let dir = TempDir::new().unwrap();
        let mut manager = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        manager.save_preset(Preset::new("a b", "", 10, 0.1)).unwrap();

        let result = manager.save_preset(Preset::new("a_b", "", 20, 0.2));
        assert!(matches!(
            result,
            Err(PercolationError::PresetFileConflict { .. })
        ));

        let reloaded = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        assert_eq!(reloaded.find("a b").unwrap().size, 10);
        assert!(reloaded.find("a_b").is_err());
        assert_eq!(manager.user.len(), 1);
    }

    #[test]
    fn test_delete_unknown_preset_fails() {
        let dir = TempDir::new().unwrap();
        let mut manager = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        assert!(matches!(
            manager.delete_preset("does not exist"),
            Err(PercolationError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_invalid_preset_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let manager = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        assert!(manager.user.is_empty());
    }

    #[test]
    fn test_preset_values_are_clamped() {
        let preset = Preset::new("big", "", 99, 1.7);
        assert_eq!(preset.size, 50);
        assert_eq!(preset.probability, 1.0);
    }
}
