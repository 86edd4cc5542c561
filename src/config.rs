use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, Result};
use crate::models::{AccountMapping, CategoryMapping};
use crate::taxonomy::Taxonomy;

/// The round-trip configuration document: saved category mappings, account
/// mappings, and the destination category structure. Plain JSON, no schema
/// versioning. The collaborating UI owns this between runs; the pipeline
/// snapshots it per run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationConfig {
    #[serde(default)]
    pub mapping: HashMap<String, CategoryMapping>,
    #[serde(default)]
    pub accounts: HashMap<String, AccountMapping>,
    #[serde(default)]
    pub structure: Taxonomy,
}

pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("cashport")
        .join("config.json")
}

/// Load the configuration, falling back to the defaults (stock taxonomy,
/// empty mappings) when the file is absent or unreadable.
pub fn load_config(path: &Path) -> MigrationConfig {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        MigrationConfig::default()
    }
}

pub fn save_config(path: &Path, config: &MigrationConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| MigrateError::Config(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_stock_structure() {
        let config = MigrationConfig::default();
        assert!(config.mapping.is_empty());
        assert!(config.accounts.is_empty());
        assert!(config.structure.contains("Alimentari"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = MigrationConfig::default();
        config.mapping.insert(
            "Benzina".to_string(),
            CategoryMapping {
                main: "Trasporti".to_string(),
                sub: "Carburante".to_string(),
                color: "#F44336".to_string(),
                icon: "car.png".to_string(),
            },
        );
        config
            .accounts
            .insert("Conto".to_string(), AccountMapping::unchanged("Conto"));
        save_config(&path, &config).unwrap();

        let loaded = load_config(&path);
        assert_eq!(loaded.mapping["Benzina"].sub, "Carburante");
        assert_eq!(loaded.accounts["Conto"].currency, "EUR");
        let names: Vec<&str> = loaded.structure.nodes().iter().map(|n| n.name.as_str()).collect();
        let expected: Vec<&str> = config.structure.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("nope.json"));
        assert!(config.structure.contains("Reddito"));
    }

    #[test]
    fn test_load_merges_partial_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"mapping": {"Cibo": {"main": "Alimentari"}}}"#).unwrap();
        let config = load_config(&path);
        assert_eq!(config.mapping["Cibo"].main, "Alimentari");
        assert_eq!(config.mapping["Cibo"].sub, "");
        assert!(config.structure.contains("Alimentari"));
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("config.json");
        save_config(&path, &MigrationConfig::default()).unwrap();
        assert!(path.exists());
    }
}
