// Configuration management
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use crate::types::{DeviceId, GroupId, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default = "default_hub_name")]
    pub hub_name: String,
    /// Devices registered at startup before any sensor connects
    #[serde(default)]
    pub seed_devices: Vec<SeedDevice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedDevice {
    pub group: GroupId,
    pub device: DeviceId,
    /// Reading recorded right after registration, if set
    #[serde(default)]
    pub initial_reading: Option<f64>,
}

fn default_hub_name() -> String {
    "telehub".to_string()
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            hub_name: default_hub_name(),
            seed_devices: Vec::new(),
        }
    }
}

impl HubConfig {
    /// Load configuration from a TOML file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).await?;
        let config: HubConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Error;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = HubConfig::default();
        assert_eq!(config.hub_name, "telehub");
        assert!(config.seed_devices.is_empty());
    }

    #[test]
    fn test_parse() {
        let config: HubConfig = toml::from_str(
            r#"
hub_name = "plant-floor"

[[seed_devices]]
group = "boilers"
device = "boiler-1"
initial_reading = 58.5

[[seed_devices]]
group = "boilers"
device = "boiler-2"
"#,
        )
        .unwrap();

        assert_eq!(config.hub_name, "plant-floor");
        assert_eq!(config.seed_devices.len(), 2);
        assert_eq!(config.seed_devices[0].group, GroupId::from("boilers"));
        assert_eq!(config.seed_devices[0].initial_reading, Some(58.5));
        assert_eq!(config.seed_devices[1].device, DeviceId::from("boiler-2"));
        assert_eq!(config.seed_devices[1].initial_reading, None);
    }

    #[test]
    fn test_parse_empty() {
        let config: HubConfig = toml::from_str("").unwrap();
        assert_eq!(config.hub_name, "telehub");
        assert!(config.seed_devices.is_empty());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hub.toml");
        fs::write(
            &path,
            r#"
hub_name = "lab"

[[seed_devices]]
group = "fridges"
device = "fridge-a"
"#,
        )
        .await
        .unwrap();

        let config = HubConfig::load(&path).await.unwrap();
        assert_eq!(config.hub_name, "lab");
        assert_eq!(config.seed_devices.len(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = HubConfig::load(dir.path().join("nope.toml")).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
