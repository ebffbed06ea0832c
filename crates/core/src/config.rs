//! Index definition loaded from a JSON file at startup.
//!
//! The layer list is ordered: the first layer is the reference layer for
//! the ratio series. Exactly four layers are required; an unreadable or
//! invalid file is the one startup-fatal condition in the system.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Number of layers the ratio series is defined over.
pub const LAYER_COUNT: usize = 4;

/// One tracked equity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInfo {
    pub ticker: String,
    pub name: String,
}

/// One ordered layer of the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    pub name: String,
    pub stocks: Vec<StockInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerConfig {
    pub update_interval_minutes: u64,
}

/// Full index definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexConfig {
    pub layers: Vec<LayerConfig>,
    pub scheduler: SchedulerConfig,
}

impl IndexConfig {
    /// Load and validate the index definition from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigIO(format!("{}: {}", path.display(), e)))?;
        let config: IndexConfig = serde_json::from_str(&content)
            .map_err(|e| Error::InvalidConfigValue(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.layers.len() != LAYER_COUNT {
            return Err(Error::InvalidConfigValue(format!(
                "expected {} layers, got {}",
                LAYER_COUNT,
                self.layers.len()
            )));
        }
        for layer in &self.layers {
            if layer.name.is_empty() {
                return Err(Error::InvalidConfigValue("empty layer name".to_string()));
            }
        }
        if self.scheduler.update_interval_minutes == 0 {
            return Err(Error::InvalidConfigValue(
                "updateIntervalMinutes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(name: &str, tickers: &[&str]) -> LayerConfig {
        LayerConfig {
            name: name.to_string(),
            stocks: tickers
                .iter()
                .map(|t| StockInfo {
                    ticker: t.to_string(),
                    name: t.to_string(),
                })
                .collect(),
        }
    }

    fn four_layer_config() -> IndexConfig {
        IndexConfig {
            layers: vec![
                layer("layer1", &["AAA"]),
                layer("layer2", &["BBB"]),
                layer("layer3", &["CCC"]),
                layer("layer4", &["DDD"]),
            ],
            scheduler: SchedulerConfig {
                update_interval_minutes: 15,
            },
        }
    }

    #[test]
    fn test_validate_accepts_four_layers() {
        assert!(four_layer_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_layer_count() {
        let mut config = four_layer_config();
        config.layers.pop();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = four_layer_config();
        config.scheduler.update_interval_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "layers": [
                {"name": "layer1", "stocks": [{"ticker": "NVDA", "name": "NVIDIA"}]},
                {"name": "layer2", "stocks": []},
                {"name": "layer3", "stocks": []},
                {"name": "layer4", "stocks": []}
            ],
            "scheduler": {"updateIntervalMinutes": 15}
        }"#;
        let config: IndexConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.layers[0].stocks[0].ticker, "NVDA");
        assert_eq!(config.scheduler.update_interval_minutes, 15);
    }
}
