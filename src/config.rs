//! Window configuration persisted as JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::display::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::error::GraphicsError;

/// Window and presentation settings for the demo shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            title: "paintbox".to_string(),
            vsync: true,
        }
    }
}

impl ScreenConfig {
    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GraphicsError> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| GraphicsError::Config(e.to_string()))?;
        fs::write(path, json).map_err(|e| GraphicsError::Config(e.to_string()))
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GraphicsError> {
        let json = fs::read_to_string(path).map_err(|e| GraphicsError::Config(e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| GraphicsError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let config = ScreenConfig {
            width: 800,
            height: 600,
            title: "test".to_string(),
            vsync: false,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: ScreenConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.width, 800);
        assert_eq!(back.height, 600);
        assert_eq!(back.title, "test");
        assert!(!back.vsync);
    }

    #[test]
    fn test_defaults() {
        let config = ScreenConfig::default();
        assert_eq!(config.width, DEFAULT_WIDTH);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert!(config.vsync);
    }
}
