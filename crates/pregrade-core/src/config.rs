// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Analysis configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Default upload limit: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// A card name fragment that raises the market-value multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityKeyword {
    /// Matched case-insensitively against the extracted card text.
    pub keyword: String,
    pub multiplier: f64,
}

/// Which pipeline stages run, and the limits they run under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Run the eight defect detectors.
    pub defects: bool,
    /// Run the quality and texture analyzer.
    pub quality: bool,
    /// Run segmentation and critical-area detection.
    pub segmentation: bool,
    /// Produce the enhancement previews.
    pub enhancement: bool,
    /// Encode segment highlight overlays as PNG.
    pub render_highlights: bool,
    /// Encode per-defect visualisations as PNG.
    pub visualizations: bool,
    /// Evaluate independent stages concurrently.
    pub parallel: bool,
    /// Largest accepted upload in bytes.
    pub max_upload_bytes: u64,
    /// Label reported alongside the analysis.
    pub card_type: String,
    /// Market-value multipliers keyed on card text.
    pub rarity_keywords: Vec<RarityKeyword>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            defects: true,
            quality: true,
            segmentation: true,
            enhancement: false,
            render_highlights: false,
            visualizations: false,
            parallel: true,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            card_type: "Pokemon".into(),
            rarity_keywords: vec![RarityKeyword {
                keyword: "charizard".into(),
                multiplier: 5.0,
            }],
        }
    }
}

impl AnalysisConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&data)?;
        info!(path = %path.display(), "analysis config loaded");
        Ok(config)
    }

    /// Like [`load`](Self::load), but falls back to defaults when the file is
    /// absent or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), "using default analysis config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pregrade.json");
        std::fs::write(&path, r#"{ "defects": false, "card_type": "Magic" }"#).unwrap();

        let config = AnalysisConfig::load(&path).unwrap();
        assert!(!config.defects);
        assert_eq!(config.card_type, "Magic");
        assert!(config.quality);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn save_then_load_preserves_keywords() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pregrade.json");
        let mut config = AnalysisConfig::default();
        config.rarity_keywords.push(RarityKeyword {
            keyword: "pikachu".into(),
            multiplier: 2.5,
        });
        config.save(&path).unwrap();

        let loaded = AnalysisConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::load_or_default(&dir.path().join("absent.json"));
        assert_eq!(config, AnalysisConfig::default());
    }
}
