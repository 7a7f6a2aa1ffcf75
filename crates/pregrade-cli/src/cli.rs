// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface. Flags layer over the loaded `AnalysisConfig`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pregrade_core::AnalysisConfig;

#[derive(Parser, Debug)]
#[command(
    name = "pregrade",
    version,
    about = "Estimate a trading card's condition grade from a photo"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Grade one card from its front (and optionally back) photo.
    Grade(GradeArgs),

    /// Print the grade table and criterion weights.
    Guidelines,

    /// Print the default analysis config, or write it to a file.
    Config {
        /// Write the defaults here instead of printing them.
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct GradeArgs {
    /// Photo of the card front (JPEG, PNG, or WebP).
    pub front: PathBuf,

    /// Photo of the card back.
    #[arg(long)]
    pub back: Option<PathBuf>,

    /// JSON analysis config. Missing fields take their defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for report.json and every rendered image.
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,

    /// Label reported alongside the analysis.
    #[arg(long)]
    pub card_type: Option<String>,

    /// Largest accepted photo, in MiB.
    #[arg(long)]
    pub max_upload_mb: Option<u64>,

    /// Skip the defect detectors.
    #[arg(long)]
    pub no_defects: bool,

    /// Skip the quality and texture analyzer.
    #[arg(long)]
    pub no_quality: bool,

    /// Skip segmentation and critical-area detection.
    #[arg(long)]
    pub no_segmentation: bool,

    /// Produce the enhancement previews.
    #[arg(long)]
    pub enhance: bool,

    /// Render segment highlights and defect overlays (written with --artifacts-dir).
    #[arg(long)]
    pub render: bool,

    /// Run every stage on the calling thread.
    #[arg(long)]
    pub sequential: bool,

    /// Directory holding text-detection.rten and text-recognition.rten.
    #[cfg(feature = "ocr")]
    #[arg(long)]
    pub ocr_models: Option<PathBuf>,
}

impl GradeArgs {
    /// Apply the flags on top of `config`. Flags only ever switch stages off
    /// (or rendering on); an absent flag leaves the config value alone.
    pub fn apply(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if self.no_defects {
            config.defects = false;
        }
        if self.no_quality {
            config.quality = false;
        }
        if self.no_segmentation {
            config.segmentation = false;
        }
        if self.enhance {
            config.enhancement = true;
        }
        if self.render {
            config.render_highlights = true;
            config.visualizations = true;
        }
        if self.sequential {
            config.parallel = false;
        }
        if let Some(card_type) = &self.card_type {
            config.card_type = card_type.clone();
        }
        if let Some(mb) = self.max_upload_mb {
            config.max_upload_bytes = mb.saturating_mul(1024 * 1024);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_loaded_config() {
        let cli = Cli::parse_from([
            "pregrade",
            "grade",
            "front.png",
            "--no-quality",
            "--enhance",
            "--sequential",
            "--card-type",
            "Magic",
            "--max-upload-mb",
            "2",
        ]);
        let Commands::Grade(args) = cli.command else {
            panic!("expected grade");
        };
        let config = args.apply(AnalysisConfig::default());
        assert!(config.defects);
        assert!(!config.quality);
        assert!(config.enhancement);
        assert!(!config.parallel);
        assert_eq!(config.card_type, "Magic");
        assert_eq!(config.max_upload_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn absent_flags_keep_config_values() {
        let cli = Cli::parse_from(["pregrade", "--json", "grade", "front.png"]);
        assert!(cli.json);
        let Commands::Grade(args) = cli.command else {
            panic!("expected grade");
        };
        let loaded = AnalysisConfig {
            segmentation: false,
            enhancement: true,
            ..AnalysisConfig::default()
        };
        assert_eq!(args.apply(loaded.clone()), loaded);
    }
}
