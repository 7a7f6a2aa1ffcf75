// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pregrade: core types, grade bands, and error definitions shared across all crates.

pub mod banding;
pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use config::AnalysisConfig;
pub use error::{PregradeError, Result};
pub use types::*;
