// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pregrade-grading: turns pixel analysis into a grade.
//
// Provides upload intake, the grade aggregator (probability, confidence,
// recommendations, submission advice), the market-value estimate with its
// pluggable rarity lookup, and the `CardGrader` pipeline that produces the
// final `CardReport`.

pub mod aggregator;
pub mod intake;
pub mod market;
pub mod pipeline;
pub mod rarity;
pub mod report;

pub use aggregator::{grade_card, Grading, GradingInputs};
pub use intake::{Submission, Upload};
pub use pipeline::CardGrader;
pub use rarity::{KeywordRarity, RarityLookup};
pub use report::{CardReport, ReportId};
