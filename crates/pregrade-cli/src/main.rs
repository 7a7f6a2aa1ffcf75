// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pregrade: heuristic trading-card condition pre-grader
//
// Entry point. Logs go to stderr so stdout carries only the report.

mod cli;
mod output;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use pregrade_core::error::PregradeError;
use pregrade_core::human_errors::{humanize_error, Severity};
use pregrade_core::AnalysisConfig;
use pregrade_grading::CardGrader;
use tracing::{error, info};

use cli::{Cli, Commands, GradeArgs};

/// Photo problems the user can fix exit with 2; everything else with 1.
const EXIT_INPUT: u8 = 2;
const EXIT_FAILURE: u8 = 1;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Grade(args) => run_grade(args, cli.json),
        Commands::Guidelines => run_guidelines(cli.json),
        Commands::Config { write } => run_config(write.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(class = ?err.class(), "pregrade failed: {err}");
            let human = humanize_error(&err);
            eprintln!("{}\n{}", human.message, human.suggestion);
            match human.severity {
                Severity::ActionRequired => ExitCode::from(EXIT_INPUT),
                Severity::Partial | Severity::Permanent => ExitCode::from(EXIT_FAILURE),
            }
        }
    }
}

// -- grade ------------------------------------------------------------------

fn run_grade(args: &GradeArgs, json: bool) -> Result<(), PregradeError> {
    let base = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    let config = args.apply(base);

    let grader = attach_ocr(CardGrader::new(config), args)?;
    let report = grader.grade_files(&args.front, args.back.as_deref())?;

    if let Some(dir) = &args.artifacts_dir {
        let written = report.write_artifacts(dir)?;
        info!(dir = %dir.display(), files = written.len(), "artifacts written");
    }

    let mut stdout = io::stdout().lock();
    if json {
        writeln!(stdout, "{}", report.to_json_pretty()?)?;
    } else {
        output::write_report(&mut stdout, &report)?;
    }
    Ok(())
}

#[cfg(feature = "ocr")]
fn attach_ocr(grader: CardGrader, args: &GradeArgs) -> Result<CardGrader, PregradeError> {
    match &args.ocr_models {
        Some(dir) => {
            let extractor = pregrade_vision::OcrsExtractor::from_model_dir(dir)?;
            Ok(grader.with_extractor(Box::new(extractor)))
        }
        None => Ok(grader),
    }
}

#[cfg(not(feature = "ocr"))]
fn attach_ocr(grader: CardGrader, _args: &GradeArgs) -> Result<CardGrader, PregradeError> {
    Ok(grader)
}

// -- guidelines -------------------------------------------------------------

fn run_guidelines(json: bool) -> Result<(), PregradeError> {
    let mut stdout = io::stdout().lock();
    if json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&output::guidelines_json())?)?;
    } else {
        output::write_guidelines(&mut stdout)?;
    }
    Ok(())
}

// -- config -----------------------------------------------------------------

fn run_config(write: Option<&std::path::Path>) -> Result<(), PregradeError> {
    let config = AnalysisConfig::default();
    match write {
        Some(path) => {
            config.save(path)?;
            info!(path = %path.display(), "default config written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", serde_json::to_string_pretty(&config)?)?;
        }
    }
    Ok(())
}
