// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-text rendering for the terminal. JSON output bypasses this module.

use std::io::{self, Write};

use pregrade_core::{Criterion, GradeLabel};
use pregrade_grading::CardReport;
use serde_json::{json, Value};

pub fn write_report(out: &mut impl Write, report: &CardReport) -> io::Result<()> {
    let grading = &report.grading;
    writeln!(out, "Pregrade report {}", report.report_id)?;
    writeln!(out, "  card type:    {}", report.card_type)?;
    writeln!(
        out,
        "  image:        {}x{} (sha256 {})",
        report.analysis.dimensions.width,
        report.analysis.dimensions.height,
        short_hash(&report.source_sha256)
    )?;
    writeln!(
        out,
        "  overall:      {} ({:.1})",
        grading.overall_grade, grading.overall_score
    )?;
    writeln!(
        out,
        "  probability:  {:.0}%   confidence: {:.0}%",
        grading.probability * 100.0,
        grading.confidence * 100.0
    )?;
    writeln!(out, "  market value: ${}", grading.market_value)?;

    writeln!(out)?;
    let breakdown = &grading.breakdown;
    for (criterion, row) in [
        (Criterion::Centering, &breakdown.centering),
        (Criterion::Corners, &breakdown.corners),
        (Criterion::Edges, &breakdown.edges),
        (Criterion::Surface, &breakdown.surface),
    ] {
        writeln!(
            out,
            "  {:<10} {:>4.1}  {:<16} {:?}",
            criterion.label(),
            row.score,
            row.grade.as_str(),
            row.impact
        )?;
    }

    if let Some(defects) = &report.defects {
        let located: Vec<_> = defects.located_findings().collect();
        if !located.is_empty() {
            writeln!(out)?;
            writeln!(out, "Defects:")?;
            for finding in located {
                writeln!(
                    out,
                    "  {:<16} severity {:.2}  {} location(s)",
                    finding.kind.as_str(),
                    finding.severity,
                    finding.locations.len()
                )?;
            }
        }
    }

    if let Some(segmentation) = &report.segmentation {
        if !segmentation.critical_areas.is_empty() {
            writeln!(out)?;
            writeln!(out, "Critical areas:")?;
            for area in &segmentation.critical_areas {
                writeln!(out, "  {:<12} {:.2}  {}", area.location, area.severity, area.description)?;
            }
        }
    }

    if !grading.recommendations.is_empty() {
        writeln!(out)?;
        writeln!(out, "Recommendations:")?;
        for rec in &grading.recommendations {
            writeln!(out, "  [{}] {} {}", rec.category, rec.issue, rec.suggestion)?;
        }
    }

    if !grading.submission_advice.is_empty() {
        writeln!(out)?;
        writeln!(out, "Submission advice:")?;
        for advice in &grading.submission_advice {
            writeln!(out, "  {:?}: {}", advice.kind, advice.message)?;
        }
    }

    if !report.degraded.is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "Degraded stages (neutral defaults used): {}",
            report.degraded.join(", ")
        )?;
    }
    Ok(())
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

pub fn write_guidelines(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Grades:")?;
    for grade in GradeLabel::ALL {
        if let Some(range) = grade.range() {
            writeln!(
                out,
                "  {:<16} {:>4.1} - {:>4.1}  {}",
                grade.as_str(),
                range.min,
                range.max,
                grade.description()
            )?;
        }
    }
    writeln!(out)?;
    writeln!(out, "Criteria:")?;
    for criterion in Criterion::ALL {
        writeln!(
            out,
            "  {:<10} {:>3.0}%  {}",
            criterion.label(),
            Criterion::WEIGHT * 100.0,
            criterion.description()
        )?;
    }
    Ok(())
}

pub fn guidelines_json() -> Value {
    let grades: Vec<Value> = GradeLabel::ALL
        .iter()
        .filter_map(|grade| {
            grade.range().map(|range| {
                json!({
                    "grade": grade.as_str(),
                    "min": range.min,
                    "max": range.max,
                    "description": grade.description(),
                })
            })
        })
        .collect();
    let criteria: Vec<Value> = Criterion::ALL
        .iter()
        .map(|criterion| {
            json!({
                "criterion": criterion,
                "label": criterion.label(),
                "weight": Criterion::WEIGHT,
                "description": criterion.description(),
            })
        })
        .collect();
    json!({ "grades": grades, "criteria": criteria })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guidelines_list_every_ranged_grade() {
        let value = guidelines_json();
        let grades = value["grades"].as_array().unwrap();
        assert_eq!(grades.len(), 11);
        assert_eq!(grades[0]["grade"], "Gem Mint");
        assert_eq!(grades[0]["min"], 9.5);
        assert_eq!(value["criteria"].as_array().unwrap().len(), 4);
        assert_eq!(value["criteria"][0]["criterion"], "centering");
    }

    #[test]
    fn guidelines_text_mentions_weights() {
        let mut buf = Vec::new();
        write_guidelines(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Gem Mint"));
        assert!(text.contains("Corners"));
        assert!(text.contains("25%"));
    }

    #[test]
    fn short_hash_handles_short_input() {
        assert_eq!(short_hash("abc"), "abc");
        assert_eq!(short_hash("0123456789abcdef"), "0123456789ab");
    }
}
