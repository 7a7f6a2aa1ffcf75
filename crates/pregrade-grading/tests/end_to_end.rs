mod common;

use approx::assert_relative_eq;
use common::synthetic_card::{
    framed, paint_square, png, sequential_config, submission, uniform, upload, GRAY, WHITE,
};
use image::Rgba;
use pregrade_core::error::PregradeError;
use pregrade_core::{AnalysisConfig, ErrorClass, ExtractedText, GradeLabel};
use pregrade_grading::{CardGrader, Submission, Upload};
use pregrade_vision::{CardAnalyzer, FixedTextExtractor, RasterImage, TextExtractor};

struct BrokenOcr;

impl TextExtractor for BrokenOcr {
    fn extract(&self, _image: &RasterImage) -> Result<ExtractedText, PregradeError> {
        Err(PregradeError::Ocr("recognition model missing".into()))
    }
}

#[test]
fn uniform_gray_card_is_gem_mint_with_no_defects() {
    let img = uniform(1000, 1400, GRAY);
    let report = CardGrader::new(sequential_config())
        .grade(&submission(&img))
        .expect("uniform card grades");

    let analysis = &report.analysis;
    assert_eq!(analysis.centering.score, 10.0);
    assert_eq!(analysis.corners.average_score, 10.0);
    assert_eq!(analysis.edges.average_score, 10.0);
    assert_eq!(analysis.surface.score, 10.0);
    assert_eq!(analysis.overall_condition.score, 10.0);

    let grading = &report.grading;
    assert_eq!(grading.overall_score, 10.0);
    assert_eq!(grading.overall_grade, GradeLabel::GemMint);
    assert!((0.05..=0.95).contains(&grading.probability));
    // resolution ok, no text (0.7), even lighting, flat image reads as unfocused (0.8)
    assert_relative_eq!(grading.confidence, 0.875, epsilon = 1e-12);

    let defects = report.defects.as_ref().expect("defect stage enabled by default");
    assert_eq!(defects.located_findings().count(), 0);
    assert_eq!(defects.overall.score, 0.0);
    assert!(defects.recommendations.is_empty());

    let segmentation = report.segmentation.as_ref().expect("segmentation enabled by default");
    assert!(segmentation.critical_areas.is_empty());
    assert!(report.degraded.is_empty());
}

#[test]
fn white_corner_block_only_hurts_that_corner() {
    let mut img = uniform(1000, 1400, GRAY);
    paint_square(&mut img, 0, 0, 50, WHITE);
    let report = CardGrader::new(sequential_config())
        .grade(&submission(&img))
        .unwrap();

    let corners = report.analysis.corners.corners.expect("corner scores present");
    assert!(corners.top_left.score < 10.0, "{:?}", corners.top_left);
    assert_eq!(corners.bottom_right.score, 10.0);

    let segmentation = report.segmentation.unwrap();
    let top_left = &segmentation.highlights.corners[0];
    assert_eq!(top_left.name, "topLeft");
    let flagged = segmentation
        .critical_areas
        .iter()
        .any(|area| area.location == "topLeft");
    assert_eq!(flagged, top_left.analysis.severity > 0.5);
}

#[test]
fn centered_frame_scores_ten() {
    let report = CardGrader::new(sequential_config())
        .grade(&submission(&framed(300, 420, 20, 20, 15, 15)))
        .unwrap();
    assert_eq!(report.analysis.centering.score, 10.0);
    assert_eq!(report.analysis.centering.grade, GradeLabel::GemMint);
    assert_relative_eq!(report.analysis.centering.top_border, 20.0);
}

#[test]
fn centering_is_swap_symmetric() {
    let analyzer = CardAnalyzer::default();
    let high = RasterImage::from_rgba(framed(300, 420, 10, 30, 20, 20)).unwrap();
    let low = RasterImage::from_rgba(framed(300, 420, 30, 10, 20, 20)).unwrap();
    let a = analyzer.analyze(&high).centering;
    let b = analyzer.analyze(&low).centering;
    assert_eq!(a.score, b.score);
    assert!(a.score < 10.0);
    assert_eq!(a.vertical_centering, b.vertical_centering);
}

#[test]
fn back_side_caps_each_criterion() {
    let front = uniform(200, 280, GRAY);
    let mut back = uniform(200, 280, GRAY);
    paint_square(&mut back, 0, 0, 20, WHITE);

    let sub = Submission::new(upload("front.png", &front)).with_back(upload("back.png", &back));
    let report = CardGrader::new(sequential_config()).grade(&sub).unwrap();

    let back_analysis = report.back_analysis.as_ref().expect("back analysed");
    assert_eq!(report.analysis.corners.average_score, 10.0);
    assert!(back_analysis.corners.average_score < 10.0);
    assert_eq!(
        report.grading.breakdown.corners.score,
        back_analysis.corners.average_score
    );
    assert!(report.grading.overall_score < 10.0);
    assert!(report.back_sha256.is_some());
    assert_ne!(report.back_sha256.as_deref(), Some(report.source_sha256.as_str()));
}

#[test]
fn recognised_card_name_raises_market_value() {
    let img = uniform(600, 840, GRAY);
    let grader = CardGrader::new(sequential_config())
        .with_extractor(Box::new(FixedTextExtractor::new("Charizard HP 120", 95.0)));
    let report = grader.grade(&submission(&img)).unwrap();

    assert_eq!(report.grading.overall_grade, GradeLabel::GemMint);
    assert_eq!(report.grading.market_value, 5000);
    assert_relative_eq!(report.grading.confidence, 0.95, epsilon = 1e-12);
}

#[test]
fn ocr_failure_degrades_without_failing_the_run() {
    let img = uniform(200, 280, GRAY);
    let grader = CardGrader::new(sequential_config()).with_extractor(Box::new(BrokenOcr));
    let report = grader.grade(&submission(&img)).unwrap();

    assert_eq!(report.degraded, vec!["text"]);
    assert_eq!(report.analysis.text, ExtractedText::empty());
    assert_eq!(report.grading.overall_grade, GradeLabel::GemMint);
}

#[test]
fn undecodable_image_is_fatal() {
    let mut bytes = png(&uniform(64, 64, GRAY));
    bytes.truncate(40);
    let sub = Submission::new(Upload::from_bytes("front.png", bytes, None, 1 << 20).unwrap());

    let err = CardGrader::default().grade(&sub).unwrap_err();
    assert!(matches!(err, PregradeError::Decode(_)), "{err}");
    assert_eq!(err.class(), ErrorClass::Fatal);
}

#[test]
fn missing_front_is_an_input_error() {
    let err = CardGrader::default().grade(&Submission::default()).unwrap_err();
    assert!(matches!(err, PregradeError::MissingImage));
    assert_eq!(err.class(), ErrorClass::Input);
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let mut img = uniform(240, 336, GRAY);
    paint_square(&mut img, 100, 150, 30, WHITE);
    let sub = submission(&img);

    let par = CardGrader::default().grade(&sub).unwrap();
    let seq = CardGrader::new(sequential_config()).grade(&sub).unwrap();
    assert_eq!(par.analysis, seq.analysis);
    assert_eq!(par.grading, seq.grading);
    assert_eq!(par.defects, seq.defects);
    assert_eq!(par.quality, seq.quality);
    assert_eq!(par.segmentation, seq.segmentation);
}

#[test]
fn report_json_carries_envelope_and_enabled_stages() {
    let img = uniform(120, 168, GRAY);
    let config = AnalysisConfig {
        quality: false,
        ..sequential_config()
    };
    let report = CardGrader::new(config).grade(&submission(&img)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();

    for key in ["reportId", "generatedAt", "sourceSha256", "cardType", "analysis", "grading", "defects", "segmentation"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    for key in ["quality", "enhanced", "backAnalysis", "degraded"] {
        assert!(json.get(key).is_none(), "unexpected {key}");
    }
    assert_eq!(json["cardType"], "Pokemon");
    assert_eq!(json["grading"]["overallGrade"], "Gem Mint");
    assert_eq!(json["analysis"]["overallCondition"]["breakdown"]["centering"], 10.0);
}

#[test]
fn artifacts_are_written_for_every_rendered_image() {
    let mut img = uniform(120, 168, GRAY);
    paint_square(&mut img, 0, 0, 12, Rgba([0, 0, 0, 255]));
    let config = AnalysisConfig {
        enhancement: true,
        render_highlights: true,
        visualizations: true,
        ..sequential_config()
    };
    let report = CardGrader::new(config).grade(&submission(&img)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let written = report.write_artifacts(dir.path()).unwrap();

    let count = |prefix: &str| {
        written
            .iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(prefix))
            })
            .count()
    };
    assert!(dir.path().join("report.json").exists());
    assert_eq!(count("segment_"), 20);
    assert_eq!(count("enhanced_"), 6);
    let defects = report.defects.as_ref().unwrap();
    assert_eq!(count("defect_"), defects.visualizations.len());
    assert!(count("defect_") > 0);
    assert!(written.iter().all(|p| p.exists()));
}

