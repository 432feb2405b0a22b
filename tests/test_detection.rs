//! End-to-end detection flow against a scripted model.
//!
//! Tests cover:
//! - Untouched output when nothing is found
//! - A single toolbox box and its label
//! - Label text burned in with the bundled font
//! - Client-side filtering of low-confidence detections
//! - Inference failures surfacing as errors

mod common;

use astroguard::{CONFIDENCE_THRESHOLD, run_detection};
use common::*;

fn count_pixels(img: &image::RgbImage, color: image::Rgb<u8>) -> usize {
    img.pixels().filter(|p| **p == color).count()
}

#[test]
fn test_no_detections_returns_source_image() -> anyhow::Result<()> {
    let detector = ScriptedDetector::new(vec![]);
    let img = gray_image(120, 80);

    let report = run_detection(detector.as_ref(), &Annotator::boxes_only(), &img)?;

    assert_eq!(report.image, img.to_rgb8());
    assert!(report.detections.is_empty());
    assert!(report.summary.is_empty());
    assert!(report.summary.headline().contains("NO OBJECTS DETECTED"));
    assert_eq!(detector.calls(), 1);

    Ok(())
}

#[test]
fn test_single_toolbox_is_drawn_once() -> anyhow::Result<()> {
    let detector = ScriptedDetector::new(vec![toolbox_073()]);
    let img = gray_image(100, 100);

    let report = run_detection(detector.as_ref(), &Annotator::boxes_only(), &img)?;

    assert_eq!(report.detections.len(), 1);
    let label = report.detections[0].label();
    assert!(label.contains("toolbox"));
    assert!(label.contains("0.73"));

    // One 40x40 box, 3px thick: 40*40 - 34*34 pixels in the class colour
    let orange = DetectionClass::ToolBox.color();
    assert_eq!(count_pixels(&report.image, orange), 444);
    assert_eq!(report.image.get_pixel(10, 10), &orange);
    assert_eq!(report.image.get_pixel(49, 49), &orange);
    assert_eq!(report.image.get_pixel(30, 30), &BACKGROUND);
    assert_eq!(report.image.get_pixel(60, 60), &BACKGROUND);

    assert_eq!(report.summary.headline(), "DETECTION COMPLETE | toolbox: 1");

    Ok(())
}

#[test]
fn test_label_is_burned_in_next_to_box() -> anyhow::Result<()> {
    let detector = ScriptedDetector::new(vec![toolbox_073()]);
    let img = gray_image(300, 100);

    let report = run_detection(detector.as_ref(), &Annotator::default(), &img)?;

    // No room above a box at y=10, so the strip hangs inside its top edge
    let orange = DetectionClass::ToolBox.color();
    let black = image::Rgb([0, 0, 0]);
    assert!(count_pixels(&report.image, orange) > 444);
    assert!(count_pixels(&report.image, black) > 0);
    assert_eq!(report.image.get_pixel(11, 11), &orange);
    let mut text_rows = report
        .image
        .enumerate_pixels()
        .filter(|(_, _, p)| **p == black)
        .map(|(_, y, _)| y);
    assert!(text_rows.all(|y| (10..50).contains(&y)));
    assert!(report.image.enumerate_pixels().all(|(x, _, p)| *p != orange || x >= 10));

    Ok(())
}

#[test]
fn test_low_confidence_detections_never_rendered() -> anyhow::Result<()> {
    // The scripted model ignores the threshold it is given
    let detector = ScriptedDetector::new(vec![
        detection(DetectionClass::OxygenTank, 0.49, (60.0, 60.0, 90.0, 90.0)),
        detection(DetectionClass::FireExtinguisher, 0.2, (5.0, 5.0, 30.0, 30.0)),
        toolbox_073(),
    ]);
    let img = gray_image(100, 100);

    let report = run_detection(detector.as_ref(), &Annotator::boxes_only(), &img)?;

    assert_eq!(report.detections, vec![toolbox_073()]);
    assert!(report.detections.iter().all(|d| d.confidence >= CONFIDENCE_THRESHOLD));
    assert_eq!(count_pixels(&report.image, DetectionClass::OxygenTank.color()), 0);
    assert_eq!(count_pixels(&report.image, DetectionClass::FireExtinguisher.color()), 0);
    assert_eq!(report.summary.count(DetectionClass::OxygenTank), 0);

    Ok(())
}

#[test]
fn test_summary_groups_by_class() -> anyhow::Result<()> {
    let detector = ScriptedDetector::new(vec![
        detection(DetectionClass::FireExtinguisher, 0.91, (0.0, 0.0, 20.0, 20.0)),
        detection(DetectionClass::OxygenTank, 0.66, (30.0, 30.0, 60.0, 60.0)),
        detection(DetectionClass::FireExtinguisher, 0.55, (70.0, 0.0, 95.0, 30.0)),
    ]);

    let img = gray_image(100, 100);
    let report = run_detection(detector.as_ref(), &Annotator::boxes_only(), &img)?;

    assert_eq!(report.summary.total(), 3);
    assert_eq!(
        report.summary.headline(),
        "DETECTION COMPLETE | fire extinguisher: 2 | oxygen tank: 1"
    );

    Ok(())
}

#[test]
fn test_inference_failure_is_an_error() {
    let result = run_detection(&FailingDetector, &Annotator::boxes_only(), &gray_image(10, 10));
    assert!(result.is_err());
}
