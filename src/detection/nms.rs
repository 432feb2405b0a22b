use std::cmp::Ordering;

use crate::models::Detection;

/// Greedy class-aware non-max suppression.
///
/// Detections are visited by descending confidence; a detection is dropped when
/// it overlaps an already kept detection of the same class by more than
/// `iou_threshold`. At most `max_detections` survive.
pub fn non_max_suppression(
    mut detections: Vec<Detection>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Detection> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut kept: Vec<Detection> = Vec::new();
    for candidate in detections {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept.iter().any(|k| {
            k.class == candidate.class && k.bbox.iou(&candidate.bbox) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
