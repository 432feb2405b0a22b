use image::Rgb;
use imageproc::rect::Rect;
use serde::{Serialize, Serializer};
use std::fmt;

/// Objects the station model was trained to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionClass {
    FireExtinguisher,
    ToolBox,
    OxygenTank,
}

impl DetectionClass {
    pub const ALL: [DetectionClass; 3] = [
        DetectionClass::FireExtinguisher,
        DetectionClass::ToolBox,
        DetectionClass::OxygenTank,
    ];

    /// Map a model class id to a class (ids follow the training order of the weights)
    pub fn from_id(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    pub fn id(self) -> usize {
        match self {
            DetectionClass::FireExtinguisher => 0,
            DetectionClass::ToolBox => 1,
            DetectionClass::OxygenTank => 2,
        }
    }

    /// Accepts display names as well as the spellings found in model metadata
    /// ("FireExtinguisher", "fire_extinguisher", "Oxygen Tank", ...)
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "fireextinguisher" => Some(DetectionClass::FireExtinguisher),
            "toolbox" => Some(DetectionClass::ToolBox),
            "oxygentank" => Some(DetectionClass::OxygenTank),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DetectionClass::FireExtinguisher => "fire extinguisher",
            DetectionClass::ToolBox => "toolbox",
            DetectionClass::OxygenTank => "oxygen tank",
        }
    }

    /// Overlay colour used for boxes and label backgrounds
    pub fn color(self) -> Rgb<u8> {
        match self {
            DetectionClass::FireExtinguisher => Rgb([0, 255, 100]),
            DetectionClass::ToolBox => Rgb([255, 165, 0]),
            DetectionClass::OxygenTank => Rgb([0, 150, 255]),
        }
    }
}

impl fmt::Display for DetectionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for DetectionClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Corner-form box in source image pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build from the centre form the model emits
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
        }
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn intersection(&self, other: &Self) -> f32 {
        let w = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let h = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        w * h
    }

    /// Intersection over union, 0.0 when both boxes are empty
    pub fn iou(&self, other: &Self) -> f32 {
        let inter = self.intersection(other);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            return 0.0;
        }
        inter / union
    }

    /// Clamp to an image of the given size
    pub fn clamp(&self, width: u32, height: u32) -> Self {
        let w = width as f32;
        let h = height as f32;
        Self {
            x1: self.x1.clamp(0.0, w),
            y1: self.y1.clamp(0.0, h),
            x2: self.x2.clamp(0.0, w),
            y2: self.y2.clamp(0.0, h),
        }
    }

    /// Integer rectangle for drawing, None when the box has no pixels
    pub fn to_rect(&self) -> Option<Rect> {
        let x1 = self.x1.round() as i32;
        let y1 = self.y1.round() as i32;
        let x2 = self.x2.round() as i32;
        let y2 = self.y2.round() as i32;
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Rect::at(x1, y1).of_size((x2 - x1) as u32, (y2 - y1) as u32))
    }
}

/// One predicted object instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub class: DetectionClass,
    pub confidence: f32,
}

impl Detection {
    pub fn new(class: DetectionClass, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            bbox,
            class,
            confidence,
        }
    }

    /// Text burned into the image next to the box, e.g. "toolbox 0.73"
    pub fn label(&self) -> String {
        format!("{} {:.2}", self.class.name(), self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_names_from_model_metadata() {
        assert_eq!(
            DetectionClass::from_name("FireExtinguisher"),
            Some(DetectionClass::FireExtinguisher)
        );
        assert_eq!(
            DetectionClass::from_name("fire_extinguisher"),
            Some(DetectionClass::FireExtinguisher)
        );
        assert_eq!(DetectionClass::from_name("ToolBox"), Some(DetectionClass::ToolBox));
        assert_eq!(
            DetectionClass::from_name("Oxygen Tank"),
            Some(DetectionClass::OxygenTank)
        );
        assert_eq!(DetectionClass::from_name("astronaut"), None);
    }

    #[test]
    fn class_ids_follow_training_order() {
        for class in DetectionClass::ALL {
            assert_eq!(DetectionClass::from_id(class.id()), Some(class));
        }
        assert_eq!(DetectionClass::from_id(3), None);
    }

    #[test]
    fn label_has_two_decimals() {
        let det = Detection::new(
            DetectionClass::ToolBox,
            0.7312,
            BoundingBox::new(10.0, 10.0, 50.0, 50.0),
        );
        assert_eq!(det.label(), "toolbox 0.73");
    }

    #[test]
    fn iou_of_overlapping_boxes() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 0.0, 15.0, 10.0);
        let iou = a.iou(&b);
        assert!((iou - 50.0 / 150.0).abs() < 1e-6);
        assert_eq!(a.iou(&BoundingBox::new(20.0, 20.0, 30.0, 30.0)), 0.0);
    }

    #[test]
    fn degenerate_box_has_no_rect() {
        assert!(BoundingBox::new(10.0, 10.0, 10.0, 40.0).to_rect().is_none());
        let rect = BoundingBox::new(10.0, 10.0, 50.0, 50.0).to_rect().unwrap();
        assert_eq!((rect.left(), rect.top(), rect.width(), rect.height()), (10, 10, 40, 40));
    }

    #[test]
    fn clamp_keeps_box_inside_image() {
        let b = BoundingBox::new(-5.0, 3.0, 120.0, 90.0).clamp(100, 80);
        assert_eq!(b, BoundingBox::new(0.0, 3.0, 100.0, 80.0));
    }
}
