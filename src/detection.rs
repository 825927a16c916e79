use serde_derive::{Deserialize, Serialize};

use crate::bbox::BBox;

/// A single detector output for one frame
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    #[serde(rename = "box")]
    pub bbox: BBox,
    #[serde(rename = "p")]
    pub confidence: f32,
}

impl Detection {
    #[inline]
    pub fn new(bbox: BBox, confidence: f32) -> Self {
        Self { bbox, confidence }
    }

    #[inline]
    pub fn ltrb(left: i32, top: i32, right: i32, bottom: i32, confidence: f32) -> Self {
        Self::new(BBox::ltrb(left, top, right, bottom), confidence)
    }

    #[inline(always)]
    pub fn iou(&self, other: &Detection) -> f32 {
        self.bbox.iou(&other.bbox)
    }

    /// Same detection with the box clipped to the frame
    #[inline]
    pub fn clamped(&self, width: u32, height: u32) -> Self {
        Self {
            bbox: self.bbox.clamp(width, height),
            confidence: self.confidence,
        }
    }
}

/// Detection with the track it was assigned to
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TrackedDetection {
    pub bbox: BBox,
    pub confidence: f32,
    pub track_id: u32,
}
