use serde_derive::{Deserialize, Serialize};

use crate::bbox::BBox;
use crate::detection::{Detection, TrackedDetection};

/// Detector output for one video frame
pub struct Frame {
    pub index: u64,
    pub dims: (u32, u32),
    pub detections: Vec<Detection>,
}

impl Frame {
    #[inline]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

/// What was assigned on one frame; the three vectors are parallel
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct FrameRecord {
    pub boxes: Vec<BBox>,
    pub confidences: Vec<f32>,
    pub track_ids: Vec<u32>,
    pub is_keyframe: bool,
}

impl FrameRecord {
    pub fn new(tracked: &[TrackedDetection], is_keyframe: bool) -> Self {
        Self {
            boxes: tracked.iter().map(|t| t.bbox).collect(),
            confidences: tracked.iter().map(|t| t.confidence).collect(),
            track_ids: tracked.iter().map(|t| t.track_id).collect(),
            is_keyframe,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.track_ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.track_ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TrackedDetection> + '_ {
        self.boxes
            .iter()
            .zip(&self.confidences)
            .zip(&self.track_ids)
            .map(|((&bbox, &confidence), &track_id)| TrackedDetection {
                bbox,
                confidence,
                track_id,
            })
    }
}
