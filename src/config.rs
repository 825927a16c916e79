use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::error::Error;

/// How the detections of one keyframe are matched against live tracks
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentPolicy {
    /// One-to-one; highest IoU pairs first, ties by detection order then track id
    #[default]
    Greedy,
    /// One-to-one; maximises the summed IoU of accepted pairs
    Hungarian,
    /// Each detection independently takes its best track, in input order.
    /// Several detections may land on the same track.
    FirstCome,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Run detection every Nth frame
    pub frame_interval: u64,
    pub iou_acceptance_threshold: f32,
    /// Tracks not updated within `recency_window_multiplier * frame_interval`
    /// frames are not matched anymore
    pub recency_window_multiplier: u64,
    pub carry_forward_between_keyframes: bool,
    pub assignment: AssignmentPolicy,
    pub max_history: Option<usize>,
    pub color_seed: Option<u64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            frame_interval: 5,
            iou_acceptance_threshold: 0.3,
            recency_window_multiplier: 2,
            carry_forward_between_keyframes: false,
            assignment: AssignmentPolicy::Greedy,
            max_history: None,
            color_seed: None,
        }
    }
}

impl TrackerConfig {
    pub fn new(frame_interval: u64) -> Self {
        Self {
            frame_interval,
            ..Default::default()
        }
    }

    #[inline]
    pub fn recency_window(&self) -> u64 {
        self.recency_window_multiplier.saturating_mul(self.frame_interval)
    }

    /// Never true for a zero interval, which `validate` rejects
    #[inline]
    pub fn is_keyframe(&self, frame_index: u64) -> bool {
        frame_index.checked_rem(self.frame_interval) == Some(0)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.frame_interval == 0 {
            return Err(Error::InvalidConfig(
                "frame_interval must be positive".into(),
            ));
        }

        if !(0.0..1.0).contains(&self.iou_acceptance_threshold) {
            return Err(Error::InvalidConfig(format!(
                "iou_acceptance_threshold must be in [0, 1), got {}",
                self.iou_acceptance_threshold
            )));
        }

        if self.max_history == Some(0) {
            return Err(Error::InvalidConfig(
                "max_history must be positive when set".into(),
            ));
        }

        Ok(())
    }

    pub fn from_json(src: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(src)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let src = std::fs::read_to_string(path)?;

        Self::from_json(&src)
    }
}
