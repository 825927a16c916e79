use std::collections::BTreeMap;

use log::{debug, info};

use crate::config::TrackerConfig;
use crate::error::Error;
use crate::export::{Export, VideoInfo};
use crate::frame::FrameRecord;
use crate::tracker::Tracker;
use crate::Detection;

const PROGRESS_EVERY_FRAMES: u64 = 100;

/// Tracking context of a single video
pub struct Scene {
    pub info: VideoInfo,
    tracker: Tracker,
    frames: BTreeMap<u64, FrameRecord>,
    last_frame: Option<u64>,
    processed: u64,
}

impl Scene {
    pub fn new(mut info: VideoInfo, config: TrackerConfig) -> Result<Self, Error> {
        info.frame_interval = config.frame_interval;

        Ok(Self {
            info,
            tracker: Tracker::new(config)?,
            frames: BTreeMap::new(),
            last_frame: None,
            processed: 0,
        })
    }

    /// Processes one frame. Detections only count on keyframes and are
    /// clipped to the frame size first, when it is known.
    pub fn process(
        &mut self,
        frame_index: u64,
        detections: &[Detection],
    ) -> Result<&FrameRecord, Error> {
        if let Some(previous) = self.last_frame {
            if frame_index <= previous {
                return Err(Error::FrameOrder {
                    previous,
                    current: frame_index,
                });
            }
        }

        let is_keyframe = self.tracker.config().is_keyframe(frame_index);
        let tracked = if is_keyframe {
            let (width, height) = (self.info.width, self.info.height);

            // unknown frame size, nothing to clip against
            if width == 0 || height == 0 {
                self.tracker.process_keyframe(frame_index, detections)
            } else {
                let clamped: Vec<_> = detections
                    .iter()
                    .map(|d| d.clamped(width, height))
                    .collect();

                self.tracker.process_keyframe(frame_index, &clamped)
            }
        } else {
            if !detections.is_empty() {
                debug!(
                    "{}: ignoring {} detections on frame {} between keyframes",
                    self.info.name,
                    detections.len(),
                    frame_index
                );
            }

            self.tracker.skip_frame(frame_index)
        };

        self.last_frame = Some(frame_index);
        self.processed += 1;

        if self.processed % PROGRESS_EVERY_FRAMES == 0 {
            info!(
                "{}: Processed {}/{} frames",
                self.info.name, self.processed, self.info.total_frames
            );
        }

        self.frames
            .insert(frame_index, FrameRecord::new(&tracked, is_keyframe));

        Ok(&self.frames[&frame_index])
    }

    #[inline]
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Index of the most recently processed frame
    #[inline]
    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }

    #[inline]
    pub fn frames(&self) -> &BTreeMap<u64, FrameRecord> {
        &self.frames
    }

    #[inline]
    pub fn frame(&self, frame_index: u64) -> Option<&FrameRecord> {
        self.frames.get(&frame_index)
    }

    pub fn export(&self) -> Export {
        Export {
            video_info: self.info.clone(),
            frames: self.frames.clone(),
            tracks: self
                .tracker
                .tracks()
                .map(|t| (t.track_id, t.points().copied().collect()))
                .collect(),
        }
    }
}
