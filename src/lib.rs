pub mod assignment;
pub mod bbox;
pub mod config;
pub mod detection;
pub mod dump;
pub mod error;
pub mod export;
pub mod frame;
pub mod scene;
pub mod tracker;

mod circular_queue;
mod track;

pub use bbox::BBox;
pub use config::{AssignmentPolicy, TrackerConfig};
pub use detection::{Detection, TrackedDetection};
pub use export::{Export, VideoInfo};
pub use frame::{Frame, FrameRecord};
pub use track::{Color, Track, TrackPoint};
pub use tracker::Tracker;

use error::Error;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::rc::Rc;

pub trait Tracking {
    fn update(&mut self, frames: &[Frame], src: &str) -> Result<(), Error>;
    fn tracks(&self, src: &str) -> Rc<[Track]>;
}

/// Keeps one [`scene::Scene`] per video source
pub struct MultiSceneTracker {
    config: TrackerConfig,
    scenes: HashMap<String, scene::Scene>,
}

impl MultiSceneTracker {
    pub fn new(config: TrackerConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            config,
            scenes: HashMap::new(),
        })
    }

    #[inline]
    pub fn scene(&self, src: &str) -> Option<&scene::Scene> {
        self.scenes.get(src)
    }

    pub fn export(&self, src: &str) -> Option<Export> {
        self.scenes.get(src).map(scene::Scene::export)
    }
}

impl crate::Tracking for MultiSceneTracker {
    /// Frame indices are checked against each other and against the
    /// scene before anything is processed, so an ordering error leaves the
    /// scene as it was.
    fn update(&mut self, frames: &[Frame], src: &str) -> Result<(), Error> {
        let Some(first) = frames.first() else {
            return Ok(());
        };

        let mut previous = self.scenes.get(src).and_then(scene::Scene::last_frame);
        for frame in frames {
            if let Some(previous) = previous.filter(|&p| frame.index <= p) {
                return Err(Error::FrameOrder {
                    previous,
                    current: frame.index,
                });
            }
            previous = Some(frame.index);
        }

        let scene = match self.scenes.entry(src.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let (width, height) = first.dims;
                let info = VideoInfo {
                    name: src.to_string(),
                    width,
                    height,
                    ..Default::default()
                };

                entry.insert(scene::Scene::new(info, self.config.clone())?)
            }
        };

        for frame in frames {
            scene.process(frame.index, &frame.detections)?;
        }

        Ok(())
    }

    #[inline]
    fn tracks(&self, src: &str) -> Rc<[Track]> {
        if let Some(scene) = self.scenes.get(src) {
            return scene.tracker().tracks().cloned().collect();
        }

        Rc::new([])
    }
}
