use std::collections::BTreeMap;
use std::io::Write;

use serde_derive::{Deserialize, Serialize};

use crate::error::Error;
use crate::frame::FrameRecord;
use crate::track::TrackPoint;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct VideoInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub total_frames: u64,
    pub frame_interval: u64,
}

/// Per-frame and per-track records of one video.
///
/// Map keys are written as strings (`"15"`), as JSON objects require.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Export {
    pub video_info: VideoInfo,
    pub frames: BTreeMap<u64, FrameRecord>,
    pub tracks: BTreeMap<u32, Vec<TrackPoint>>,
}

impl Export {
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), Error> {
        serde_json::to_writer_pretty(writer, self)?;

        Ok(())
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(src: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(src)?)
    }
}
