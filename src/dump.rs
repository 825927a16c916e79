//! Line-oriented detections dump: `<frame>:<json detections>` per line,
//! for example `15:[{"box":[10,10,50,50],"p":0.91}]`.

use std::collections::BTreeMap;
use std::io::BufRead;

use log::warn;

use crate::error::Error;
use crate::Detection;

/// Upper bound on frames driven from a dump that carries no frame count
pub const MAX_FRAMES: u64 = 10_000_000;

/// Reads a dump; malformed lines are logged and skipped, a repeated frame
/// replaces the earlier line
pub fn read_detections<R: BufRead>(reader: R) -> Result<BTreeMap<u64, Vec<Detection>>, Error> {
    let mut frames = BTreeMap::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((frame, dets)) = line.split_once(':') else {
            warn!("line {}: wrong format, expected `:`", lineno + 1);
            continue;
        };

        match (frame.trim().parse::<u64>(), serde_json::from_str(dets)) {
            (Ok(frame), Ok(dets)) => {
                frames.insert(frame, dets);
            }
            (Ok(_), Err(err)) => warn!("line {}: parse json failed: {}", lineno + 1, err),
            (Err(_), _) => warn!("line {}: parse frame index failed", lineno + 1),
        }
    }

    Ok(frames)
}

/// Number of frames to drive for a dump.
///
/// With a known `total_frames`, listed frames at or past it are dropped with
/// a warning. Otherwise the count runs up to the last listed frame, which
/// must stay below [`MAX_FRAMES`].
pub fn frame_count(
    frames: &mut BTreeMap<u64, Vec<Detection>>,
    total_frames: Option<u64>,
) -> Result<u64, Error> {
    match total_frames {
        Some(total) => {
            let dropped = frames.split_off(&total);
            for frame in dropped.keys() {
                warn!(
                    "frame {}: past the last frame {}, detections dropped",
                    frame,
                    total.saturating_sub(1)
                );
            }

            Ok(total)
        }
        None => {
            let Some(&last) = frames.keys().next_back() else {
                return Ok(0);
            };

            match last.checked_add(1) {
                Some(count) if count <= MAX_FRAMES => Ok(count),
                _ => Err(Error::InvalidDump(format!(
                    "frame index {} exceeds the limit of {} frames",
                    last, MAX_FRAMES
                ))),
            }
        }
    }
}
