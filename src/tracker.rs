use std::collections::BTreeMap;

use log::{debug, trace};
use rand::{rngs::StdRng, SeedableRng};

use crate::assignment::{self, IouMatrix};
use crate::config::{AssignmentPolicy, TrackerConfig};
use crate::error::Error;
use crate::track::{Color, Track};
use crate::{Detection, TrackedDetection};

/// Keyframe IoU tracker.
///
/// Tracks are created for detections that match nothing and are kept for
/// the whole run. A track only takes part in matching while its last update
/// lies within the recency window of the current frame.
pub struct Tracker {
    config: TrackerConfig,
    tracks: BTreeMap<u32, Track>,
    next_track_id: u32,
    last_keyframe: Vec<TrackedDetection>,
    rng: StdRng,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Result<Self, Error> {
        config.validate()?;

        let rng = match config.color_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            config,
            tracks: BTreeMap::new(),
            next_track_id: 0,
            last_keyframe: Vec::new(),
            rng,
        })
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Matches the detections of a keyframe against live tracks.
    ///
    /// The result has one entry per detection, in input order.
    pub fn process_keyframe(
        &mut self,
        frame_index: u64,
        detections: &[Detection],
    ) -> Vec<TrackedDetection> {
        let track_ids = match self.config.assignment {
            AssignmentPolicy::FirstCome => self.assign_first_come(frame_index, detections),
            policy => self.assign_one_to_one(frame_index, detections, policy),
        };

        let tracked: Vec<_> = detections
            .iter()
            .zip(track_ids)
            .map(|(det, track_id)| TrackedDetection {
                bbox: det.bbox,
                confidence: det.confidence,
                track_id,
            })
            .collect();

        trace!(
            "frame {}: {} detections, {} tracks",
            frame_index,
            tracked.len(),
            self.tracks.len()
        );

        self.last_keyframe = tracked.clone();

        tracked
    }

    /// Frame between keyframes; tracks are left untouched
    pub fn skip_frame(&mut self, frame_index: u64) -> Vec<TrackedDetection> {
        trace!("frame {}: skipped", frame_index);

        if self.config.carry_forward_between_keyframes {
            self.last_keyframe.clone()
        } else {
            Vec::new()
        }
    }

    fn assign_one_to_one(
        &mut self,
        frame_index: u64,
        detections: &[Detection],
        policy: AssignmentPolicy,
    ) -> Vec<u32> {
        let candidates: Vec<(u32, _)> = self
            .active_tracks(frame_index)
            .filter_map(|t| Some((t.track_id, *t.last_box()?)))
            .collect();

        let ious = IouMatrix::from_fn(detections.len(), candidates.len(), |r, c| {
            detections[r].bbox.iou(&candidates[c].1)
        });

        let threshold = self.config.iou_acceptance_threshold;
        let matched = match policy {
            AssignmentPolicy::Hungarian => assignment::hungarian(&ious, threshold),
            _ => assignment::greedy(&ious, threshold),
        };

        detections
            .iter()
            .zip(matched)
            .map(|(det, m)| match m {
                Some(c) => {
                    let track_id = candidates[c].0;
                    self.append(track_id, frame_index, det);
                    track_id
                }
                None => self.spawn(frame_index, det),
            })
            .collect()
    }

    fn assign_first_come(&mut self, frame_index: u64, detections: &[Detection]) -> Vec<u32> {
        let threshold = self.config.iou_acceptance_threshold;

        detections
            .iter()
            .map(|det| {
                let mut best: Option<(u32, f32)> = None;

                for track in self.active_tracks(frame_index) {
                    let Some(last) = track.last_box() else {
                        continue;
                    };

                    let iou = det.bbox.iou(last);
                    if iou > threshold && best.map_or(true, |(_, b)| iou > b) {
                        best = Some((track.track_id, iou));
                    }
                }

                match best {
                    Some((track_id, _)) => {
                        self.append(track_id, frame_index, det);
                        track_id
                    }
                    None => self.spawn(frame_index, det),
                }
            })
            .collect()
    }

    fn append(&mut self, track_id: u32, frame_index: u64, det: &Detection) {
        if let Some(track) = self.tracks.get_mut(&track_id) {
            track.push(frame_index, det.bbox);
        }
    }

    fn spawn(&mut self, frame_index: u64, det: &Detection) -> u32 {
        let track_id = self.next_track_id;
        self.next_track_id += 1;

        let mut track = Track::new(
            track_id,
            Color::random(&mut self.rng),
            frame_index,
            self.config.max_history,
        );
        track.push(frame_index, det.bbox);

        debug!(
            "new track {} at frame {} {:?}",
            track_id,
            frame_index,
            det.bbox.as_slice()
        );

        self.tracks.insert(track_id, track);

        track_id
    }

    /// Tracks still eligible for matching at `frame_index`
    pub fn active_tracks(&self, frame_index: u64) -> impl Iterator<Item = &Track> {
        let window = self.config.recency_window();

        self.tracks
            .values()
            .filter(move |t| t.last_frame().saturating_add(window) >= frame_index)
    }

    /// Tracks whose last update happened on `frame_index`
    pub fn updated_at(&self, frame_index: u64) -> impl Iterator<Item = &Track> {
        self.tracks
            .values()
            .filter(move |t| t.last_frame() == frame_index)
    }

    /// All tracks ever created, by id
    #[inline]
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    #[inline]
    pub fn track(&self, track_id: u32) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[inline]
    pub fn next_track_id(&self) -> u32 {
        self.next_track_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BBox;

    fn new_tracker(frame_interval: u64, assignment: AssignmentPolicy) -> Tracker {
        Tracker::new(TrackerConfig {
            frame_interval,
            assignment,
            color_seed: Some(42),
            ..Default::default()
        })
        .unwrap()
    }

    fn ids(tracked: &[TrackedDetection]) -> Vec<u32> {
        tracked.iter().map(|t| t.track_id).collect()
    }

    #[test]
    fn test_overlapping_keyframes_share_track() {
        let mut tracker = new_tracker(5, AssignmentPolicy::Greedy);

        let out = tracker.process_keyframe(0, &[Detection::ltrb(10, 10, 50, 50, 0.9)]);
        assert_eq!(ids(&out), vec![0]);

        let out = tracker.process_keyframe(5, &[Detection::ltrb(12, 11, 52, 49, 0.8)]);
        assert_eq!(ids(&out), vec![0]);
        assert_eq!(out[0].bbox, BBox::ltrb(12, 11, 52, 49));
        assert_eq!(out[0].confidence, 0.8);

        assert_eq!(tracker.len(), 1);
        let track = tracker.track(0).unwrap();
        assert_eq!(track.len(), 2);
        assert_eq!(track.last_frame(), 5);
    }

    #[test]
    fn test_stale_track_is_not_matched() {
        for policy in [
            AssignmentPolicy::Greedy,
            AssignmentPolicy::Hungarian,
            AssignmentPolicy::FirstCome,
        ] {
            let mut tracker = new_tracker(5, policy);
            tracker.process_keyframe(0, &[Detection::ltrb(0, 0, 30, 10, 0.9)]);

            // 20/40 overlap, IoU 0.5, but 11 frames later
            let out = tracker.process_keyframe(11, &[Detection::ltrb(10, 0, 40, 10, 0.9)]);
            assert_eq!(ids(&out), vec![1], "{:?}", policy);

            // the stale track is kept
            assert_eq!(tracker.len(), 2);
            assert_eq!(tracker.track(0).unwrap().last_frame(), 0);
        }
    }

    #[test]
    fn test_window_edge_is_inclusive() {
        let mut tracker = new_tracker(5, AssignmentPolicy::Greedy);
        tracker.process_keyframe(0, &[Detection::ltrb(0, 0, 30, 10, 0.9)]);

        let out = tracker.process_keyframe(10, &[Detection::ltrb(10, 0, 40, 10, 0.9)]);
        assert_eq!(ids(&out), vec![0]);
    }

    #[test]
    fn test_two_weak_overlaps_one_track() {
        // track box 100x100; candidate IoUs 0.35 and 0.4
        let track_box = Detection::ltrb(0, 0, 100, 100, 0.9);
        let weak = Detection::ltrb(0, 0, 35, 100, 0.5);
        let strong = Detection::ltrb(0, 0, 40, 100, 0.5);
        assert!((weak.iou(&track_box) - 0.35).abs() < 1e-6);
        assert!((strong.iou(&track_box) - 0.4).abs() < 1e-6);

        for policy in [AssignmentPolicy::Greedy, AssignmentPolicy::Hungarian] {
            let mut tracker = new_tracker(5, policy);
            tracker.process_keyframe(0, &[track_box]);

            let out = tracker.process_keyframe(5, &[weak, strong]);
            assert_eq!(ids(&out), vec![1, 0], "{:?}", policy);
            assert_eq!(tracker.track(0).unwrap().last_box(), Some(&strong.bbox));
        }
    }

    #[test]
    fn test_first_come_lets_detections_share_a_track() {
        let mut tracker = new_tracker(5, AssignmentPolicy::FirstCome);
        tracker.process_keyframe(0, &[Detection::ltrb(0, 0, 100, 100, 0.9)]);

        let out = tracker.process_keyframe(
            5,
            &[
                Detection::ltrb(0, 0, 35, 100, 0.5),
                Detection::ltrb(0, 0, 40, 100, 0.5),
            ],
        );

        // the second detection compares against the first one's box now
        assert_eq!(ids(&out), vec![0, 0]);
        assert_eq!(tracker.track(0).unwrap().len(), 3);
    }

    #[test]
    fn test_first_come_matches_tracks_born_in_same_frame() {
        let mut tracker = new_tracker(5, AssignmentPolicy::FirstCome);
        let out = tracker.process_keyframe(
            0,
            &[
                Detection::ltrb(0, 0, 10, 10, 0.9),
                Detection::ltrb(0, 0, 10, 10, 0.8),
            ],
        );
        assert_eq!(ids(&out), vec![0, 0]);

        let mut tracker = new_tracker(5, AssignmentPolicy::Greedy);
        let out = tracker.process_keyframe(
            0,
            &[
                Detection::ltrb(0, 0, 10, 10, 0.9),
                Detection::ltrb(0, 0, 10, 10, 0.8),
            ],
        );
        assert_eq!(ids(&out), vec![0, 1]);
    }

    #[test]
    fn test_ids_are_monotonic_and_fresh() {
        let mut tracker = new_tracker(5, AssignmentPolicy::Greedy);
        let mut seen = Vec::new();

        for (i, frame) in (0..50u64).step_by(5).enumerate() {
            let x = i as i32 * 1000;
            let out = tracker.process_keyframe(
                frame,
                &[
                    Detection::ltrb(x, 0, x + 10, 10, 0.9),
                    Detection::ltrb(x + 500, 0, x + 510, 10, 0.9),
                ],
            );

            for id in ids(&out) {
                assert!(!seen.contains(&id));
                assert!(seen.last().map_or(true, |&last| id > last));
                seen.push(id);
            }
        }

        assert_eq!(tracker.next_track_id(), 20);
        assert_eq!(tracker.len(), 20);
    }

    #[test]
    fn test_empty_keyframe_is_noop() {
        let mut tracker = new_tracker(5, AssignmentPolicy::Greedy);
        assert!(tracker.process_keyframe(0, &[]).is_empty());
        assert!(tracker.is_empty());
        assert_eq!(tracker.next_track_id(), 0);
    }

    #[test]
    fn test_zero_area_detections_never_match() {
        let mut tracker = new_tracker(5, AssignmentPolicy::Greedy);
        tracker.process_keyframe(0, &[Detection::ltrb(5, 5, 5, 5, 0.9)]);
        let out = tracker.process_keyframe(5, &[Detection::ltrb(5, 5, 5, 5, 0.9)]);

        assert_eq!(ids(&out), vec![1]);
    }

    #[test]
    fn test_skip_frame() {
        let mut tracker = new_tracker(5, AssignmentPolicy::Greedy);
        tracker.process_keyframe(0, &[Detection::ltrb(10, 10, 50, 50, 0.9)]);
        assert!(tracker.skip_frame(1).is_empty());
        assert_eq!(tracker.track(0).unwrap().len(), 1);

        let mut tracker = Tracker::new(TrackerConfig {
            carry_forward_between_keyframes: true,
            color_seed: Some(1),
            ..Default::default()
        })
        .unwrap();
        let keyframe = tracker.process_keyframe(0, &[Detection::ltrb(10, 10, 50, 50, 0.9)]);
        assert_eq!(tracker.skip_frame(1), keyframe);
        assert_eq!(tracker.skip_frame(2), keyframe);
        assert_eq!(tracker.track(0).unwrap().len(), 1);
    }

    #[test]
    fn test_history_stays_aligned() {
        let mut tracker = new_tracker(1, AssignmentPolicy::Greedy);
        for frame in 0..30u64 {
            let x = frame as i32;
            tracker.process_keyframe(
                frame,
                &[
                    Detection::ltrb(x, 0, x + 20, 20, 0.9),
                    Detection::ltrb(x + 200, 0, x + 220, 20, 0.9),
                ],
            );
        }

        assert_eq!(tracker.len(), 2);
        for track in tracker.tracks() {
            assert_eq!(track.boxes().len(), track.centers().len());
            assert_eq!(track.len(), 30);
            assert_eq!(track.points().last().unwrap().frame, track.last_frame());
        }
        assert_eq!(tracker.updated_at(29).count(), 2);
        assert_eq!(tracker.active_tracks(100).count(), 0);
    }

    #[test]
    fn test_colors_stable_per_track() {
        let mut tracker = new_tracker(5, AssignmentPolicy::Greedy);
        tracker.process_keyframe(0, &[Detection::ltrb(10, 10, 50, 50, 0.9)]);
        let color = tracker.track(0).unwrap().color;

        tracker.process_keyframe(5, &[Detection::ltrb(11, 10, 51, 50, 0.9)]);
        assert_eq!(tracker.track(0).unwrap().color, color);
    }
}
