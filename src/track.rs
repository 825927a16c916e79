use nalgebra as na;
use rand::Rng;
use serde_derive::{Deserialize, Serialize};

use crate::bbox::BBox;
use crate::circular_queue::CircularQueue;

/// Display color of a track, RGB
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Color([
            rng.random_range(0..255),
            rng.random_range(0..255),
            rng.random_range(0..255),
        ])
    }
}

/// One matched keyframe of a track
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub frame: u64,
    #[serde(rename = "box")]
    pub bbox: BBox,
    pub center: [i32; 2],
}

impl TrackPoint {
    pub fn new(frame: u64, bbox: BBox) -> Self {
        let center = bbox.center();

        Self {
            frame,
            bbox,
            center: [center.x, center.y],
        }
    }

    #[inline]
    pub fn center_point(&self) -> na::Point2<i32> {
        na::Point2::new(self.center[0], self.center[1])
    }
}

#[derive(Debug, Clone)]
pub struct Track {
    pub track_id: u32,
    pub color: Color,
    last_frame: u64,
    history: CircularQueue<TrackPoint>,
}

impl Track {
    pub(crate) fn new(track_id: u32, color: Color, frame: u64, max_history: Option<usize>) -> Self {
        let history = match max_history {
            Some(cap) => CircularQueue::with_capacity(cap),
            None => CircularQueue::unbounded(),
        };

        Self {
            track_id,
            color,
            last_frame: frame,
            history,
        }
    }

    pub(crate) fn push(&mut self, frame: u64, bbox: BBox) {
        self.history.push(TrackPoint::new(frame, bbox));
        self.last_frame = frame;
    }

    /// Frame of the most recent matched detection
    #[inline]
    pub fn last_frame(&self) -> u64 {
        self.last_frame
    }

    #[inline]
    pub fn last_box(&self) -> Option<&BBox> {
        self.history.top().map(|p| &p.bbox)
    }

    #[inline]
    pub fn last_point(&self) -> Option<&TrackPoint> {
        self.history.top()
    }

    /// Number of retained history points
    #[inline]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// History, oldest first
    #[inline]
    pub fn points(&self) -> impl DoubleEndedIterator<Item = &TrackPoint> + ExactSizeIterator {
        self.history.asc_iter()
    }

    #[inline]
    pub fn boxes(&self) -> impl DoubleEndedIterator<Item = BBox> + ExactSizeIterator + '_ {
        self.points().map(|p| p.bbox)
    }

    #[inline]
    pub fn centers(
        &self,
    ) -> impl DoubleEndedIterator<Item = na::Point2<i32>> + ExactSizeIterator + '_ {
        self.points().map(|p| p.center_point())
    }

    /// Up to the last `n` centers, oldest first
    pub fn trail(&self, n: usize) -> Vec<na::Point2<i32>> {
        let mut trail: Vec<_> = self.history.iter().take(n).map(|p| p.center_point()).collect();
        trail.reverse();
        trail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_push_keeps_boxes_and_centers_aligned() {
        let mut track = Track::new(0, Color([1, 2, 3]), 0, None);
        track.push(0, BBox::ltrb(10, 10, 50, 50));
        track.push(5, BBox::ltrb(12, 11, 52, 49));

        assert_eq!(track.boxes().len(), track.centers().len());
        assert_eq!(track.len(), 2);
        assert_eq!(track.last_frame(), 5);
        assert_eq!(track.last_box(), Some(&BBox::ltrb(12, 11, 52, 49)));
        assert_eq!(
            track.centers().collect::<Vec<_>>(),
            vec![na::Point2::new(30, 30), na::Point2::new(32, 30)]
        );
    }

    #[test]
    fn test_capped_history() {
        let mut track = Track::new(3, Color([0, 0, 0]), 0, Some(2));
        for frame in 0..4u64 {
            let x = frame as i32 * 10;
            track.push(frame * 5, BBox::ltrb(x, 0, x + 10, 10));
        }

        assert_eq!(track.len(), 2);
        assert_eq!(track.last_frame(), 15);
        assert_eq!(
            track.points().map(|p| p.frame).collect::<Vec<_>>(),
            vec![10, 15]
        );
        assert_eq!(track.boxes().len(), track.centers().len());
    }

    #[test]
    fn test_trail() {
        let mut track = Track::new(0, Color([0, 0, 0]), 0, None);
        for i in 0..5 {
            track.push(i, BBox::ltrb(i as i32 * 2, 0, i as i32 * 2 + 2, 2));
        }

        assert_eq!(
            track.trail(2),
            vec![na::Point2::new(7, 1), na::Point2::new(9, 1)]
        );
        assert_eq!(track.trail(20).len(), 5);
    }

    #[test]
    fn test_seeded_colors_are_stable() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(Color::random(&mut a), Color::random(&mut b));
    }
}
