use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

/// Left-top-right-bottom box in integer pixel coordinates
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BBox([i32; 4]);

impl From<BBox> for [i32; 4] {
    fn from(bbox: BBox) -> Self {
        bbox.0
    }
}

impl From<[i32; 4]> for BBox {
    fn from(slice: [i32; 4]) -> Self {
        BBox(slice)
    }
}

impl BBox {
    #[inline]
    pub fn ltrb(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        BBox([left, top, right, bottom])
    }

    #[inline]
    pub fn as_slice(&self) -> &[i32; 4] {
        &self.0
    }

    #[inline(always)]
    pub fn left(&self) -> i32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> i32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn right(&self) -> i32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn bottom(&self) -> i32 {
        self.0[3]
    }

    /// Width, zero for inverted boxes
    #[inline]
    pub fn width(&self) -> i64 {
        (self.right() as i64 - self.left() as i64).max(0)
    }

    /// Height, zero for inverted boxes
    #[inline]
    pub fn height(&self) -> i64 {
        (self.bottom() as i64 - self.top() as i64).max(0)
    }

    #[inline]
    pub fn area(&self) -> i64 {
        self.width() * self.height()
    }

    /// Integer midpoint, truncated toward zero
    #[inline]
    pub fn center(&self) -> na::Point2<i32> {
        let cx = (self.left() as i64 + self.right() as i64) / 2;
        let cy = (self.top() as i64 + self.bottom() as i64) / 2;

        na::Point2::new(cx as i32, cy as i32)
    }

    pub fn intersection_area(&self, other: &BBox) -> i64 {
        let i_left = self.left().max(other.left()) as i64;
        let i_top = self.top().max(other.top()) as i64;
        let i_right = self.right().min(other.right()) as i64;
        let i_bottom = self.bottom().min(other.bottom()) as i64;

        (i_right - i_left).max(0) * (i_bottom - i_top).max(0)
    }

    /// Intersection over union; 0 when the boxes are disjoint or both degenerate
    pub fn iou(&self, other: &BBox) -> f32 {
        let intersection = self.intersection_area(other);
        let union = self.area() + other.area() - intersection;

        if union <= 0 {
            return 0.0;
        }

        (intersection as f64 / union as f64) as f32
    }

    /// Clips the box into `[0, width] x [0, height]`
    pub fn clamp(&self, width: u32, height: u32) -> BBox {
        let (w, h) = (width.min(i32::MAX as u32) as i32, height.min(i32::MAX as u32) as i32);

        BBox([
            self.left().clamp(0, w),
            self.top().clamp(0, h),
            self.right().clamp(0, w),
            self.bottom().clamp(0, h),
        ])
    }
}
