//! One-to-one matching of detections against candidate tracks.
//!
//! Both solvers take an IoU matrix with one row per detection and one column
//! per candidate track and return, for every detection, the column it was
//! matched with. Only pairs whose IoU is strictly above `threshold` are ever
//! returned.

use log::warn;
use munkres::{solve_assignment, WeightMatrix};

const COST_SCALE: i32 = 1_000_000;

/// Row-major IoU matrix, `rows x cols`
pub struct IouMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl IouMatrix {
    pub fn from_fn<F: Fn(usize, usize) -> f32>(rows: usize, cols: usize, f: F) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }

        Self { rows, cols, data }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }
}

/// Highest IoU first. Equal IoUs go to the lower row, then the lower column.
pub fn greedy(ious: &IouMatrix, threshold: f32) -> Vec<Option<usize>> {
    let mut pairs = Vec::new();
    for r in 0..ious.rows() {
        for c in 0..ious.cols() {
            let iou = ious.get(r, c);
            if iou > threshold {
                pairs.push((r, c, iou));
            }
        }
    }

    pairs.sort_by(|a, b| {
        b.2.total_cmp(&a.2)
            .then_with(|| a.0.cmp(&b.0))
            .then_with(|| a.1.cmp(&b.1))
    });

    let mut matched = vec![None; ious.rows()];
    let mut claimed = vec![false; ious.cols()];

    for (r, c, _) in pairs {
        if matched[r].is_none() && !claimed[c] {
            matched[r] = Some(c);
            claimed[c] = true;
        }
    }

    matched
}

/// Maximises the summed IoU over accepted pairs
pub fn hungarian(ious: &IouMatrix, threshold: f32) -> Vec<Option<usize>> {
    if ious.rows() == 0 || ious.cols() == 0 {
        return vec![None; ious.rows()];
    }

    let n = ious.rows().max(ious.cols());

    // integer costs keep the solver's zero tests exact; pairs at or below
    // the threshold cost the same as no match at all
    let mut mat = WeightMatrix::from_fn(n, |(r, c)| {
        if r < ious.rows() && c < ious.cols() {
            let iou = ious.get(r, c);
            if iou > threshold {
                return ((1.0 - iou) * COST_SCALE as f32).round() as i32;
            }
        }

        COST_SCALE
    });

    let solution = solve_assignment(&mut mat)
        .map(|positions| positions.into_iter().map(|p| (p.row, p.column)).collect());

    accept_solution(ious, threshold, solution)
}

/// Keeps the solved pairs that are inside the matrix and above `threshold`;
/// a failed solve falls back to [`greedy`]
fn accept_solution<E: std::fmt::Debug>(
    ious: &IouMatrix,
    threshold: f32,
    solution: Result<Vec<(usize, usize)>, E>,
) -> Vec<Option<usize>> {
    match solution {
        Ok(pairs) => {
            let mut matched = vec![None; ious.rows()];
            for (row, col) in pairs {
                if row < ious.rows() && col < ious.cols() && ious.get(row, col) > threshold {
                    matched[row] = Some(col);
                }
            }

            matched
        }
        Err(err) => {
            warn!("assignment could not be solved ({:?}), falling back to greedy", err);
            greedy(ious, threshold)
        }
    }
}
