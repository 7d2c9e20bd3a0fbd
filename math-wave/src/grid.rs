//! Symmetric 2D grids centered at the origin

use crate::discretize::{Interval, discretize_within};
use crate::error::{Result, WaveError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Point in the membrane plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    /// x-coordinate
    pub x: f64,
    /// y-coordinate
    pub y: f64,
}

impl Point2 {
    /// Create a point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point
    pub fn distance_to(&self, other: &Point2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether both coordinates are finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Axis `[-m·step, ..., 0, ..., m·step]` with `m·step <= half`
pub fn symmetric_axis(half: f64, step: f64) -> Result<Array1<f64>> {
    let positive = discretize_within(Interval::new(0.0, half), step)?;
    Ok(positive
        .iter()
        .skip(1)
        .rev()
        .map(|&v| -v)
        .chain(positive.iter().copied())
        .collect())
}

/// Regular grid symmetric about `(0, 0)`
///
/// Meshes use matrix indexing: element `(i, j)` sits at `(xs[i], ys[j])`.
#[derive(Debug, Clone)]
pub struct Grid {
    xs: Array1<f64>,
    ys: Array1<f64>,
    x_mesh: Array2<f64>,
    y_mesh: Array2<f64>,
}

impl Grid {
    /// Build a grid of spacing `step` covering at most `[-half_x, half_x] × [-half_y, half_y]`
    pub fn symmetric(half_x: f64, half_y: f64, step: f64) -> Result<Self> {
        let xs = symmetric_axis(half_x, step)?;
        let ys = symmetric_axis(half_y, step)?;
        if xs.len() < 3 || ys.len() < 3 {
            return Err(WaveError::DegenerateGrid {
                lx: 2.0 * half_x,
                ly: 2.0 * half_y,
                dx: step,
            });
        }

        let (nx, ny) = (xs.len(), ys.len());
        let x_mesh = Array2::from_shape_fn((nx, ny), |(i, _)| xs[i]);
        let y_mesh = Array2::from_shape_fn((nx, ny), |(_, j)| ys[j]);

        Ok(Self {
            xs,
            ys,
            x_mesh,
            y_mesh,
        })
    }

    /// x axis
    pub fn xs(&self) -> &Array1<f64> {
        &self.xs
    }

    /// y axis
    pub fn ys(&self) -> &Array1<f64> {
        &self.ys
    }

    /// Coordinate meshes `(x, y)`, each of shape `(n_x, n_y)`
    pub fn mesh(&self) -> (&Array2<f64>, &Array2<f64>) {
        (&self.x_mesh, &self.y_mesh)
    }

    /// `(n_x, n_y)`
    pub fn shape(&self) -> (usize, usize) {
        (self.xs.len(), self.ys.len())
    }

    /// Largest coordinate on each axis
    pub fn half_extents(&self) -> (f64, f64) {
        (self.xs[self.xs.len() - 1], self.ys[self.ys.len() - 1])
    }

    /// Whether `p` lies within the coordinate extents
    pub fn contains(&self, p: Point2) -> bool {
        let (hx, hy) = self.half_extents();
        self.xs[0] <= p.x && p.x <= hx && self.ys[0] <= p.y && p.y <= hy
    }

    /// Euclidean distance from `p` to every grid point
    pub fn distance_field(&self, p: Point2) -> Array2<f64> {
        let mut out = Array2::zeros(self.shape());
        ndarray::Zip::from(&mut out)
            .and(&self.x_mesh)
            .and(&self.y_mesh)
            .for_each(|d, &x, &y| {
                let dx = x - p.x;
                let dy = y - p.y;
                *d = (dx * dx + dy * dy).sqrt();
            });
        out
    }
}
