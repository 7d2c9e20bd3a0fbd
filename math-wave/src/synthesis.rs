//! Field synthesis kernels
//!
//! Two pure building blocks shared by [`Wavepacket`](crate::Wavepacket) and
//! [`Membrane`](crate::Membrane):
//!
//! - [`traveling_wave`]: the complex field of one frequency/dispersion pair
//! - [`radial_interpolate`]: maps a 1D (time × distance) profile onto a 2D
//!   distance field, one time slice at a time

use crate::dispersion::DispersionRelation;
use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayViewMut3, Zip, s};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Complex traveling wave `exp(i (k x - ω t))`
///
/// `k` is the wave number given by `relation` at `frequency` and
/// `ω = 2π frequency`. The result has shape `(time.len(), space.len())`.
pub fn traveling_wave(
    relation: &dyn DispersionRelation,
    frequency: f64,
    space: &Array1<f64>,
    time: &Array1<f64>,
) -> Array2<Complex64> {
    let k = relation.wavenumber(frequency);
    let omega = 2.0 * PI * frequency;
    Array2::from_shape_fn((time.len(), space.len()), |(i, j)| {
        Complex64::from_polar(1.0, k * space[j] - omega * time[i])
    })
}

/// Bracket `x` on a sorted axis.
///
/// Returns the lower sample index and the linear weight of the upper sample.
/// Values outside the axis are clamped to its ends.
fn locate(axis: ArrayView1<f64>, x: f64) -> (usize, f64) {
    let n = axis.len();
    if n < 2 || x <= axis[0] {
        return (0, 0.0);
    }
    if x >= axis[n - 1] {
        return (n - 2, 1.0);
    }
    let (mut lo, mut hi) = (0, n - 1);
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if axis[mid] <= x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let w = (x - axis[lo]) / (axis[hi] - axis[lo]);
    (lo, w)
}

/// Add the radial interpolation of `profile` into `acc`.
///
/// `profile` has shape `(n_time, axis.len())`; `distance` has shape
/// `(n_x, n_y)` and `acc` has shape `(n_x, n_y, n_time)`. Every grid point
/// receives the profile value at its distance, linearly interpolated along
/// `axis`.
///
/// # Panics
///
/// Panics if the shapes disagree.
pub fn accumulate_radial(
    mut acc: ArrayViewMut3<f64>,
    distance: ArrayView2<f64>,
    axis: ArrayView1<f64>,
    profile: ArrayView2<f64>,
) {
    let (nx, ny) = distance.dim();
    let (n_time, n_space) = profile.dim();
    assert_eq!(acc.dim(), (nx, ny, n_time), "accumulator shape mismatch");
    assert_eq!(axis.len(), n_space, "profile/axis length mismatch");
    if n_space == 0 {
        return;
    }

    // One contiguous time series per spatial sample
    let columns = profile.t().as_standard_layout().into_owned();

    for ((i, j), &d) in distance.indexed_iter() {
        let (lo, w) = locate(axis, d);
        let lane = acc.slice_mut(s![i, j, ..]);
        if n_space == 1 || w == 0.0 {
            Zip::from(lane)
                .and(columns.row(lo))
                .for_each(|a, &v| *a += v);
        } else {
            Zip::from(lane)
                .and(columns.row(lo))
                .and(columns.row(lo + 1))
                .for_each(|a, &l, &u| *a += l + w * (u - l));
        }
    }
}

/// Radial interpolation of `profile` over `distance`
///
/// Returns a field of shape `(n_x, n_y, n_time)`. See [`accumulate_radial`].
pub fn radial_interpolate(
    distance: ArrayView2<f64>,
    axis: ArrayView1<f64>,
    profile: ArrayView2<f64>,
) -> Array3<f64> {
    let (nx, ny) = distance.dim();
    let mut out = Array3::zeros((nx, ny, profile.nrows()));
    accumulate_radial(out.view_mut(), distance, axis, profile);
    out
}
