//! Finite vibrating membranes
//!
//! A [`Membrane`] is a rectangle centered at the origin whose displacement
//! is the superposition of radially spread wavepackets. Every source is
//! registered as a [`Placement`]: a private copy of the wavepacket whose 1D
//! domain exactly spans the distances from the source to the grid, plus the
//! precomputed distance field used to spread the 1D profile over the grid.
//!
//! With a reflective [`Boundary`], image sources obtained by mirroring the
//! real source across the edges are registered as additional placements.
//!
//! # Example
//!
//! ```rust
//! use math_audio_wave::{Boundary, Membrane, Wavepacket};
//!
//! let packet = Wavepacket::builder()
//!     .dispersion(|f: f64| f)
//!     .frequency(1.0)
//!     .build()
//!     .unwrap();
//!
//! let mut membrane = Membrane::builder(10.0, 0.1, (2.0, 2.0), 1.0)
//!     .boundary(Boundary::Free)
//!     .source(packet, (0.2, 0.3))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(membrane.reflected_sources().len(), 4);
//! membrane.eval().unwrap();
//! assert_eq!(membrane.data().unwrap().dim(), (21, 21, 11));
//! ```

use crate::discretize::{Interval, axis_bounds, discretize, positive};
use crate::error::{Result, WaveError};
use crate::grid::{Grid, Point2};
use crate::reflection::{Boundary, image_sources};
use crate::synthesis::accumulate_radial;
use crate::wavepacket::{NORMALIZATION_FLOOR, Wavepacket};
use ndarray::{Array1, Array2, Array3, ArrayViewMut3};

/// A wavepacket bound to a position on the membrane
#[derive(Debug, Clone)]
pub struct Placement {
    packet: Wavepacket,
    position: Point2,
    distance: Array2<f64>,
}

impl Placement {
    /// The placement's own copy of the wavepacket
    pub fn packet(&self) -> &Wavepacket {
        &self.packet
    }

    /// Source position
    pub fn position(&self) -> Point2 {
        self.position
    }

    /// Distance from the source to every grid point
    pub fn distance(&self) -> &Array2<f64> {
        &self.distance
    }

    /// Evaluate the wavepacket, spread it over the grid into `acc`, then
    /// release the wavepacket field.
    fn fold_into(&mut self, acc: ArrayViewMut3<f64>) -> Result<()> {
        let n_time = acc.dim().2;
        self.packet.eval(false)?;
        let profile = self.packet.data();
        self.packet.purge();

        let profile = profile.ok_or(WaveError::Unconfigured("evaluated field"))?;
        if profile.nrows() != n_time {
            return Err(WaveError::ShapeMismatch {
                expected: n_time,
                found: profile.nrows(),
            });
        }

        accumulate_radial(
            acc,
            self.distance.view(),
            self.packet.space().view(),
            profile.view(),
        );
        Ok(())
    }
}

/// Builder for [`Membrane`]
pub struct MembraneBuilder {
    sampling_frequency: f64,
    spatial_step: f64,
    size: (f64, f64),
    time: Interval,
    normalize: bool,
    boundary: Boundary,
    parallel: bool,
    sources: Vec<(Wavepacket, Point2)>,
}

impl MembraneBuilder {
    /// Scale the field to a unit peak (default: true)
    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Boundary condition (default: transparent)
    pub fn boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Evaluate placements on the rayon pool (default: false)
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Add a source at `position`
    pub fn source<P: Into<Point2>>(mut self, packet: Wavepacket, position: P) -> Self {
        self.sources.push((packet, position.into()));
        self
    }

    /// Validate, build the grid and register the sources
    pub fn build(self) -> Result<Membrane> {
        let mut membrane = Membrane::new(
            self.sampling_frequency,
            self.spatial_step,
            self.size,
            self.time,
            self.normalize,
            self.boundary,
        )?;
        membrane.set_parallel(self.parallel);
        for (packet, position) in &self.sources {
            membrane.add_source(packet, *position)?;
        }
        Ok(membrane)
    }
}

/// Finite rectangular membrane driven by wavepackets
#[derive(Debug, Clone)]
pub struct Membrane {
    sampling_frequency: f64,
    spatial_step: f64,
    time_boundary: Interval,
    time: Array1<f64>,
    grid: Grid,
    boundary: Boundary,
    normalize: bool,
    parallel: bool,
    sources: Vec<Placement>,
    reflected_sources: Vec<Placement>,
    results: Option<Array3<f64>>,
}

impl Membrane {
    /// Start building a membrane.
    ///
    /// `size` is `(Lx, Ly)` in meters; `time` is the travel time in seconds
    /// (a scalar `T` means `[0, T]`).
    pub fn builder<T: Into<Interval>>(
        sampling_frequency: f64,
        spatial_step: f64,
        size: (f64, f64),
        time: T,
    ) -> MembraneBuilder {
        MembraneBuilder {
            sampling_frequency,
            spatial_step,
            size,
            time: time.into(),
            normalize: true,
            boundary: Boundary::Transparent,
            parallel: false,
            sources: Vec::new(),
        }
    }

    /// Create a membrane without sources
    pub fn new<T: Into<Interval>>(
        sampling_frequency: f64,
        spatial_step: f64,
        size: (f64, f64),
        time: T,
        normalize: bool,
        boundary: Boundary,
    ) -> Result<Self> {
        let sampling_frequency = positive("sampling frequency", sampling_frequency)?;
        let spatial_step = positive("spatial step", spatial_step)?;
        let (lx, ly) = size;
        if !(lx.is_finite() && ly.is_finite() && lx > 0.0 && ly > 0.0) {
            return Err(WaveError::InvalidDomain { lx, ly });
        }
        if let Boundary::Order(0) = boundary {
            return Err(WaveError::InvalidBoundary("0".to_string()));
        }
        let time_boundary = time.into().validated("time")?;

        let time = discretize(time_boundary, 1.0 / sampling_frequency)?;
        let time_boundary = axis_bounds(&time).unwrap_or(time_boundary);
        let grid = Grid::symmetric(lx / 2.0, ly / 2.0, spatial_step)?;

        log::debug!(
            "membrane grid {:?} (requested {} x {}), {} time samples",
            grid.shape(),
            lx,
            ly,
            time.len()
        );

        Ok(Self {
            sampling_frequency,
            spatial_step,
            time_boundary,
            time,
            grid,
            boundary,
            normalize,
            parallel: false,
            sources: Vec::new(),
            reflected_sources: Vec::new(),
            results: None,
        })
    }

    /// Sampling frequency (Hz)
    pub fn sampling_frequency(&self) -> f64 {
        self.sampling_frequency
    }

    /// Spatial step (m)
    pub fn spatial_step(&self) -> f64 {
        self.spatial_step
    }

    /// Realized time interval
    pub fn time_boundary(&self) -> Interval {
        self.time_boundary
    }

    /// Time axis
    pub fn time(&self) -> &Array1<f64> {
        &self.time
    }

    /// Grid
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// x axis of the grid
    pub fn xs(&self) -> &Array1<f64> {
        self.grid.xs()
    }

    /// y axis of the grid
    pub fn ys(&self) -> &Array1<f64> {
        self.grid.ys()
    }

    /// Realized size `(Lx, Ly)`: twice the largest grid coordinate
    pub fn domain(&self) -> (f64, f64) {
        let (hx, hy) = self.grid.half_extents();
        (2.0 * hx, 2.0 * hy)
    }

    /// Half extents `(Dx, Dy)`
    pub fn half_extents(&self) -> (f64, f64) {
        self.grid.half_extents()
    }

    /// Boundary condition
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Whether the field is scaled to a unit peak
    pub fn normalize(&self) -> bool {
        self.normalize
    }

    /// Enable or disable normalization for the next evaluation
    pub fn set_normalize(&mut self, normalize: bool) {
        self.normalize = normalize;
    }

    /// Whether placements are evaluated on the rayon pool
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Evaluate placements on the rayon pool.
    ///
    /// Each worker keeps its own accumulator, so peak memory grows with the
    /// number of threads. Without the `parallel` feature this is ignored.
    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    /// Real sources
    pub fn sources(&self) -> &[Placement] {
        &self.sources
    }

    /// Image sources
    pub fn reflected_sources(&self) -> &[Placement] {
        &self.reflected_sources
    }

    /// Total number of placements
    pub fn placement_count(&self) -> usize {
        self.sources.len() + self.reflected_sources.len()
    }

    /// Add a source at `position`.
    ///
    /// The real placement is always registered; with a reflective boundary
    /// its images are registered as well. Nothing is registered if any
    /// image position cannot be classified.
    pub fn add_source<P: Into<Point2>>(&mut self, source: &Wavepacket, position: P) -> Result<()> {
        let position = position.into();
        if !position.is_finite() {
            return Err(WaveError::InvalidPosition {
                x: position.x,
                y: position.y,
            });
        }

        let images = image_sources(
            position,
            self.grid.half_extents(),
            self.boundary.image_order(),
        )?;

        let real = self.place(source, position)?;
        let reflected = images
            .into_iter()
            .map(|p| self.place(source, p))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "source at ({}, {}): {} image sources ({} boundary)",
            position.x,
            position.y,
            reflected.len(),
            self.boundary
        );

        self.sources.push(real);
        self.reflected_sources.extend(reflected);
        Ok(())
    }

    /// Bind a private copy of `source` to `position`
    fn place(&self, source: &Wavepacket, position: Point2) -> Result<Placement> {
        let distance = self.grid.distance_field(position);
        let d_max = distance.iter().copied().fold(0.0, f64::max);
        let d_min = if self.grid.contains(position) {
            0.0
        } else {
            distance.iter().copied().fold(f64::INFINITY, f64::min)
        };

        let mut packet = source.clone();
        packet.purge();
        packet.set_spatial_step(self.spatial_step)?;
        packet.set_sampling_frequency(self.sampling_frequency)?;
        packet.set_space_boundary((d_min, d_max))?;
        packet.set_time_boundary(self.time_boundary)?;

        Ok(Placement {
            packet,
            position,
            distance,
        })
    }

    /// Evaluate the displacement of the membrane.
    ///
    /// Recomputes the field from every placement. The stored result is
    /// replaced only when the whole evaluation succeeds.
    pub fn eval(&mut self) -> Result<()> {
        let (nx, ny) = self.grid.shape();
        let shape = (nx, ny, self.time.len());

        let mut data = if self.parallel {
            self.accumulate_parallel(shape)?
        } else {
            self.accumulate_sequential(shape)?
        };

        let peak = data.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        if self.normalize {
            if peak >= NORMALIZATION_FLOOR {
                data.mapv_inplace(|v| v / peak);
            } else if self.placement_count() > 0 {
                log::warn!("membrane field is null (peak {peak:e}), normalization skipped");
            }
        }

        log::info!(
            "membrane evaluated: {} placements ({} images), field {:?}, peak {:.3e}",
            self.placement_count(),
            self.reflected_sources.len(),
            shape,
            peak
        );

        self.results = Some(data);
        Ok(())
    }

    fn accumulate_sequential(&mut self, shape: (usize, usize, usize)) -> Result<Array3<f64>> {
        let mut acc = Array3::zeros(shape);
        for placement in self
            .sources
            .iter_mut()
            .chain(self.reflected_sources.iter_mut())
        {
            placement.fold_into(acc.view_mut())?;
        }
        Ok(acc)
    }

    #[cfg(feature = "parallel")]
    fn accumulate_parallel(&mut self, shape: (usize, usize, usize)) -> Result<Array3<f64>> {
        use rayon::prelude::*;

        self.sources
            .par_iter_mut()
            .chain(self.reflected_sources.par_iter_mut())
            .try_fold(
                || Array3::zeros(shape),
                |mut acc: Array3<f64>, placement: &mut Placement| -> Result<Array3<f64>> {
                    placement.fold_into(acc.view_mut())?;
                    Ok(acc)
                },
            )
            .try_reduce(|| Array3::zeros(shape), |a, b| Ok(a + b))
    }

    #[cfg(not(feature = "parallel"))]
    fn accumulate_parallel(&mut self, shape: (usize, usize, usize)) -> Result<Array3<f64>> {
        self.accumulate_sequential(shape)
    }

    /// Displacement field of the last evaluation, shape `(n_x, n_y, n_time)`
    pub fn data(&self) -> Option<&Array3<f64>> {
        self.results.as_ref()
    }
}
