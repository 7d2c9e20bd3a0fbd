//! 1D dispersive wavepackets
//!
//! A [`Wavepacket`] superposes traveling waves, one per (frequency,
//! dispersion relation) pair, on a discretized `(time × space)` domain:
//!
//! ```text
//! u(t, x) = Σ_f Σ_d exp(i (k_d(f) x - 2π f t))
//! ```
//!
//! The field is optionally normalized to a unit peak and shaped by a
//! spatial envelope. The physical displacement is `-Im(u)`.
//!
//! The physics (spectrum, dispersion relations, envelope, normalization
//! flag) lives in a shared [`Physics`] value, so cloning a wavepacket to
//! place it somewhere else does not duplicate it.
//!
//! # Example
//!
//! ```rust
//! use math_audio_wave::Wavepacket;
//!
//! let mut packet = Wavepacket::builder()
//!     .dispersion(|f: f64| f)
//!     .frequency(1.0)
//!     .sampling_frequency(10.0)
//!     .spatial_step(0.1)
//!     .space_boundary(1.0)
//!     .time_boundary(1.0)
//!     .build()
//!     .unwrap();
//!
//! packet.eval(false).unwrap();
//! let data = packet.data().unwrap();
//! assert_eq!(data.dim(), (11, 11));
//! ```

use crate::discretize::{Interval, axis_bounds, collect_sequence, discretize, positive};
use crate::dispersion::DispersionRelation;
use crate::envelope::Envelope;
use crate::error::{Result, WaveError};
use crate::synthesis::traveling_wave;
use ndarray::{Array1, Array2, Axis, Zip};
use num_complex::Complex64;
use std::fmt;
use std::sync::Arc;

/// Peaks below this value are left unscaled by normalization
pub const NORMALIZATION_FLOOR: f64 = 1e-24;

/// Shared, immutable description of what a wavepacket radiates
#[derive(Clone)]
pub struct Physics {
    spectrum: Vec<f64>,
    dispersion: Vec<Arc<dyn DispersionRelation>>,
    envelope: Option<Arc<dyn Envelope>>,
    normalize: bool,
}

impl fmt::Debug for Physics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Physics")
            .field("spectrum", &self.spectrum)
            .field("dispersion_relations", &self.dispersion.len())
            .field("envelope", &self.envelope.is_some())
            .field("normalize", &self.normalize)
            .finish()
    }
}

fn validate_spectrum<I: IntoIterator<Item = f64>>(freqs: I) -> Result<Vec<f64>> {
    collect_sequence(
        freqs,
        |f: &f64| f.is_finite(),
        |index, &value| WaveError::InvalidFrequency { index, value },
        || Ok(()),
    )
}

fn validate_dispersion(
    relations: Vec<Arc<dyn DispersionRelation>>,
) -> Result<Vec<Arc<dyn DispersionRelation>>> {
    collect_sequence(
        relations,
        |_| true,
        |_, _| WaveError::EmptyDispersion,
        || Err(WaveError::EmptyDispersion),
    )
}

impl Physics {
    /// Frequencies of the spectrum (Hz)
    pub fn spectrum(&self) -> &[f64] {
        &self.spectrum
    }

    /// Dispersion relations
    pub fn dispersion(&self) -> &[Arc<dyn DispersionRelation>] {
        &self.dispersion
    }

    /// Whether the field is scaled to a unit peak
    pub fn normalize(&self) -> bool {
        self.normalize
    }

    /// Whether a spatial envelope is applied
    pub fn has_envelope(&self) -> bool {
        self.envelope.is_some()
    }

    /// Synthesize the complex field on the given axes.
    ///
    /// Returns an array of shape `(time.len(), space.len())`. An empty
    /// spectrum yields a null field.
    pub fn synthesize(&self, space: &Array1<f64>, time: &Array1<f64>) -> Array2<Complex64> {
        let mut field = Array2::<Complex64>::zeros((time.len(), space.len()));

        for &f in &self.spectrum {
            for relation in &self.dispersion {
                field += &traveling_wave(relation.as_ref(), f, space, time);
            }
        }

        if self.normalize {
            let peak = field.iter().map(|z| z.norm()).fold(0.0, f64::max);
            if peak >= NORMALIZATION_FLOOR {
                field.mapv_inplace(|z| z / peak);
            } else if self.spectrum.is_empty() || self.dispersion.is_empty() {
                log::debug!("wavepacket has no spectral content, normalization skipped");
            } else {
                log::warn!("wavepacket field is null (peak {peak:e}), normalization skipped");
            }
        }

        // Applied after normalization: one factor per spatial sample
        if let Some(envelope) = &self.envelope {
            let factors = space.mapv(|x| envelope.amplitude(x));
            for row in field.axis_iter_mut(Axis(0)) {
                Zip::from(row).and(&factors).for_each(|z, &a| *z *= a);
            }
        }

        field
    }
}

/// Builder for [`Wavepacket`]
pub struct WavepacketBuilder {
    spectrum: Vec<f64>,
    dispersion: Vec<Arc<dyn DispersionRelation>>,
    envelope: Option<Arc<dyn Envelope>>,
    normalize: bool,
    sampling_frequency: Option<f64>,
    spatial_step: Option<f64>,
    space_boundary: Option<Interval>,
    time_boundary: Option<Interval>,
}

impl Default for WavepacketBuilder {
    fn default() -> Self {
        Self {
            spectrum: Vec::new(),
            dispersion: Vec::new(),
            envelope: None,
            normalize: true,
            sampling_frequency: None,
            spatial_step: None,
            space_boundary: None,
            time_boundary: None,
        }
    }
}

impl WavepacketBuilder {
    /// Add a dispersion relation
    pub fn dispersion<D: DispersionRelation + 'static>(mut self, relation: D) -> Self {
        self.dispersion.push(Arc::new(relation));
        self
    }

    /// Add an already shared dispersion relation
    pub fn dispersion_shared(mut self, relation: Arc<dyn DispersionRelation>) -> Self {
        self.dispersion.push(relation);
        self
    }

    /// Add one frequency (Hz) to the spectrum
    pub fn frequency(mut self, frequency: f64) -> Self {
        self.spectrum.push(frequency);
        self
    }

    /// Add several frequencies (Hz) to the spectrum
    pub fn spectrum<I: IntoIterator<Item = f64>>(mut self, frequencies: I) -> Self {
        self.spectrum.extend(frequencies);
        self
    }

    /// Set the spatial envelope
    pub fn envelope<E: Envelope + 'static>(mut self, envelope: E) -> Self {
        self.envelope = Some(Arc::new(envelope));
        self
    }

    /// Set an already shared spatial envelope
    pub fn envelope_shared(mut self, envelope: Arc<dyn Envelope>) -> Self {
        self.envelope = Some(envelope);
        self
    }

    /// Scale the field to a unit peak (default: true)
    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Sampling frequency (Hz)
    pub fn sampling_frequency(mut self, fs: f64) -> Self {
        self.sampling_frequency = Some(fs);
        self
    }

    /// Spatial step (m)
    pub fn spatial_step(mut self, dx: f64) -> Self {
        self.spatial_step = Some(dx);
        self
    }

    /// Space domain (m); a scalar `L` means `[0, L]`
    pub fn space_boundary<B: Into<Interval>>(mut self, bounds: B) -> Self {
        self.space_boundary = Some(bounds.into());
        self
    }

    /// Time interval (s); a scalar `T` means `[0, T]`
    pub fn time_boundary<B: Into<Interval>>(mut self, bounds: B) -> Self {
        self.time_boundary = Some(bounds.into());
        self
    }

    /// Validate and build
    pub fn build(self) -> Result<Wavepacket> {
        let physics = Physics {
            spectrum: validate_spectrum(self.spectrum)?,
            dispersion: validate_dispersion(self.dispersion)?,
            envelope: self.envelope,
            normalize: self.normalize,
        };

        Ok(Wavepacket {
            physics: Arc::new(physics),
            sampling_frequency: self
                .sampling_frequency
                .map(|fs| positive("sampling frequency", fs))
                .transpose()?,
            spatial_step: self
                .spatial_step
                .map(|dx| positive("spatial step", dx))
                .transpose()?,
            space_boundary: self
                .space_boundary
                .map(|b| b.validated("space"))
                .transpose()?,
            time_boundary: self
                .time_boundary
                .map(|b| b.validated("time"))
                .transpose()?,
            space: Array1::zeros(0),
            time: Array1::zeros(0),
            results: None,
        })
    }
}

/// A traveling wavepacket on a 1D domain
#[derive(Clone)]
pub struct Wavepacket {
    physics: Arc<Physics>,
    sampling_frequency: Option<f64>,
    spatial_step: Option<f64>,
    space_boundary: Option<Interval>,
    time_boundary: Option<Interval>,
    space: Array1<f64>,
    time: Array1<f64>,
    results: Option<Array2<Complex64>>,
}

impl fmt::Debug for Wavepacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wavepacket")
            .field("physics", &self.physics)
            .field("sampling_frequency", &self.sampling_frequency)
            .field("spatial_step", &self.spatial_step)
            .field("space_boundary", &self.space_boundary)
            .field("time_boundary", &self.time_boundary)
            .field("evaluated", &self.results.is_some())
            .finish()
    }
}

impl Wavepacket {
    /// Start building a wavepacket
    pub fn builder() -> WavepacketBuilder {
        WavepacketBuilder::default()
    }

    /// Shared physics
    pub fn physics(&self) -> &Arc<Physics> {
        &self.physics
    }

    /// Frequencies of the spectrum (Hz)
    pub fn spectrum(&self) -> &[f64] {
        self.physics.spectrum()
    }

    /// Sampling frequency (Hz), if set
    pub fn sampling_frequency(&self) -> Option<f64> {
        self.sampling_frequency
    }

    /// Time step `1 / fs`, if the sampling frequency is set
    pub fn time_step(&self) -> Option<f64> {
        self.sampling_frequency.map(|fs| 1.0 / fs)
    }

    /// Spatial step (m), if set
    pub fn spatial_step(&self) -> Option<f64> {
        self.spatial_step
    }

    /// Space domain; after [`eval`](Self::eval) these are the realized limits
    pub fn space_boundary(&self) -> Option<Interval> {
        self.space_boundary
    }

    /// Time interval; after [`eval`](Self::eval) these are the realized limits
    pub fn time_boundary(&self) -> Option<Interval> {
        self.time_boundary
    }

    /// Space axis of the last evaluation
    pub fn space(&self) -> &Array1<f64> {
        &self.space
    }

    /// Time axis of the last evaluation
    pub fn time(&self) -> &Array1<f64> {
        &self.time
    }

    /// Set the sampling frequency (Hz)
    pub fn set_sampling_frequency(&mut self, fs: f64) -> Result<()> {
        self.sampling_frequency = Some(positive("sampling frequency", fs)?);
        Ok(())
    }

    /// Set the spatial step (m)
    pub fn set_spatial_step(&mut self, dx: f64) -> Result<()> {
        self.spatial_step = Some(positive("spatial step", dx)?);
        Ok(())
    }

    /// Set the space domain; a scalar `L` means `[0, L]`
    pub fn set_space_boundary<B: Into<Interval>>(&mut self, bounds: B) -> Result<()> {
        self.space_boundary = Some(bounds.into().validated("space")?);
        Ok(())
    }

    /// Set the time interval; a scalar `T` means `[0, T]`
    pub fn set_time_boundary<B: Into<Interval>>(&mut self, bounds: B) -> Result<()> {
        self.time_boundary = Some(bounds.into().validated("time")?);
        Ok(())
    }

    /// Replace the spectrum. An empty spectrum is allowed.
    pub fn set_spectrum<I: IntoIterator<Item = f64>>(&mut self, frequencies: I) -> Result<()> {
        let spectrum = validate_spectrum(frequencies)?;
        Arc::make_mut(&mut self.physics).spectrum = spectrum;
        Ok(())
    }

    /// Replace the dispersion relations; at least one is required
    pub fn set_dispersion(&mut self, relations: Vec<Arc<dyn DispersionRelation>>) -> Result<()> {
        let relations = validate_dispersion(relations)?;
        Arc::make_mut(&mut self.physics).dispersion = relations;
        Ok(())
    }

    /// Replace or remove the envelope
    pub fn set_envelope(&mut self, envelope: Option<Arc<dyn Envelope>>) {
        Arc::make_mut(&mut self.physics).envelope = envelope;
    }

    /// Enable or disable normalization
    pub fn set_normalize(&mut self, normalize: bool) {
        Arc::make_mut(&mut self.physics).normalize = normalize;
    }

    /// Evaluate the wavepacket.
    ///
    /// Rediscretizes the time and space axes and replaces the stored limits
    /// by the realized ones. With `domain_only` the field is not
    /// synthesized, which is enough to size the axes.
    pub fn eval(&mut self, domain_only: bool) -> Result<()> {
        let fs = self
            .sampling_frequency
            .ok_or(WaveError::Unconfigured("sampling frequency"))?;
        let dx = self
            .spatial_step
            .ok_or(WaveError::Unconfigured("spatial step"))?;
        let time_bounds = self
            .time_boundary
            .ok_or(WaveError::Unconfigured("time boundary"))?;
        let space_bounds = self
            .space_boundary
            .ok_or(WaveError::Unconfigured("space boundary"))?;

        self.time = discretize(time_bounds, 1.0 / fs)?;
        self.space = discretize(space_bounds, dx)?;
        self.time_boundary = axis_bounds(&self.time);
        self.space_boundary = axis_bounds(&self.space);

        if domain_only {
            return Ok(());
        }

        self.results = Some(self.physics.synthesize(&self.space, &self.time));
        Ok(())
    }

    /// Complex field of the last evaluation, shape `(n_time, n_space)`
    pub fn complex_data(&self) -> Option<&Array2<Complex64>> {
        self.results.as_ref()
    }

    /// Displacement of the last evaluation: `-Im(field)`
    pub fn data(&self) -> Option<Array2<f64>> {
        self.results.as_ref().map(|field| field.mapv(|z| -z.im))
    }

    /// Whether a field is currently held
    pub fn is_evaluated(&self) -> bool {
        self.results.is_some()
    }

    /// Release the evaluated field; the configuration is kept
    pub fn purge(&mut self) {
        self.results = None;
    }
}
