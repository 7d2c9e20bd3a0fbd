//! Dispersion relations: temporal frequency to spatial wave number
//!
//! Any `Fn(f64) -> f64 + Send + Sync` is a dispersion relation, so ad hoc
//! relations can be passed as closures. The built-in relations cover the
//! usual laboratory cases:
//!
//! - [`NonDispersive`]: `k = 2πf / c`
//! - [`FlexuralPlate`]: bending waves in a thin (Kirchhoff) plate
//! - [`Tabulated`]: a measured dispersion curve, linearly interpolated

use crate::error::{Result, WaveError};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Maps a frequency in Hz to a wave number in rad/m.
pub trait DispersionRelation: Send + Sync {
    /// Wave number for `frequency`
    fn wavenumber(&self, frequency: f64) -> f64;
}

impl<F> DispersionRelation for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn wavenumber(&self, frequency: f64) -> f64 {
        self(frequency)
    }
}

/// Waves traveling at a constant phase speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NonDispersiveFields")]
pub struct NonDispersive {
    /// Phase speed (m/s)
    pub phase_speed: f64,
}

impl NonDispersive {
    /// Create a non-dispersive relation
    pub fn new(phase_speed: f64) -> Result<Self> {
        let phase_speed = crate::discretize::positive("phase speed", phase_speed)?;
        Ok(Self { phase_speed })
    }
}

#[derive(Deserialize)]
struct NonDispersiveFields {
    phase_speed: f64,
}

impl TryFrom<NonDispersiveFields> for NonDispersive {
    type Error = WaveError;

    fn try_from(fields: NonDispersiveFields) -> Result<Self> {
        Self::new(fields.phase_speed)
    }
}

impl DispersionRelation for NonDispersive {
    fn wavenumber(&self, frequency: f64) -> f64 {
        2.0 * PI * frequency / self.phase_speed
    }
}

/// Bending waves in a thin plate
///
/// ```text
/// k = (ω² m / D)^(1/4)
/// ```
///
/// with `D` the bending stiffness (N·m) and `m` the mass per unit area
/// (kg/m²).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FlexuralPlateFields")]
pub struct FlexuralPlate {
    /// Bending stiffness D (N·m)
    pub bending_stiffness: f64,
    /// Mass per unit area (kg/m²)
    pub areal_density: f64,
}

impl FlexuralPlate {
    /// Create a plate relation
    pub fn new(bending_stiffness: f64, areal_density: f64) -> Result<Self> {
        Ok(Self {
            bending_stiffness: crate::discretize::positive(
                "bending stiffness",
                bending_stiffness,
            )?,
            areal_density: crate::discretize::positive("areal density", areal_density)?,
        })
    }

    /// Plate built from material constants.
    ///
    /// `D = E h³ / (12 (1 - ν²))` and `m = ρ h`.
    pub fn from_material(
        youngs_modulus: f64,
        poisson_ratio: f64,
        density: f64,
        thickness: f64,
    ) -> Result<Self> {
        if !(0.0..0.5).contains(&poisson_ratio) {
            return Err(WaveError::InvalidParameter {
                name: "poisson ratio",
                value: poisson_ratio,
                reason: "must be in [0, 0.5)",
            });
        }
        let stiffness =
            youngs_modulus * thickness.powi(3) / (12.0 * (1.0 - poisson_ratio * poisson_ratio));
        Self::new(stiffness, density * thickness)
    }
}

#[derive(Deserialize)]
struct FlexuralPlateFields {
    bending_stiffness: f64,
    areal_density: f64,
}

impl TryFrom<FlexuralPlateFields> for FlexuralPlate {
    type Error = WaveError;

    fn try_from(fields: FlexuralPlateFields) -> Result<Self> {
        Self::new(fields.bending_stiffness, fields.areal_density)
    }
}

impl DispersionRelation for FlexuralPlate {
    fn wavenumber(&self, frequency: f64) -> f64 {
        let omega = 2.0 * PI * frequency;
        (omega * omega * self.areal_density / self.bending_stiffness)
            .sqrt()
            .sqrt()
    }
}

/// Measured dispersion curve
///
/// Linear interpolation between samples, clamped to the first and last
/// wave numbers outside the tabulated range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TabulatedFields")]
pub struct Tabulated {
    frequencies: Vec<f64>,
    wavenumbers: Vec<f64>,
}

impl Tabulated {
    /// Create a tabulated relation.
    ///
    /// Frequencies must be finite and strictly increasing, and both tables
    /// must have the same, non-zero, length.
    pub fn new(frequencies: Vec<f64>, wavenumbers: Vec<f64>) -> Result<Self> {
        if frequencies.is_empty() || frequencies.len() != wavenumbers.len() {
            return Err(WaveError::InvalidParameter {
                name: "dispersion table length",
                value: frequencies.len() as f64,
                reason: "tables must be non-empty and of equal length",
            });
        }
        for (index, w) in frequencies.windows(2).enumerate() {
            if w[1] <= w[0] {
                return Err(WaveError::InvalidFrequency {
                    index: index + 1,
                    value: w[1],
                });
            }
        }
        if let Some(&bad) = frequencies
            .iter()
            .chain(wavenumbers.iter())
            .find(|v| !v.is_finite())
        {
            return Err(WaveError::InvalidParameter {
                name: "dispersion table entry",
                value: bad,
                reason: "must be finite",
            });
        }
        Ok(Self {
            frequencies,
            wavenumbers,
        })
    }

    /// Tabulated frequencies (Hz)
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Tabulated wave numbers (rad/m)
    pub fn wavenumbers(&self) -> &[f64] {
        &self.wavenumbers
    }
}

#[derive(Deserialize)]
struct TabulatedFields {
    frequencies: Vec<f64>,
    wavenumbers: Vec<f64>,
}

impl TryFrom<TabulatedFields> for Tabulated {
    type Error = WaveError;

    fn try_from(fields: TabulatedFields) -> Result<Self> {
        Self::new(fields.frequencies, fields.wavenumbers)
    }
}

impl DispersionRelation for Tabulated {
    fn wavenumber(&self, frequency: f64) -> f64 {
        let n = self.frequencies.len();
        if frequency <= self.frequencies[0] {
            return self.wavenumbers[0];
        }
        if frequency >= self.frequencies[n - 1] {
            return self.wavenumbers[n - 1];
        }
        let upper = self.frequencies.partition_point(|&f| f <= frequency);
        let lower = upper - 1;
        let t = (frequency - self.frequencies[lower])
            / (self.frequencies[upper] - self.frequencies[lower]);
        self.wavenumbers[lower] + t * (self.wavenumbers[upper] - self.wavenumbers[lower])
    }
}
