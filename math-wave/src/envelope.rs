//! Spatial envelopes applied to an evaluated wavepacket

use crate::error::{Result, WaveError};
use serde::{Deserialize, Serialize};

/// Maps a position in meters to an amplitude factor.
pub trait Envelope: Send + Sync {
    /// Amplitude factor at `position`
    fn amplitude(&self, position: f64) -> f64;
}

impl<F> Envelope for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn amplitude(&self, position: f64) -> f64 {
        self(position)
    }
}

/// Gaussian window `exp(-((x - center) / width)² / 2)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GaussianFields")]
pub struct Gaussian {
    /// Peak position (m)
    pub center: f64,
    /// Standard deviation (m)
    pub width: f64,
}

impl Gaussian {
    /// Create a Gaussian envelope
    pub fn new(center: f64, width: f64) -> Result<Self> {
        if !center.is_finite() {
            return Err(WaveError::InvalidParameter {
                name: "envelope center",
                value: center,
                reason: "must be finite",
            });
        }
        let width = crate::discretize::positive("envelope width", width)?;
        Ok(Self { center, width })
    }
}

#[derive(Deserialize)]
struct GaussianFields {
    center: f64,
    width: f64,
}

impl TryFrom<GaussianFields> for Gaussian {
    type Error = WaveError;

    fn try_from(fields: GaussianFields) -> Result<Self> {
        Self::new(fields.center, fields.width)
    }
}

impl Envelope for Gaussian {
    fn amplitude(&self, position: f64) -> f64 {
        let u = (position - self.center) / self.width;
        (-0.5 * u * u).exp()
    }
}

/// Exponential attenuation `exp(-rate · x)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ExponentialDecayFields")]
pub struct ExponentialDecay {
    /// Attenuation rate (1/m)
    pub rate: f64,
}

impl ExponentialDecay {
    /// Create an exponential envelope; `rate` must be finite and >= 0
    pub fn new(rate: f64) -> Result<Self> {
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(WaveError::InvalidParameter {
                name: "decay rate",
                value: rate,
                reason: "must be finite and >= 0",
            });
        }
        Ok(Self { rate })
    }
}

#[derive(Deserialize)]
struct ExponentialDecayFields {
    rate: f64,
}

impl TryFrom<ExponentialDecayFields> for ExponentialDecay {
    type Error = WaveError;

    fn try_from(fields: ExponentialDecayFields) -> Result<Self> {
        Self::new(fields.rate)
    }
}

impl Envelope for ExponentialDecay {
    fn amplitude(&self, position: f64) -> f64 {
        (-self.rate * position).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_gaussian() {
        let env = Gaussian::new(1.0, 0.5).unwrap();
        assert_abs_diff_eq!(env.amplitude(1.0), 1.0);
        assert_abs_diff_eq!(env.amplitude(1.5), (-0.5f64).exp(), epsilon = 1e-12);
        assert_abs_diff_eq!(env.amplitude(0.5), env.amplitude(1.5), epsilon = 1e-12);
        assert!(Gaussian::new(0.0, -1.0).is_err());
    }

    #[test]
    fn test_exponential_decay() {
        let env = ExponentialDecay::new(0.1).unwrap();
        assert_abs_diff_eq!(env.amplitude(0.0), 1.0);
        assert_abs_diff_eq!(env.amplitude(10.0), (-1.0f64).exp(), epsilon = 1e-12);
        assert!(ExponentialDecay::new(-1.0).is_err());
    }

    #[test]
    fn test_closure_envelope() {
        let env = |x: f64| if x < 1.0 { 1.0 } else { 0.0 };
        assert_eq!(env.amplitude(0.5), 1.0);
        assert_eq!(env.amplitude(1.5), 0.0);
    }

    #[test]
    fn test_deserialization_validates() {
        let env: Gaussian = serde_json::from_str(r#"{"center":1.0,"width":0.5}"#).unwrap();
        assert_eq!(env, Gaussian::new(1.0, 0.5).unwrap());
        assert!(serde_json::from_str::<Gaussian>(r#"{"center":1.0,"width":0.0}"#).is_err());

        let env: ExponentialDecay = serde_json::from_str(r#"{"rate":0.1}"#).unwrap();
        assert_abs_diff_eq!(env.rate, 0.1);
        assert!(serde_json::from_str::<ExponentialDecay>(r#"{"rate":-2.0}"#).is_err());
    }
}
