//! JSON configuration for membrane simulations

use crate::error::{Result, SimError};
use math_audio_wave::{
    Boundary, DispersionRelation, Envelope, ExponentialDecay, FlexuralPlate, Gaussian, Interval,
    Membrane, NonDispersive, Tabulated, Wavepacket,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Complete membrane configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembraneConfig {
    /// Membrane geometry and discretization
    pub membrane: MembraneGeometryConfig,
    /// Sources driving the membrane
    pub sources: Vec<SourceConfig>,
    /// Boundary condition: "transparent", "free" or a reflection order
    #[serde(default)]
    pub boundary: Boundary,
    /// Scale the membrane field to a unit peak
    #[serde(default = "default_true")]
    pub normalize: bool,
    /// Simulation metadata
    #[serde(default)]
    pub metadata: MetadataConfig,
}

fn default_true() -> bool {
    true
}

/// Membrane size and sampling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembraneGeometryConfig {
    /// Length along x (m)
    pub width: f64,
    /// Length along y (m)
    pub height: f64,
    /// Sampling frequency (Hz)
    pub sampling_frequency: f64,
    /// Spatial step (m)
    pub spatial_step: f64,
    /// Travel time (s): a duration or a `[start, end]` pair
    pub time: TimeConfig,
}

/// Time interval, given as a duration or as explicit limits
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeConfig {
    /// `[0, duration]`
    Duration(f64),
    /// `[start, end]`
    Span([f64; 2]),
}

impl From<TimeConfig> for Interval {
    fn from(time: TimeConfig) -> Self {
        match time {
            TimeConfig::Duration(t) => Interval::from(t),
            TimeConfig::Span([start, end]) => Interval::new(start, end),
        }
    }
}

/// One source: a wavepacket and where it sits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source name
    #[serde(default)]
    pub name: String,
    /// Position `[x, y]` (m), relative to the membrane center
    pub position: [f64; 2],
    /// Dispersion relations; one traveling wave per relation and frequency
    pub dispersion: Vec<DispersionConfig>,
    /// Frequencies radiated by the source
    pub spectrum: SpectrumConfig,
    /// Optional spatial envelope
    #[serde(default)]
    pub envelope: Option<EnvelopeConfig>,
    /// Scale the wavepacket to a unit peak
    #[serde(default = "default_true")]
    pub normalize: bool,
}

impl SourceConfig {
    /// Build the wavepacket radiated by this source
    pub fn to_wavepacket(&self) -> Result<Wavepacket> {
        let mut builder = Wavepacket::builder()
            .spectrum(self.spectrum.generate_frequencies()?)
            .normalize(self.normalize);
        for relation in &self.dispersion {
            builder = builder.dispersion_shared(relation.to_relation()?);
        }
        if let Some(envelope) = &self.envelope {
            builder = builder.envelope_shared(envelope.to_envelope()?);
        }
        Ok(builder.build()?)
    }
}

/// Dispersion relation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispersionConfig {
    /// Constant phase speed
    NonDispersive {
        /// Phase speed (m/s)
        phase_speed: f64,
    },
    /// Thin plate bending waves
    FlexuralPlate {
        /// Bending stiffness (N·m)
        bending_stiffness: f64,
        /// Mass per unit area (kg/m²)
        areal_density: f64,
    },
    /// Measured dispersion curve
    Tabulated {
        /// Frequencies (Hz), strictly increasing
        frequencies: Vec<f64>,
        /// Wave numbers (rad/m)
        wavenumbers: Vec<f64>,
    },
}

impl DispersionConfig {
    /// Convert to a shared dispersion relation
    pub fn to_relation(&self) -> Result<Arc<dyn DispersionRelation>> {
        let relation: Arc<dyn DispersionRelation> = match self {
            DispersionConfig::NonDispersive { phase_speed } => {
                Arc::new(NonDispersive::new(*phase_speed)?)
            }
            DispersionConfig::FlexuralPlate {
                bending_stiffness,
                areal_density,
            } => Arc::new(FlexuralPlate::new(*bending_stiffness, *areal_density)?),
            DispersionConfig::Tabulated {
                frequencies,
                wavenumbers,
            } => Arc::new(Tabulated::new(frequencies.clone(), wavenumbers.clone())?),
        };
        Ok(relation)
    }
}

/// Envelope configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnvelopeConfig {
    /// Gaussian window
    Gaussian {
        /// Peak position (m)
        center: f64,
        /// Standard deviation (m)
        width: f64,
    },
    /// Exponential attenuation with distance
    ExponentialDecay {
        /// Attenuation rate (1/m)
        rate: f64,
    },
}

impl EnvelopeConfig {
    /// Convert to a shared envelope
    pub fn to_envelope(&self) -> Result<Arc<dyn Envelope>> {
        let envelope: Arc<dyn Envelope> = match self {
            EnvelopeConfig::Gaussian { center, width } => Arc::new(Gaussian::new(*center, *width)?),
            EnvelopeConfig::ExponentialDecay { rate } => Arc::new(ExponentialDecay::new(*rate)?),
        };
        Ok(envelope)
    }
}

/// Spectrum: explicit frequencies or a generated range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpectrumConfig {
    /// Explicit list of frequencies (Hz)
    List(Vec<f64>),
    /// Evenly spaced frequencies
    Range {
        /// Lowest frequency (Hz)
        min_freq: f64,
        /// Highest frequency (Hz)
        max_freq: f64,
        /// Number of frequencies
        num_points: usize,
        /// Spacing type ("logarithmic" or "linear")
        #[serde(default = "default_spacing")]
        spacing: String,
    },
}

fn default_spacing() -> String {
    "linear".to_string()
}

impl SpectrumConfig {
    /// Generate the frequency list
    pub fn generate_frequencies(&self) -> Result<Vec<f64>> {
        match self {
            SpectrumConfig::List(frequencies) => Ok(frequencies.clone()),
            SpectrumConfig::Range {
                min_freq,
                max_freq,
                num_points,
                spacing,
            } => match spacing.to_lowercase().as_str() {
                "linear" => Ok(lin_space(*min_freq, *max_freq, *num_points)),
                "logarithmic" => {
                    if *min_freq <= 0.0 || *max_freq <= 0.0 {
                        return Err(SimError::Config(format!(
                            "logarithmic spectrum needs positive limits, got [{}, {}]",
                            min_freq, max_freq
                        )));
                    }
                    Ok(log_space(*min_freq, *max_freq, *num_points))
                }
                other => Err(SimError::Config(format!(
                    "unknown spectrum spacing '{}' (expected 'linear' or 'logarithmic')",
                    other
                ))),
            },
        }
    }
}

/// Generate logarithmically spaced frequencies
pub fn log_space(start: f64, end: f64, num: usize) -> Vec<f64> {
    if num < 2 {
        return vec![start; num];
    }
    let log_start = start.ln();
    let log_end = end.ln();
    (0..num)
        .map(|i| (log_start + (log_end - log_start) * i as f64 / (num - 1) as f64).exp())
        .collect()
}

/// Generate linearly spaced frequencies
pub fn lin_space(start: f64, end: f64, num: usize) -> Vec<f64> {
    if num < 2 {
        return vec![start; num];
    }
    (0..num)
        .map(|i| start + (end - start) * i as f64 / (num - 1) as f64)
        .collect()
}

/// Simulation metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Simulation description
    #[serde(default)]
    pub description: String,
    /// Author name
    #[serde(default)]
    pub author: String,
}

impl MembraneConfig {
    /// Load configuration from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save configuration to JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Build the membrane and register every source
    pub fn to_membrane(&self) -> Result<Membrane> {
        let geometry = &self.membrane;
        let mut membrane = Membrane::new(
            geometry.sampling_frequency,
            geometry.spatial_step,
            (geometry.width, geometry.height),
            geometry.time,
            self.normalize,
            self.boundary,
        )?;

        for (index, source) in self.sources.iter().enumerate() {
            let packet = source.to_wavepacket()?;
            let [x, y] = source.position;
            membrane.add_source(&packet, (x, y))?;
            log::debug!("registered source {} '{}' at ({}, {})", index, source.name, x, y);
        }

        Ok(membrane)
    }

    /// A 2 m square membrane with one non-dispersive 1 Hz source at its
    /// center, `k(f) = f`, sampled at 10 Hz for one second.
    pub fn reference() -> Self {
        Self {
            membrane: MembraneGeometryConfig {
                width: 2.0,
                height: 2.0,
                sampling_frequency: 10.0,
                spatial_step: 0.1,
                time: TimeConfig::Duration(1.0),
            },
            sources: vec![SourceConfig {
                name: "center".to_string(),
                position: [0.0, 0.0],
                dispersion: vec![DispersionConfig::NonDispersive {
                    phase_speed: 2.0 * PI,
                }],
                spectrum: SpectrumConfig::List(vec![1.0]),
                envelope: None,
                normalize: true,
            }],
            boundary: Boundary::Transparent,
            normalize: true,
            metadata: MetadataConfig {
                description: "Reference membrane".to_string(),
                author: String::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PLATE_JSON: &str = r#"{
        "membrane": {
            "width": 1.2,
            "height": 0.8,
            "sampling_frequency": 200.0,
            "spatial_step": 0.05,
            "time": [0.0, 0.05]
        },
        "boundary": "free",
        "sources": [
            {
                "name": "shaker",
                "position": [0.1, -0.2],
                "dispersion": [
                    {"type": "flexural_plate", "bending_stiffness": 50.0, "areal_density": 5.0},
                    {"type": "non_dispersive", "phase_speed": 40.0}
                ],
                "spectrum": {"min_freq": 10.0, "max_freq": 80.0, "num_points": 4, "spacing": "logarithmic"},
                "envelope": {"type": "exponential_decay", "rate": 0.5}
            }
        ]
    }"#;

    #[test]
    fn test_parse_config() {
        let config = MembraneConfig::from_json(PLATE_JSON).unwrap();
        assert_eq!(config.boundary, Boundary::Free);
        assert!(config.normalize);
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].dispersion.len(), 2);
        assert!(matches!(
            config.sources[0].envelope,
            Some(EnvelopeConfig::ExponentialDecay { .. })
        ));

        let freqs = config.sources[0].spectrum.generate_frequencies().unwrap();
        assert_eq!(freqs.len(), 4);
        assert_relative_eq!(freqs[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(freqs[3], 80.0, epsilon = 1e-9);
        assert_relative_eq!(freqs[1], 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_config_to_membrane() {
        let config = MembraneConfig::from_json(PLATE_JSON).unwrap();
        let membrane = config.to_membrane().unwrap();
        assert_eq!(membrane.sources().len(), 1);
        assert_eq!(membrane.reflected_sources().len(), 4);
        assert_eq!(membrane.time().len(), 11);
        assert_eq!(membrane.boundary(), Boundary::Free);
    }

    #[test]
    fn test_integer_boundary() {
        let json = PLATE_JSON.replace("\"free\"", "3");
        let config = MembraneConfig::from_json(&json).unwrap();
        assert_eq!(config.boundary, Boundary::Order(3));

        let json = PLATE_JSON.replace("\"free\"", "0");
        assert!(MembraneConfig::from_json(&json).is_err());
    }

    #[test]
    fn test_spectrum_list_and_linear() {
        let list: SpectrumConfig = serde_json::from_str("[1.0, 2.5]").unwrap();
        assert_eq!(list.generate_frequencies().unwrap(), vec![1.0, 2.5]);

        let range: SpectrumConfig =
            serde_json::from_str(r#"{"min_freq": 1.0, "max_freq": 3.0, "num_points": 3}"#).unwrap();
        assert_eq!(range.generate_frequencies().unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_invalid_spectrum_spacing() {
        let range = SpectrumConfig::Range {
            min_freq: 0.0,
            max_freq: 10.0,
            num_points: 5,
            spacing: "logarithmic".to_string(),
        };
        assert!(range.generate_frequencies().unwrap_err().is_configuration_error());

        let range = SpectrumConfig::Range {
            min_freq: 1.0,
            max_freq: 10.0,
            num_points: 5,
            spacing: "octave".to_string(),
        };
        assert!(matches!(range.generate_frequencies(), Err(SimError::Config(_))));
    }

    #[test]
    fn test_invalid_physics_is_reported() {
        let mut config = MembraneConfig::reference();
        config.sources[0].dispersion = vec![DispersionConfig::NonDispersive { phase_speed: -1.0 }];
        let err = config.to_membrane().unwrap_err();
        assert!(err.is_configuration_error());

        let mut config = MembraneConfig::reference();
        config.sources[0].dispersion.clear();
        assert!(matches!(
            config.to_membrane(),
            Err(SimError::Wave(math_audio_wave::WaveError::EmptyDispersion))
        ));
    }

    #[test]
    fn test_reference_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!(
            "math_wave_sim_reference_config_{}.json",
            std::process::id()
        ));
        let config = MembraneConfig::reference();
        config.to_file(&path).unwrap();
        let loaded = MembraneConfig::from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.membrane.width, 2.0);
        assert_eq!(loaded.boundary, Boundary::Transparent);
        assert_relative_eq!(
            loaded.sources[0].to_wavepacket().unwrap().physics().dispersion()[0].wavenumber(3.0),
            3.0,
            epsilon = 1e-12
        );
    }
}
