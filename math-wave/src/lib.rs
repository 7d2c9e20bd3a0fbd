//! Dispersive wavepackets and vibrating membranes
//!
//! This crate synthesizes the displacement of a finite rectangular membrane
//! driven by one or more sources. Each source radiates a dispersive
//! wavepacket: a superposition of traveling waves whose wave numbers follow
//! user supplied dispersion relations.
//!
//! # Features
//!
//! - **Wavepackets**: 1D `(time × space)` fields from a spectrum and one or
//!   more dispersion relations, with optional envelope and normalization
//! - **Dispersion relations**: non-dispersive media, flexural plates,
//!   tabulated measurements, or any `Fn(f64) -> f64`
//! - **Membranes**: symmetric grids, radial spreading of each source and
//!   superposition of all of them
//! - **Reflections**: free edges emulated with image sources, up to any
//!   reflection order
//! - **Parallel evaluation**: placements folded on the rayon pool
//!   (`parallel` feature, enabled by default)
//!
//! # Example
//!
//! ```rust
//! use math_audio_wave::{Boundary, Membrane, NonDispersive, Wavepacket};
//!
//! let packet = Wavepacket::builder()
//!     .dispersion(NonDispersive::new(2.0).unwrap())
//!     .spectrum([1.0, 2.0])
//!     .build()
//!     .unwrap();
//!
//! let mut membrane = Membrane::builder(10.0, 0.1, (2.0, 2.0), 1.0)
//!     .boundary(Boundary::Order(2))
//!     .source(packet, (0.2, 0.3))
//!     .build()
//!     .unwrap();
//!
//! membrane.eval().unwrap();
//! let data = membrane.data().unwrap();
//! assert_eq!(data.dim(), (21, 21, 11));
//! assert!(data.iter().all(|v| v.abs() <= 1.0 + 1e-12));
//! ```
#![warn(missing_docs)]

pub mod discretize;
pub mod dispersion;
pub mod envelope;
mod error;
pub mod grid;
pub mod membrane;
pub mod reflection;
pub mod synthesis;
pub mod wavepacket;

pub use error::{Result, WaveError};

pub use discretize::{Interval, discretize, discretize_within};
pub use dispersion::{DispersionRelation, FlexuralPlate, NonDispersive, Tabulated};
pub use envelope::{Envelope, ExponentialDecay, Gaussian};
pub use grid::{Grid, Point2};
pub use membrane::{Membrane, MembraneBuilder, Placement};
pub use reflection::{Boundary, Edge, Region, image_sources, reflect_position};
pub use synthesis::{accumulate_radial, radial_interpolate, traveling_wave};
pub use wavepacket::{NORMALIZATION_FLOOR, Physics, Wavepacket, WavepacketBuilder};
