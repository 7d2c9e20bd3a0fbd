//! Saving and loading simulation results
//!
//! Results are stored as JSON. A [`MembraneSnapshot`] captures everything
//! needed to inspect an evaluated membrane without the sources that
//! produced it, and a [`DataCollection`] groups several runs in one file.

use crate::error::{Result, SimError};
use math_audio_wave::{Boundary, Membrane};
use ndarray::{Array1, Array3};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Data that can be written to and read back from disk
pub trait MeasuredData: Serialize + DeserializeOwned {
    /// Encode as JSON bytes
    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode from JSON bytes
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Write to `path`.
    ///
    /// Without `overwrite`, an existing file is left untouched and
    /// [`SimError::FileExists`] is returned.
    fn save<P: AsRef<Path>>(&self, path: P, overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        let mut file = if overwrite {
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?
        } else {
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    return Err(SimError::FileExists(path.to_path_buf()));
                }
                Err(e) => return Err(e.into()),
            }
        };
        file.write_all(&bytes)?;
        log::debug!("saved {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Read from `path`
    fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

/// Evaluated membrane field together with its axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembraneSnapshot {
    /// Sampling frequency (Hz)
    pub sampling_frequency: f64,
    /// Spatial step (m)
    pub spatial_step: f64,
    /// Realized size `[Lx, Ly]` (m)
    pub domain: [f64; 2],
    /// Boundary condition
    pub boundary: Boundary,
    /// Number of real sources
    pub source_count: usize,
    /// Number of image sources
    pub image_count: usize,
    /// x axis (m)
    pub xs: Array1<f64>,
    /// y axis (m)
    pub ys: Array1<f64>,
    /// Time axis (s)
    pub time: Array1<f64>,
    /// Displacement, shape `(n_x, n_y, n_time)`
    pub data: Array3<f64>,
}

impl MembraneSnapshot {
    /// Capture an evaluated membrane
    pub fn from_membrane(membrane: &Membrane) -> Result<Self> {
        let data = membrane.data().ok_or(SimError::NotEvaluated)?;
        let (lx, ly) = membrane.domain();
        Ok(Self {
            sampling_frequency: membrane.sampling_frequency(),
            spatial_step: membrane.spatial_step(),
            domain: [lx, ly],
            boundary: membrane.boundary(),
            source_count: membrane.sources().len(),
            image_count: membrane.reflected_sources().len(),
            xs: membrane.xs().clone(),
            ys: membrane.ys().clone(),
            time: membrane.time().clone(),
            data: data.clone(),
        })
    }

    /// Time series at grid indices `(i, j)`
    pub fn trace(&self, i: usize, j: usize) -> Option<Array1<f64>> {
        let (nx, ny, _) = self.data.dim();
        (i < nx && j < ny).then(|| self.data.slice(ndarray::s![i, j, ..]).to_owned())
    }

    /// Largest absolute displacement
    pub fn peak(&self) -> f64 {
        self.data.iter().fold(0.0f64, |m, v| m.max(v.abs()))
    }
}

impl MeasuredData for MembraneSnapshot {}

/// Ordered collection of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
pub struct DataCollection<T> {
    items: Vec<T>,
}

impl<T> Default for DataCollection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> DataCollection<T> {
    /// Empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Most recently added item
    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// Most recently added item, mutably
    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> FromIterator<T> for DataCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T: Serialize + DeserializeOwned> MeasuredData for DataCollection<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MembraneConfig;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "math_wave_sim_{}_{}.json",
            name,
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        path
    }

    fn evaluated_snapshot() -> MembraneSnapshot {
        let mut membrane = MembraneConfig::reference().to_membrane().unwrap();
        membrane.eval().unwrap();
        MembraneSnapshot::from_membrane(&membrane).unwrap()
    }

    #[test]
    fn test_snapshot_requires_evaluation() {
        let membrane = MembraneConfig::reference().to_membrane().unwrap();
        assert!(matches!(
            MembraneSnapshot::from_membrane(&membrane),
            Err(SimError::NotEvaluated)
        ));
    }

    #[test]
    fn test_snapshot_contents() {
        let snapshot = evaluated_snapshot();
        assert_eq!(snapshot.data.dim(), (21, 21, 11));
        assert_eq!(snapshot.xs.len(), 21);
        assert_eq!(snapshot.source_count, 1);
        assert_eq!(snapshot.image_count, 0);
        assert!((snapshot.peak() - 1.0).abs() < 1e-12);
        assert_eq!(snapshot.trace(10, 10).unwrap().len(), 11);
        assert!(snapshot.trace(21, 0).is_none());
    }

    #[test]
    fn test_save_refuses_overwrite() {
        let path = temp_path("overwrite");
        let snapshot = evaluated_snapshot();
        snapshot.save(&path, false).unwrap();

        let err = snapshot.save(&path, false).unwrap_err();
        assert!(matches!(err, SimError::FileExists(ref p) if p == &path));

        snapshot.save(&path, true).unwrap();
        let loaded = MembraneSnapshot::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.boundary, snapshot.boundary);
        assert_eq!(loaded.data.dim(), snapshot.data.dim());
        for (a, b) in loaded.data.iter().zip(snapshot.data.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let path = temp_path("missing");
        assert!(matches!(
            MembraneSnapshot::load(&path),
            Err(SimError::Io(_))
        ));
    }

    #[test]
    fn test_collection_last() {
        let mut runs: DataCollection<f64> = DataCollection::new();
        assert!(runs.is_empty());
        assert!(runs.last().is_none());

        runs.push(1.0);
        runs.push(2.0);
        assert_eq!(runs.last(), Some(&2.0));
        if let Some(last) = runs.last_mut() {
            *last = 3.0;
        }
        assert_eq!(runs.iter().copied().collect::<Vec<_>>(), vec![1.0, 3.0]);

        let bytes = runs.to_bytes().unwrap();
        let decoded = DataCollection::<f64>::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, runs);
    }
}
