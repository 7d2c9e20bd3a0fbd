//! Output JSON formatting for membrane simulations

use crate::config::MembraneConfig;
use math_audio_wave::Membrane;

/// Summary of a membrane run: grid, time axis, sources and peak amplitude.
///
/// `peak` is `null` when the membrane has not been evaluated.
pub fn summary_json(config: &MembraneConfig, membrane: &Membrane) -> serde_json::Value {
    let (nx, ny) = membrane.grid().shape();
    let (lx, ly) = membrane.domain();
    let time = membrane.time_boundary();
    let peak = membrane
        .data()
        .map(|data| data.iter().fold(0.0f64, |m, v| m.max(v.abs())));

    serde_json::json!({
        "membrane": {
            "requested_size": [config.membrane.width, config.membrane.height],
            "domain": [lx, ly],
            "grid": [nx, ny],
            "spatial_step": membrane.spatial_step(),
            "boundary": membrane.boundary().to_string(),
            "normalize": membrane.normalize(),
        },
        "time": {
            "sampling_frequency": membrane.sampling_frequency(),
            "start": time.min,
            "end": time.max,
            "samples": membrane.time().len(),
        },
        "sources": config.sources.iter().zip(membrane.sources()).map(|(s, p)| {
            serde_json::json!({
                "name": s.name,
                "position": [p.position().x, p.position().y],
                "frequencies": p.packet().spectrum().len(),
                "dispersion_relations": s.dispersion.len(),
            })
        }).collect::<Vec<_>>(),
        "placements": {
            "sources": membrane.sources().len(),
            "images": membrane.reflected_sources().len(),
        },
        "peak": peak,
        "metadata": {
            "description": config.metadata.description,
            "author": config.metadata.author,
        },
    })
}

/// Time series at the grid point nearest to `(x, y)`, or `None` before evaluation
pub fn nearest_trace(membrane: &Membrane, x: f64, y: f64) -> Option<Vec<f64>> {
    let data = membrane.data()?;
    let nearest = |axis: &ndarray::Array1<f64>, v: f64| {
        axis.iter()
            .enumerate()
            .min_by(|a, b| (a.1 - v).abs().total_cmp(&(b.1 - v).abs()))
            .map(|(i, _)| i)
    };
    let i = nearest(membrane.xs(), x)?;
    let j = nearest(membrane.ys(), y)?;
    Some(data.slice(ndarray::s![i, j, ..]).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_summary_before_and_after_eval() {
        let config = MembraneConfig::reference();
        let mut membrane = config.to_membrane().unwrap();

        let summary = summary_json(&config, &membrane);
        assert!(summary["peak"].is_null());
        assert_eq!(summary["membrane"]["grid"][0], 21);
        assert_eq!(summary["membrane"]["boundary"], "transparent");
        assert_eq!(summary["time"]["samples"], 11);
        assert_eq!(summary["placements"]["images"], 0);
        assert_eq!(summary["sources"][0]["name"], "center");

        membrane.eval().unwrap();
        let summary = summary_json(&config, &membrane);
        assert_abs_diff_eq!(summary["peak"].as_f64().unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nearest_trace() {
        let config = MembraneConfig::reference();
        let mut membrane = config.to_membrane().unwrap();
        assert!(nearest_trace(&membrane, 0.0, 0.0).is_none());

        membrane.eval().unwrap();
        let trace = nearest_trace(&membrane, 0.02, -0.03).unwrap();
        let data = membrane.data().unwrap();
        assert_eq!(trace.len(), 11);
        for (k, v) in trace.iter().enumerate() {
            assert_eq!(*v, data[[10, 10, k]]);
        }
    }
}
