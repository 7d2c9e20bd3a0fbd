//! Configuration to saved result, end to end

use approx::assert_abs_diff_eq;
use math_audio_wave::Boundary;
use math_audio_wave_sim::{
    DataCollection, MeasuredData, MembraneConfig, MembraneSnapshot, SimError, summary_json,
};

const CONFIG: &str = r#"{
    "membrane": {
        "width": 2.0,
        "height": 1.4,
        "sampling_frequency": 20.0,
        "spatial_step": 0.1,
        "time": 0.5
    },
    "boundary": 2,
    "normalize": true,
    "sources": [
        {
            "name": "left",
            "position": [-0.4, 0.1],
            "dispersion": [{"type": "non_dispersive", "phase_speed": 3.0}],
            "spectrum": [1.0, 2.0],
            "envelope": {"type": "gaussian", "center": 0.0, "width": 0.8}
        },
        {
            "name": "right",
            "position": [0.3, -0.2],
            "dispersion": [{"type": "tabulated", "frequencies": [0.0, 5.0], "wavenumbers": [0.0, 10.0]}],
            "spectrum": {"min_freq": 1.0, "max_freq": 4.0, "num_points": 4}
        }
    ]
}"#;

#[test]
fn test_config_to_snapshot_collection() {
    let config = MembraneConfig::from_json(CONFIG).unwrap();
    assert_eq!(config.boundary, Boundary::Order(2));

    let mut membrane = config.to_membrane().unwrap();
    assert_eq!(membrane.sources().len(), 2);
    membrane.eval().unwrap();

    let data = membrane.data().unwrap();
    assert_eq!(data.dim(), (21, 15, 11));
    let peak = data.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    assert_abs_diff_eq!(peak, 1.0, epsilon = 1e-12);

    let summary = summary_json(&config, &membrane);
    assert_eq!(summary["placements"]["sources"], 2);
    assert_eq!(summary["sources"][1]["frequencies"], 4);

    let mut runs = DataCollection::new();
    runs.push(MembraneSnapshot::from_membrane(&membrane).unwrap());

    membrane.set_normalize(false);
    membrane.eval().unwrap();
    runs.push(MembraneSnapshot::from_membrane(&membrane).unwrap());
    assert_eq!(runs.len(), 2);
    assert!(runs.last().unwrap().peak() > 0.0);

    let path = std::env::temp_dir().join(format!(
        "math_wave_sim_collection_{}.json",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    runs.save(&path, false).unwrap();
    assert!(matches!(runs.save(&path, false), Err(SimError::FileExists(_))));

    let loaded = DataCollection::<MembraneSnapshot>::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.last().unwrap().time.len(), 11);
    assert_eq!(loaded.last().unwrap().image_count, membrane.reflected_sources().len());
}

#[test]
fn test_source_on_edge_is_rejected() {
    let json = CONFIG.replace("[-0.4, 0.1]", "[-1.0, 0.1]");
    let config = MembraneConfig::from_json(&json).unwrap();
    let err = config.to_membrane().unwrap_err();
    assert!(matches!(err, SimError::Wave(ref e) if e.is_internal()));
}

#[test]
fn test_malformed_json() {
    assert!(matches!(
        MembraneConfig::from_json("{\"membrane\": {}}"),
        Err(SimError::Json(_))
    ));
}
