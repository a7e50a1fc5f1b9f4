use std::time::Duration;

use pvlive::channel::{ChannelClient, PvValue};
use pvlive::config::{AppConfig, InitialValue, UpdateModeConfig};
use pvlive::data::parameter::PlotUpdateMode;
use pvlive::error::ConfigError;

#[test]
fn defaults() {
    let cfg = AppConfig::default();
    assert_eq!(cfg.title, "6-ID-B Live");
    assert_eq!(cfg.window_size, [1024.0, 768.0]);
    assert_eq!(cfg.connect_timeout(), Duration::from_secs(1));
    assert_eq!(cfg.plot.time_window_secs, 10.0);
    assert_eq!(cfg.plot.max_points, 10_000);
    assert_eq!(
        cfg.plot.update_mode(),
        PlotUpdateMode::Timer {
            interval: Duration::from_millis(50)
        }
    );
    let names: Vec<(&str, &str)> = cfg
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.pv.as_str()))
        .collect();
    assert_eq!(names, vec![("Delta", "6idb1:m18.RBV"), ("Eta", "6idb1:m17.RBV")]);
    assert!(cfg.features.spotlight);
}

#[test]
fn partial_yaml_keeps_other_defaults() {
    let cfg = AppConfig::from_yaml(
        r#"
title: "Test Station"
plot:
  update: on_update
  time_window_secs: 30
"#,
    )
    .unwrap();
    assert_eq!(cfg.title, "Test Station");
    assert_eq!(cfg.plot.update, UpdateModeConfig::OnUpdate);
    assert_eq!(cfg.plot.update_mode(), PlotUpdateMode::OnUpdate);
    assert_eq!(cfg.plot.time_window_secs, 30.0);
    assert_eq!(cfg.plot.max_points, 10_000);
    assert_eq!(cfg.parameters.len(), 2);
}

#[test]
fn parameters_and_sim_channels() {
    let cfg = AppConfig::from_yaml(
        r#"
parameters:
  - name: Chi
    pv: "test:chi"
    plot: true
  - name: Cam
    pv: "test:cam:ArrayData"
    image_width: 8
sim_channels:
  - pv: "test:chi"
    units: deg
    writable: true
    value: 12.5
  - pv: "test:count"
    value: 3
  - pv: "test:name"
    value: "sample A"
  - pv: "test:cam:ArrayData"
    signal:
      kind: spot
      width: 8
      height: 4
      period_secs: 2.0
"#,
    )
    .unwrap();
    assert_eq!(cfg.parameters.len(), 2);
    assert!(cfg.parameters[0].plot);
    assert_eq!(cfg.parameters[1].image_width, Some(8));
    assert_eq!(cfg.sim_channels[0].value, Some(InitialValue::Float(12.5)));
    assert_eq!(cfg.sim_channels[1].value, Some(InitialValue::Int(3)));

    let client = cfg.build_sim_client();
    let t = Duration::from_millis(100);
    let chi = client.connect("test:chi", t).unwrap();
    assert_eq!(chi.value, PvValue::Float(12.5));
    assert_eq!(chi.units, "deg");
    assert!(chi.write_access);
    assert_eq!(
        client.connect("test:name", t).unwrap().value,
        PvValue::Text("sample A".into())
    );
    let cam = client.connect("test:cam:ArrayData", t).unwrap();
    assert_eq!(cam.value.as_array().map(|a| a.len()), Some(32));
    // Beamline channels are still served.
    assert!(client.connect("6idb1:m18.RBV", t).is_ok());
}

#[test]
fn invalid_values_are_rejected() {
    let err = AppConfig::from_yaml("plot:\n  tick_ms: 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = AppConfig::from_yaml("parameters:\n  - name: X\n    pv: \"\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = AppConfig::from_yaml("plot: [1, 2]\n").unwrap_err();
    assert!(matches!(err, ConfigError::Yaml(_)));
}

#[test]
fn save_and_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.yaml");
    let mut cfg = AppConfig::default();
    cfg.title = "Roundtrip".into();
    cfg.plot.max_points = 500;
    cfg.features.inline_form = false;
    cfg.save_to_path(&path).unwrap();

    let back = AppConfig::load(&path).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AppConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
