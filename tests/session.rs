use std::time::Duration;

use pvlive::channel::SimClient;
use pvlive::data::parameter::PlotUpdateMode;
use pvlive::data::parameters::ParameterCollection;
use pvlive::persistence::{
    capture_session, load_session_from_path, restore_session, save_session_to_path,
    session_from_json, ParameterEntrySerde, SessionSerde,
};

const T: Duration = Duration::from_millis(100);

#[test]
fn capture_reflects_rows_in_display_order() {
    let client = SimClient::beamline();
    let mut params = ParameterCollection::new(100);
    let eta = params.add_by_name(&client, "Eta", "6idb1:m17.RBV", T).unwrap();
    let delta = params.add_by_name(&client, "Delta", "6idb1:m18.RBV", T).unwrap();
    params.attach_plot(delta, PlotUpdateMode::OnUpdate);
    params.set_order(&[delta, eta]);

    let s = capture_session(&params);
    assert_eq!(
        s.parameters,
        vec![
            ParameterEntrySerde {
                name: "Delta".into(),
                pv: "6idb1:m18.RBV".into(),
                plot: true,
                image_width: None,
            },
            ParameterEntrySerde {
                name: "Eta".into(),
                pv: "6idb1:m17.RBV".into(),
                plot: false,
                image_width: None,
            },
        ]
    );
}

#[test]
fn file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let session = SessionSerde {
        parameters: vec![ParameterEntrySerde {
            name: "Cam".into(),
            pv: "6idbPS1:image1:ArrayData".into(),
            plot: false,
            image_width: Some(64),
        }],
    };
    save_session_to_path(&session, &path).unwrap();
    assert_eq!(load_session_from_path(&path).unwrap(), session);
}

#[test]
fn missing_fields_default() {
    let s = session_from_json(r#"{"parameters":[{"name":"Delta","pv":"6idb1:m18.RBV"}]}"#).unwrap();
    assert!(!s.parameters[0].plot);
    assert_eq!(s.parameters[0].image_width, None);
}

#[test]
fn restore_skips_entries_that_do_not_connect() {
    let client = SimClient::beamline();
    let mut params = ParameterCollection::new(100);
    let session = session_from_json(
        r#"{"parameters":[
            {"name":"Delta","pv":"6idb1:m18.RBV","plot":true},
            {"name":"Gone","pv":"nowhere:pv"},
            {"name":"Cam","pv":"6idbPS1:image1:ArrayData","image_width":32}
        ]}"#,
    )
    .unwrap();

    let added = restore_session(&session, &mut params, &client, T);
    assert_eq!(added.len(), 2);
    assert!(added[0].1);
    assert!(!added[1].1);
    assert_eq!(params.len(), 2);
    assert_eq!(params.get(added[1].0).unwrap().image_width, Some(32));
}
