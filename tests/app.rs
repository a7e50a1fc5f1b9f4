use std::sync::Arc;

use pvlive::channel::{ChannelClient, PvValue, SimClient};
use pvlive::config::{AppConfig, ParameterSpec};
use pvlive::panels::image_ui::ImagePanel;
use pvlive::panels::line_plot_ui::{visible_y_bounds, LinePlotPanel};
use pvlive::panels::panel_trait::PanelRequest;
use pvlive::panels::spotlight_ui::SpotlightPanel;
use pvlive::{MainApp, ParameterId};

fn app_with(parameters: Vec<ParameterSpec>) -> MainApp {
    let cfg = AppConfig {
        parameters,
        ..AppConfig::default()
    };
    let client: Arc<dyn ChannelClient> = Arc::new(SimClient::beamline());
    let mut app = MainApp::new(cfg, client);
    app.add_initial_parameters();
    app
}

fn id_of(app: &MainApp, name: &str) -> ParameterId {
    app.params
        .iter()
        .find(|p| p.display_name == name)
        .map(|p| p.id)
        .unwrap()
}

fn plot_views(app: &MainApp, id: ParameterId) -> usize {
    app.views()
        .iter()
        .filter(|v| v.downcast_ref::<LinePlotPanel>().is_some() && v.parameter() == Some(id))
        .count()
}

#[test]
fn default_parameters_are_added() {
    let app = app_with(AppConfig::default().parameters);
    let names: Vec<&str> = app.params.iter().map(|p| p.display_name.as_str()).collect();
    assert_eq!(names, vec!["Delta", "Eta"]);
    // Only the spotlight tab is open at start.
    assert_eq!(app.views().len(), 1);
    assert!(app.views()[0].downcast_ref::<SpotlightPanel>().is_some());
}

#[test]
fn failing_initial_parameters_are_skipped() {
    let app = app_with(vec![
        ParameterSpec::new("Gone", "nowhere:pv"),
        ParameterSpec::new("Delta", "6idb1:m18.RBV"),
    ]);
    assert_eq!(app.params.len(), 1);
}

#[test]
fn opening_a_plot_twice_keeps_one_view() {
    let mut app = app_with(AppConfig::default().parameters);
    let delta = id_of(&app, "Delta");
    assert!(app.open_plot(delta));
    assert!(app.open_plot(delta));
    assert_eq!(plot_views(&app, delta), 1);
    assert!(app.params.get(delta).unwrap().is_plot_attached());
    assert_eq!(app.active_view().and_then(|v| v.parameter()), Some(delta));
}

#[test]
fn plot_from_config_is_opened() {
    let mut spec = ParameterSpec::new("Delta", "6idb1:m18.RBV");
    spec.plot = true;
    let app = app_with(vec![spec]);
    let delta = id_of(&app, "Delta");
    assert_eq!(plot_views(&app, delta), 1);
}

#[test]
fn text_rows_cannot_be_plotted() {
    let mut app = app_with(vec![ParameterSpec::new("Desc", "6idb1:m17.DESC")]);
    let desc = id_of(&app, "Desc");
    assert!(!app.open_plot(desc));
    assert_eq!(app.views().len(), 1);
}

#[test]
fn closing_a_plot_detaches_it() {
    let mut app = app_with(AppConfig::default().parameters);
    let delta = id_of(&app, "Delta");
    app.open_plot(delta);
    let index = app
        .views()
        .iter()
        .position(|v| v.downcast_ref::<LinePlotPanel>().is_some())
        .unwrap();
    app.close_view(index);
    assert_eq!(plot_views(&app, delta), 0);
    assert!(!app.params.get(delta).unwrap().is_plot_attached());
}

#[test]
fn image_view_picks_up_companion_width() {
    let mut app = app_with(vec![ParameterSpec::new("Cam", "6idbPS1:image1:ArrayData")]);
    let cam = id_of(&app, "Cam");
    assert!(app.open_image(cam));
    assert!(app.open_image(cam));
    assert_eq!(app.params.get(cam).unwrap().image_width, Some(64));
    let images = app
        .views()
        .iter()
        .filter(|v| v.downcast_ref::<ImagePanel>().is_some())
        .count();
    assert_eq!(images, 1);
}

#[test]
fn drops_open_the_matching_view() {
    let mut app = app_with(vec![
        ParameterSpec::new("Delta", "6idb1:m18.RBV"),
        ParameterSpec::new("Cam", "6idbPS1:image1:ArrayData"),
        ParameterSpec::new("Desc", "6idb1:m17.DESC"),
    ]);
    let delta = id_of(&app, "Delta");
    let cam = id_of(&app, "Cam");
    let desc = id_of(&app, "Desc");

    app.request(PanelRequest::Dropped(delta));
    app.request(PanelRequest::Dropped(cam));
    app.request(PanelRequest::Dropped(desc));
    app.process_requests();

    assert_eq!(plot_views(&app, delta), 1);
    assert!(app
        .views()
        .iter()
        .any(|v| v.downcast_ref::<ImagePanel>().is_some() && v.parameter() == Some(cam)));
    let spot = app
        .views()
        .iter()
        .find_map(|v| v.downcast_ref::<SpotlightPanel>())
        .unwrap();
    assert_eq!(spot.selected, Some(desc));
}

#[test]
fn spotlight_reopens_after_close() {
    let mut app = app_with(AppConfig::default().parameters);
    let eta = id_of(&app, "Eta");
    app.close_view(0);
    assert!(app.views().is_empty());
    app.spotlight(eta);
    assert_eq!(app.views().len(), 1);
    assert_eq!(app.active_view().and_then(|v| v.parameter()), Some(eta));
}

#[test]
fn removing_a_parameter_closes_its_views() {
    let mut app = app_with(AppConfig::default().parameters);
    let delta = id_of(&app, "Delta");
    app.open_plot(delta);
    app.spotlight(delta);

    app.request(PanelRequest::Remove(delta));
    app.process_requests();

    assert!(app.params.get(delta).is_none());
    assert_eq!(plot_views(&app, delta), 0);
    let spot = app
        .views()
        .iter()
        .find_map(|v| v.downcast_ref::<SpotlightPanel>())
        .unwrap();
    assert_eq!(spot.selected, None);

    // Events still in flight for the removed row are ignored.
    app.params
        .sink()
        .send_value(delta, PvValue::Float(1.0))
        .unwrap();
    app.update_data(pvlive::monitor::now_secs());
    assert_eq!(app.params.len(), 1);
}

#[test]
fn session_roundtrip_through_app() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let mut app = app_with(AppConfig::default().parameters);
    let eta = id_of(&app, "Eta");
    app.open_plot(eta);
    app.save_session(&path).unwrap();

    let mut fresh = app_with(Vec::new());
    assert_eq!(fresh.load_session(&path).unwrap(), 2);
    let eta2 = id_of(&fresh, "Eta");
    assert_eq!(plot_views(&fresh, eta2), 1);
}

#[test]
fn y_bounds_cover_visible_points() {
    let pts = [[-20.0, 100.0], [-5.0, 1.0], [-1.0, 3.0], [0.0, 2.0]];
    let (lo, hi) = visible_y_bounds(&pts, 10.0).unwrap();
    assert!((lo - 0.9).abs() < 1e-9);
    assert!((hi - 3.1).abs() < 1e-9);
    assert_eq!(visible_y_bounds(&[], 10.0), None);
    let (lo, hi) = visible_y_bounds(&[[0.0, 0.0]], 10.0).unwrap();
    assert!(lo < 0.0 && hi > 0.0);
}
