//! Top-level entry point for running pvlive as a native window.

use std::sync::Arc;

use eframe::egui;
use log::{info, warn};

use crate::channel::ChannelClient;
use crate::config::AppConfig;

use super::MainApp;

/// Launch the application in a native window.
///
/// Builds a [`MainApp`] on `client`, registers the configured initial
/// parameters (unless `initial_parameters` is false), optionally loads a
/// session file, then enters the eframe event loop. Blocks until the window
/// is closed.
pub fn run_app(
    cfg: AppConfig,
    client: Arc<dyn ChannelClient>,
    initial_parameters: bool,
    session: Option<std::path::PathBuf>,
) -> eframe::Result<()> {
    let title = cfg.title.clone();
    let [w, h] = cfg.window_size;

    let mut app = MainApp::new(cfg, client);
    if initial_parameters {
        app.add_initial_parameters();
    }
    if let Some(path) = session {
        if let Err(e) = app.load_session(&path) {
            warn!("could not load session {}: {}", path.display(), e);
        }
    }
    info!("starting '{}' with {} parameters", title, app.params.len());

    let mut viewport = egui::ViewportBuilder::default()
        .with_title(&title)
        .with_inner_size(egui::vec2(w, h));
    if let Some(icon) = load_app_icon_svg() {
        viewport = viewport.with_icon(icon);
    }
    let opts = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        &title,
        opts,
        Box::new(|cc| {
            // Install Phosphor icon font before creating the app.
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            Ok(Box::new(app))
        }),
    )
}

/// Attempt to load the project's `icon.svg` as an [`egui::IconData`].
///
/// Returns `None` if the file does not exist or cannot be parsed/rendered.
fn load_app_icon_svg() -> Option<egui::IconData> {
    let svg_path = concat!(env!("CARGO_MANIFEST_DIR"), "/icon.svg");
    let data = std::fs::read(svg_path).ok()?;

    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_data(&data, &opt).ok()?;
    let size = tree.size().to_int_size();
    if size.width() == 0 || size.height() == 0 {
        return None;
    }
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())?;
    let mut canvas = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::default(), &mut canvas);
    let rgba = pixmap.take();
    Some(egui::IconData {
        rgba,
        width: size.width(),
        height: size.height(),
    })
}
