use eframe::egui;
use egui::{RichText, TextureHandle, TextureOptions, Ui};
use egui_phosphor::regular::{FLOPPY_DISK, IMAGE};
use log::{info, warn};

use super::panel_trait::{Panel, PanelData, PanelState};
use crate::data::image::ImageFrame;
use crate::data::parameters::ParameterCollection;
use crate::monitor::ParameterId;

/// Grayscale view of one array parameter.
pub struct ImagePanel {
    pub state: PanelState,
    pub id: ParameterId,
    frame: Option<ImageFrame>,
    texture: Option<TextureHandle>,
    /// `update_count` of the value the texture was built from.
    shown_update: Option<u64>,
}

impl ImagePanel {
    pub fn new(id: ParameterId) -> Self {
        Self {
            state: PanelState::new("Image", IMAGE),
            id,
            frame: None,
            texture: None,
            shown_update: None,
        }
    }

    pub fn frame(&self) -> Option<&ImageFrame> {
        self.frame.as_ref()
    }

    /// Regenerate the texture if the parameter's value changed.
    fn ensure_texture(&mut self, ctx: &egui::Context, data: &PanelData<'_>) {
        let Some(p) = data.params.get(self.id) else {
            return;
        };
        if self.shown_update == Some(p.update_count) && self.texture.is_some() {
            return;
        }
        self.shown_update = Some(p.update_count);
        self.frame = p
            .value
            .as_array()
            .and_then(|values| ImageFrame::from_array(values, p.image_width));
        let Some(frame) = &self.frame else {
            self.texture = None;
            return;
        };
        let img = frame.to_color_image();
        match &mut self.texture {
            Some(tex) => tex.set(img, TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture(
                    format!("image_view_{}", self.id),
                    img,
                    TextureOptions::NEAREST,
                ))
            }
        }
    }
}

impl Panel for ImagePanel {
    fn state(&self) -> &PanelState {
        &self.state
    }
    fn state_mut(&mut self) -> &mut PanelState {
        &mut self.state
    }

    fn title(&self, params: &ParameterCollection) -> String {
        match params.get(self.id) {
            Some(p) => format!("{} {}", IMAGE, p.display_name),
            None => format!("{} Image", IMAGE),
        }
    }

    fn parameter(&self) -> Option<ParameterId> {
        Some(self.id)
    }

    fn render_panel(&mut self, ui: &mut Ui, data: &mut PanelData<'_>) {
        if data.params.get(self.id).is_none() {
            ui.label(RichText::new("Parameter was removed.").weak());
            return;
        }
        self.ensure_texture(ui.ctx(), data);

        let Some(frame) = &self.frame else {
            ui.label(RichText::new("No image data.").weak());
            return;
        };

        ui.horizontal(|ui| {
            ui.label(format!("{} × {}", frame.width, frame.height));
            ui.label(
                RichText::new(format!("range {:.3} … {:.3}", frame.min, frame.max)).weak(),
            );
            if ui
                .button(format!("{} Save PNG", FLOPPY_DISK))
                .on_hover_text("Save the current frame as grayscale PNG")
                .clicked()
            {
                if let Some(path) = rfd::FileDialog::new()
                    .set_file_name("image.png")
                    .add_filter("PNG", &["png"])
                    .save_file()
                {
                    match frame.save_png(&path) {
                        Ok(()) => info!("saved image to {}", path.display()),
                        Err(e) => {
                            warn!("PNG export to {} failed: {}", path.display(), e);
                            *data.status = Some(format!("PNG export failed: {}", e));
                        }
                    }
                }
            }
        });

        if let Some(tex) = &self.texture {
            let avail = ui.available_size();
            let [w, h] = [frame.width as f32, frame.height as f32];
            let scale = (avail.x / w).min(avail.y / h).max(0.0);
            ui.centered_and_justified(|ui| {
                ui.add(egui::Image::new(tex).fit_to_exact_size(egui::vec2(w * scale, h * scale)));
            });
        }
    }
}
