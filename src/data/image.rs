//! Turning array channel values into displayable grayscale frames.

use std::path::Path;
use std::time::Duration;

use eframe::egui;
use log::debug;

use crate::channel::ChannelClient;

const ARRAY_DATA_SUFFIX: &str = ":ArrayData";
const ARRAY_WIDTH_SUFFIX: &str = ":ArraySize0_RBV";

/// An 8-bit grayscale frame derived from an array value.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFrame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
    /// Raw value mapped to 0.
    pub min: f64,
    /// Raw value mapped to 255.
    pub max: f64,
}

/// Pick `(width, height)` for `len` elements.
///
/// An explicit width wins (a trailing partial row is dropped). Without one a
/// perfect square is assumed; anything else is shown as a single row.
pub fn infer_shape(len: usize, width: Option<usize>) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    match width {
        Some(w) if w > 0 && w <= len => Some((w, len / w)),
        _ => {
            let side = (len as f64).sqrt().round() as usize;
            if side * side == len {
                Some((side, side))
            } else {
                Some((len, 1))
            }
        }
    }
}

/// Name of the channel holding the row width of an areaDetector style
/// `...:ArrayData` channel.
pub fn width_channel_name(pv_name: &str) -> Option<String> {
    pv_name
        .strip_suffix(ARRAY_DATA_SUFFIX)
        .map(|prefix| format!("{}{}", prefix, ARRAY_WIDTH_SUFFIX))
}

/// Read the image width from the companion width channel, if there is one.
pub fn resolve_width(
    client: &dyn ChannelClient,
    pv_name: &str,
    timeout: Duration,
) -> Option<usize> {
    let width_pv = width_channel_name(pv_name)?;
    match client.connect(&width_pv, timeout) {
        Ok(info) => info
            .value
            .as_f64()
            .filter(|w| *w >= 1.0)
            .map(|w| w as usize),
        Err(e) => {
            debug!("no width channel for '{}': {}", pv_name, e);
            None
        }
    }
}

impl ImageFrame {
    /// Reshape and normalize `values` to 0..=255. Returns `None` for empty input.
    pub fn from_array(values: &[f64], width: Option<usize>) -> Option<Self> {
        let (w, h) = infer_shape(values.len(), width)?;
        let used = &values[..w * h];
        let (min, max) = used
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let (min, max) = if min.is_finite() { (min, max) } else { (0.0, 0.0) };
        let span = max - min;
        let pixels = used
            .iter()
            .map(|&v| {
                if span <= 0.0 || !v.is_finite() {
                    0
                } else {
                    (((v - min) / span) * 255.0).round().clamp(0.0, 255.0) as u8
                }
            })
            .collect();
        Some(Self {
            width: w,
            height: h,
            pixels,
            min,
            max,
        })
    }

    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_gray([self.width, self.height], &self.pixels)
    }

    /// Write the frame as an 8-bit grayscale PNG.
    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        let img = image::GrayImage::from_raw(
            self.width as u32,
            self.height as u32,
            self.pixels.clone(),
        )
        .ok_or_else(|| {
            image::ImageError::Parameter(image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            ))
        })?;
        img.save(path)
    }
}
