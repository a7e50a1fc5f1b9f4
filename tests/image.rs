use std::time::Duration;

use pvlive::channel::SimClient;
use pvlive::data::image::{infer_shape, resolve_width, width_channel_name, ImageFrame};

#[test]
fn shape_inference() {
    assert_eq!(infer_shape(0, None), None);
    assert_eq!(infer_shape(16, None), Some((4, 4)));
    assert_eq!(infer_shape(12, None), Some((12, 1)));
    assert_eq!(infer_shape(12, Some(4)), Some((4, 3)));
    // Partial trailing row is dropped.
    assert_eq!(infer_shape(13, Some(4)), Some((4, 3)));
    // Unusable widths fall back to inference.
    assert_eq!(infer_shape(16, Some(0)), Some((4, 4)));
    assert_eq!(infer_shape(16, Some(20)), Some((4, 4)));
}

#[test]
fn normalizes_to_full_gray_range() {
    let frame = ImageFrame::from_array(&[10.0, 20.0, 30.0, 40.0], None).unwrap();
    assert_eq!((frame.width, frame.height), (2, 2));
    assert_eq!(frame.pixels, vec![0, 85, 170, 255]);
    assert_eq!((frame.min, frame.max), (10.0, 40.0));
}

#[test]
fn constant_and_non_finite_values_map_to_black() {
    let flat = ImageFrame::from_array(&[5.0; 9], None).unwrap();
    assert!(flat.pixels.iter().all(|&p| p == 0));

    let frame = ImageFrame::from_array(&[0.0, f64::NAN, 1.0, 1.0], None).unwrap();
    assert_eq!(frame.pixels, vec![0, 0, 255, 255]);
}

#[test]
fn empty_array_has_no_frame() {
    assert!(ImageFrame::from_array(&[], Some(4)).is_none());
}

#[test]
fn color_image_matches_frame_size() {
    let frame = ImageFrame::from_array(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0], Some(3)).unwrap();
    let img = frame.to_color_image();
    assert_eq!(img.size, [3, 2]);
}

#[test]
fn width_channel_follows_array_data_naming() {
    assert_eq!(
        width_channel_name("6idbPS1:image1:ArrayData").as_deref(),
        Some("6idbPS1:image1:ArraySize0_RBV")
    );
    assert_eq!(width_channel_name("6idb1:m18.RBV"), None);
}

#[test]
fn width_is_read_from_companion_channel() {
    let client = SimClient::beamline();
    let t = Duration::from_millis(100);
    assert_eq!(resolve_width(&client, "6idbPS1:image1:ArrayData", t), Some(64));
    assert_eq!(resolve_width(&client, "other:ArrayData", t), None);
}

#[test]
fn saves_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    let frame = ImageFrame::from_array(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0], Some(3)).unwrap();
    frame.save_png(&path).unwrap();

    let back = image::open(&path).unwrap().to_luma8();
    assert_eq!(back.dimensions(), (3, 2));
    assert_eq!(back.into_raw(), frame.pixels);
}
