use std::time::Duration;

use pvlive::channel::{PvValue, SimChannel, SimSignal, ValueKind, DEFAULT_PRECISION};

#[test]
fn numeric_values_render_with_units() {
    assert_eq!(PvValue::Int(42).display(3), "42");
    assert_eq!(PvValue::Int(42).display_with_units(3, "cts"), "42 cts");
    assert_eq!(PvValue::Float(1.23456).display(3), "1.235");
    assert_eq!(
        PvValue::Float(2.0).display_with_units(DEFAULT_PRECISION, "deg"),
        "2.000 deg"
    );
    assert_eq!(PvValue::Float(1.5).display_with_units(3, ""), "1.500");
}

#[test]
fn non_numeric_values_ignore_units() {
    let text = PvValue::Text("Eta axis".into());
    assert_eq!(text.display(3), "Eta axis");
    assert_eq!(text.display_with_units(3, "deg"), "Eta axis");

    let array = PvValue::Array(vec![0.0; 5]);
    assert_eq!(array.display(3), "[5 elements]");
    assert_eq!(array.display_with_units(3, "counts"), "[5 elements]");
    assert_eq!(PvValue::Array(Vec::new()).display(3), "[0 elements]");

    let other = PvValue::Unsupported("DBF_MENU".into());
    assert_eq!(other.display_with_units(3, "deg"), "<DBF_MENU>");
    assert_eq!(other.kind(), ValueKind::Unsupported);
}

#[test]
fn constant_holds_its_value() {
    let ch = SimChannel::constant(PvValue::Text("Eta".into()));
    assert_eq!(ch.sample(0.0), PvValue::Text("Eta".into()));
    assert_eq!(ch.sample(123.0), PvValue::Text("Eta".into()));
}

#[test]
fn sine_oscillates_around_offset() {
    let ch = SimChannel::signal(SimSignal::Sine {
        amplitude: 2.0,
        period_secs: 20.0,
        offset: 30.0,
    });
    let at = |t: f64| ch.sample(t).as_f64().unwrap();
    assert!((at(0.0) - 30.0).abs() < 1e-9);
    assert!((at(5.0) - 32.0).abs() < 1e-9);
    assert!((at(15.0) - 28.0).abs() < 1e-9);
    assert!((at(20.0) - 30.0).abs() < 1e-9);
}

#[test]
fn ramp_wraps_within_range() {
    let ch = SimChannel::signal(SimSignal::Ramp {
        min: 10.0,
        max: 20.0,
        rate: 4.0,
    });
    let at = |t: f64| ch.sample(t).as_f64().unwrap();
    assert_eq!(at(0.0), 10.0);
    assert_eq!(at(1.0), 14.0);
    assert_eq!(at(2.5), 10.0);
    assert_eq!(at(3.0), 12.0);
    for i in 0..200 {
        let y = at(i as f64 * 0.07);
        assert!((10.0..20.0).contains(&y), "{} out of range", y);
    }
}

#[test]
fn counter_steps_once_per_period() {
    let ch = SimChannel::signal(SimSignal::Counter { step: 3 }).period(Duration::from_millis(100));
    assert_eq!(ch.sample(0.0), PvValue::Int(0));
    assert_eq!(ch.sample(0.35), PvValue::Int(9));
}

#[test]
fn counter_saturates_instead_of_overflowing() {
    let mut ch = SimChannel::signal(SimSignal::Counter { step: i64::MAX })
        .period(Duration::from_millis(1));
    ch.value = PvValue::Int(5);
    assert_eq!(ch.sample(10.0), PvValue::Int(i64::MAX));

    let mut down = SimChannel::signal(SimSignal::Counter { step: i64::MIN })
        .period(Duration::from_millis(1));
    down.value = PvValue::Int(-5);
    assert_eq!(down.sample(10.0), PvValue::Int(i64::MIN));
}

#[test]
fn spot_fills_the_frame() {
    let ch = SimChannel::signal(SimSignal::Spot {
        width: 8,
        height: 4,
        period_secs: 2.0,
    });
    for t in [0.0, 0.5, 1.3] {
        let PvValue::Array(frame) = ch.sample(t) else {
            panic!("spot should sample an array");
        };
        assert_eq!(frame.len(), 8 * 4);
        assert!(frame.iter().all(|v| v.is_finite() && *v >= 0.0 && *v <= 1000.0));
        assert!(frame.iter().any(|v| *v > 0.0));
    }
    assert_eq!(ch.sample(0.0).kind(), ValueKind::Array);
}
