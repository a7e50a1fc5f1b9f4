use std::sync::Mutex;
use std::time::Duration;

use pvlive::channel::{ChannelClient, ChannelInfo, PvValue, SimClient, Subscription};
use pvlive::data::parameter::Parameter;
use pvlive::error::ChannelError;
use pvlive::monitor::{MonitorSink, ParameterId};
use pvlive::panels::parameter_ui::PendingEdits;

const T: Duration = Duration::from_millis(100);

/// Beamline simulator that records every put.
struct RecordingClient {
    inner: SimClient,
    puts: Mutex<Vec<(String, PvValue)>>,
}

impl RecordingClient {
    fn new() -> Self {
        Self {
            inner: SimClient::beamline(),
            puts: Mutex::new(Vec::new()),
        }
    }

    fn puts(&self) -> Vec<(String, PvValue)> {
        self.puts.lock().unwrap().clone()
    }
}

impl ChannelClient for RecordingClient {
    fn connect(&self, pv_name: &str, timeout: Duration) -> Result<ChannelInfo, ChannelError> {
        self.inner.connect(pv_name, timeout)
    }

    fn subscribe(
        &self,
        pv_name: &str,
        id: ParameterId,
        sink: MonitorSink,
    ) -> Result<Subscription, ChannelError> {
        self.inner.subscribe(pv_name, id, sink)
    }

    fn put(&self, pv_name: &str, value: PvValue) -> Result<(), ChannelError> {
        self.puts
            .lock()
            .unwrap()
            .push((pv_name.to_string(), value.clone()));
        self.inner.put(pv_name, value)
    }
}

fn row(client: &RecordingClient, pv: &str) -> Parameter {
    Parameter::from_info(7, "Row", client.connect(pv, T).unwrap(), 10)
}

#[test]
fn dragging_a_setpoint_writes_once() {
    let client = RecordingClient::new();
    let mut p = row(&client, "6idb1:m18.VAL");
    let mut edits = PendingEdits::default();

    // One edit per frame while the value is dragged from 30 to 40.
    for step in 1..=20 {
        edits.edit(p.id, PvValue::Float(30.0 + step as f64 * 0.5));
    }
    assert!(client.puts().is_empty());
    assert_eq!(p.value, PvValue::Float(30.0));

    assert!(edits.finish(&mut p, &client, false).unwrap());
    assert_eq!(
        client.puts(),
        vec![("6idb1:m18.VAL".to_string(), PvValue::Float(40.0))]
    );
    assert_eq!(p.value, PvValue::Float(40.0));
    assert_eq!(edits.get(p.id), None);

    // Nothing left to write for a second release.
    assert!(!edits.finish(&mut p, &client, false).unwrap());
    assert_eq!(client.puts().len(), 1);
}

#[test]
fn typed_digits_are_written_as_one_value() {
    let client = RecordingClient::new();
    let mut p = row(&client, "6idb1:scaler1.CNT");
    let mut edits = PendingEdits::default();
    edits.edit(p.id, PvValue::Int(4));
    edits.edit(p.id, PvValue::Int(45));
    edits.finish(&mut p, &client, false).unwrap();
    assert_eq!(
        client.puts(),
        vec![("6idb1:scaler1.CNT".to_string(), PvValue::Int(45))]
    );
}

#[test]
fn unchanged_value_is_not_written() {
    let client = RecordingClient::new();
    let mut p = row(&client, "6idb1:m18.VAL");
    let mut edits = PendingEdits::default();
    edits.edit(p.id, PvValue::Float(30.0));
    assert!(!edits.finish(&mut p, &client, false).unwrap());
    assert!(client.puts().is_empty());
}

#[test]
fn escape_drops_the_edit() {
    let client = RecordingClient::new();
    let mut p = row(&client, "6idb1:m17.DESC");
    let mut edits = PendingEdits::default();
    edits.edit(p.id, PvValue::Text("half typ".into()));

    assert!(!edits.finish(&mut p, &client, true).unwrap());
    assert!(client.puts().is_empty());
    assert_eq!(p.value, PvValue::Text("Eta".into()));
    assert_eq!(edits.get(p.id), None);
}

#[test]
fn failed_write_keeps_row_value() {
    let client = RecordingClient::new();
    let mut p = row(&client, "6idb1:m18.VAL");
    let mut edits = PendingEdits::default();
    edits.edit(p.id, PvValue::Text("oops".into()));
    let err = edits.finish(&mut p, &client, false).unwrap_err();
    assert!(matches!(err, ChannelError::TypeMismatch { .. }));
    assert_eq!(p.value, PvValue::Float(30.0));
}
