//! Session persistence: save and load the parameter list to/from JSON files.
//!
//! Only the row definitions are stored (names, PV names and which rows had a
//! plot open). Values and history are live data and are rebuilt on load.

use std::path::Path;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::channel::ChannelClient;
use crate::data::parameters::ParameterCollection;
use crate::error::ConfigError;
use crate::monitor::ParameterId;

/// Serializable version of one parameter row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterEntrySerde {
    pub name: String,
    pub pv: String,
    #[serde(default)]
    pub plot: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_width: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSerde {
    pub parameters: Vec<ParameterEntrySerde>,
}

/// Snapshot the rows of `params` in display order.
pub fn capture_session(params: &ParameterCollection) -> SessionSerde {
    SessionSerde {
        parameters: params
            .iter()
            .map(|p| ParameterEntrySerde {
                name: p.display_name.clone(),
                pv: p.pv_name.clone(),
                plot: p.is_plot_attached(),
                image_width: p.image_width,
            })
            .collect(),
    }
}

/// Connect every entry of `session` and add it to `params`.
///
/// Entries that fail to connect are skipped with a warning. Returns the ids of
/// the added rows together with their stored `plot` flag.
pub fn restore_session(
    session: &SessionSerde,
    params: &mut ParameterCollection,
    client: &dyn ChannelClient,
    timeout: Duration,
) -> Vec<(ParameterId, bool)> {
    let mut added = Vec::new();
    for entry in &session.parameters {
        match params.add_by_name(client, &entry.name, &entry.pv, timeout) {
            Ok(id) => {
                if let Some(p) = params.get_mut(id) {
                    p.image_width = entry.image_width;
                }
                added.push((id, entry.plot));
            }
            Err(e) => warn!("skipping session entry '{}': {}", entry.name, e),
        }
    }
    added
}

pub fn session_to_json(session: &SessionSerde) -> Result<String, ConfigError> {
    Ok(serde_json::to_string_pretty(session)?)
}

pub fn session_from_json(json: &str) -> Result<SessionSerde, ConfigError> {
    Ok(serde_json::from_str(json)?)
}

pub fn save_session_to_path(session: &SessionSerde, path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, session_to_json(session)?)?;
    Ok(())
}

pub fn load_session_from_path(path: &Path) -> Result<SessionSerde, ConfigError> {
    let s = std::fs::read_to_string(path)?;
    session_from_json(&s)
}
