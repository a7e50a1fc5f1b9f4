//! Error types for channel access and configuration.
//!
//! Channel errors are what the operator eventually sees as "Not Connected" (or
//! as a status line message after a failed write); configuration errors come
//! from loading YAML config files and JSON session files.

use std::time::Duration;

use thiserror::Error;

use crate::channel::ValueKind;

/// Errors returned by a [`ChannelClient`](crate::channel::ChannelClient).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    /// The name did not resolve to a live channel within the timeout.
    #[error("no response from '{pv_name}' within {timeout:?}")]
    Timeout { pv_name: String, timeout: Duration },

    /// The channel was resolved once but is no longer served.
    #[error("channel '{0}' not found")]
    NotFound(String),

    /// A put was attempted on a channel without write access.
    #[error("channel '{0}' is read-only")]
    ReadOnly(String),

    /// A put carried a value of the wrong kind for the channel.
    #[error("type mismatch: channel holds {expected}, got {found}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },

    /// The client lost its connection while a request was in flight.
    #[error("channel '{0}' disconnected")]
    Disconnected(String),
}

/// Errors from loading or saving configuration and session files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
