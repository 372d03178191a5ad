//! Cross-context message protocol between host and peer.
//!
//! ```text
//! peer → host   "ready"                                          readiness signal
//! peer → host   {"action":"navigate","url":"…"}                  move the frame
//! host → peer   {"type":"init","data":{"host":{"version":"…"}}}  once, after ready
//! host → peer   {"action":"reload"}                              layout-change broadcast
//! ```
//!
//! Every other shape is ignored in both directions.

use boardframe_host::FrameKey;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Bare value the peer posts once it can receive messages.
pub const READY_SIGNAL: &str = "ready";
/// `action` of a peer navigation request.
pub const ACTION_NAVIGATE: &str = "navigate";
/// `action` of the host reload instruction.
pub const ACTION_RELOAD: &str = "reload";
/// `type` of the host initialization message.
pub const TYPE_INIT: &str = "init";

/// A message received from a frame's browsing context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerEvent {
    /// Frame the message came from.
    pub source: FrameKey,
    /// Origin reported by the host for the sender, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// The posted payload.
    pub data: Value,
}

impl PeerEvent {
    pub fn new(source: FrameKey, data: Value) -> Self {
        Self {
            source,
            origin: None,
            data,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// Decoded peer → host payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerMessage {
    Ready,
    Navigate { url: String },
    Unknown,
}

impl PeerMessage {
    pub fn from_value(data: &Value) -> Self {
        if data.as_str() == Some(READY_SIGNAL) {
            return PeerMessage::Ready;
        }
        let action = data.get("action").and_then(Value::as_str);
        match (action, data.get("url").and_then(Value::as_str)) {
            (Some(ACTION_NAVIGATE), Some(url)) => PeerMessage::Navigate {
                url: url.to_string(),
            },
            _ => PeerMessage::Unknown,
        }
    }
}

/// Host → peer payload.
#[derive(Debug, Clone, PartialEq)]
pub enum HostMessage {
    /// Host context, sent once when the peer becomes ready.
    Init { host_version: String },
    /// Ask the peer to reload its internal state.
    Reload,
    /// Any other payload, passed through unchanged.
    Custom(Value),
}

impl HostMessage {
    pub fn to_value(&self) -> Value {
        match self {
            HostMessage::Init { host_version } => json!({
                "type": TYPE_INIT,
                "data": { "host": { "version": host_version } },
            }),
            HostMessage::Reload => json!({ "action": ACTION_RELOAD }),
            HostMessage::Custom(value) => value.clone(),
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            HostMessage::Init { .. } => "init",
            HostMessage::Reload => "reload",
            HostMessage::Custom(_) => "custom",
        }
    }
}
