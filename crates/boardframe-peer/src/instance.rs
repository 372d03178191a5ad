use std::fmt;

use boardframe_host::{FrameElement, FrameHost, FrameKey, FrameSpec, MountTarget, ViewMode};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{EmbedError, Result};
use crate::message::{HostMessage, PeerEvent, PeerMessage};
use crate::origin::OriginPolicy;

/// Observable lifecycle state of a [`FrameInstance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameState {
    Uninitialized,
    AwaitingReady,
    Ready,
    Destroyed,
}

/// Result of [`FrameInstance::send`]. Dropped sends are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendOutcome {
    Delivered,
    /// The peer has not announced readiness yet.
    NotReady,
    /// The instance is destroyed.
    Destroyed,
    /// The host failed to deliver; already logged.
    Failed,
}

impl SendOutcome {
    pub fn is_delivered(self) -> bool {
        matches!(self, SendOutcome::Delivered)
    }
}

/// What an inbound peer message did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Dispatch {
    /// The instance became ready and sent its init message.
    Ready,
    /// Readiness was already established; nothing was sent.
    AlreadyReady,
    /// The frame location changed.
    Navigated { url: String },
    /// The message was not acted on.
    Ignored,
    /// The sender's origin is not permitted.
    Rejected { origin: Option<String> },
}

/// Per-instance messaging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceOptions {
    /// Host version reported in the init message.
    pub host_version: String,
    /// `targetOrigin` used when posting to the peer.
    pub target_origin: String,
    /// Accepted sender origins for inbound messages.
    pub origin_policy: OriginPolicy,
}

impl Default for InstanceOptions {
    fn default() -> Self {
        Self {
            host_version: boardframe_block::UNKNOWN_VERSION.to_string(),
            target_origin: "*".to_string(),
            origin_policy: OriginPolicy::Any,
        }
    }
}

enum Lifecycle {
    Uninitialized,
    AwaitingReady(Box<dyn FrameElement>),
    Ready(Box<dyn FrameElement>),
    Destroyed,
}

/// One live embedded frame.
///
/// The instance owns its frame element exclusively. The element is only
/// reachable through the `AwaitingReady` and `Ready` states, so nothing can be
/// posted before mounting or after destruction. Dropping the instance
/// destroys it.
pub struct FrameInstance {
    target: MountTarget,
    spec: FrameSpec,
    location: Url,
    options: InstanceOptions,
    key: Option<FrameKey>,
    lifecycle: Lifecycle,
}

impl FrameInstance {
    pub fn new(target: MountTarget, spec: FrameSpec, options: InstanceOptions) -> Self {
        let location = spec.url.clone();
        Self {
            target,
            spec,
            location,
            options,
            key: None,
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    /// Create the frame element. `Uninitialized → AwaitingReady`.
    ///
    /// Mounting an already mounted instance returns its key unchanged.
    pub fn mount<H: FrameHost + ?Sized>(&mut self, host: &mut H) -> Result<FrameKey> {
        match self.lifecycle {
            Lifecycle::Uninitialized => {}
            Lifecycle::AwaitingReady(_) | Lifecycle::Ready(_) => {
                return self.key.ok_or(EmbedError::Destroyed);
            }
            Lifecycle::Destroyed => return Err(EmbedError::Destroyed),
        }

        let element = host.mount_frame(&self.target, &self.spec)?;
        let key = element.key();
        self.key = Some(key);
        self.lifecycle = Lifecycle::AwaitingReady(element);
        debug!(%key, url = %self.spec.url, "frame awaiting ready");
        Ok(key)
    }

    pub fn state(&self) -> FrameState {
        match self.lifecycle {
            Lifecycle::Uninitialized => FrameState::Uninitialized,
            Lifecycle::AwaitingReady(_) => FrameState::AwaitingReady,
            Lifecycle::Ready(_) => FrameState::Ready,
            Lifecycle::Destroyed => FrameState::Destroyed,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Ready(_))
    }

    /// Host key of the mounted element; `None` before mounting.
    pub fn key(&self) -> Option<FrameKey> {
        self.key
    }

    /// Block identifier this frame renders, if any.
    pub fn identifier(&self) -> Option<&str> {
        self.spec.data_id.as_deref()
    }

    /// Mode the frame was mounted for; `None` for panel frames.
    pub fn mode(&self) -> Option<ViewMode> {
        match &self.target {
            MountTarget::Inline { mode, .. } => Some(*mode),
            MountTarget::Panel(_) => None,
        }
    }

    pub fn target(&self) -> &MountTarget {
        &self.target
    }

    pub fn spec(&self) -> &FrameSpec {
        &self.spec
    }

    /// Current location; follows peer navigation.
    pub fn location(&self) -> &Url {
        &self.location
    }

    /// Handle the readiness signal. `AwaitingReady → Ready`, then send init.
    ///
    /// Returns true only on the transition; repeated signals are no-ops.
    fn mark_ready(&mut self) -> bool {
        let lifecycle = std::mem::replace(&mut self.lifecycle, Lifecycle::Destroyed);
        match lifecycle {
            Lifecycle::AwaitingReady(element) => {
                self.lifecycle = Lifecycle::Ready(element);
                debug!(key = ?self.key, "frame ready");
                let init = HostMessage::Init {
                    host_version: self.options.host_version.clone(),
                };
                self.send(&init);
                true
            }
            other => {
                self.lifecycle = other;
                false
            }
        }
    }

    /// Post a message to the peer. Delivered only while `Ready`.
    pub fn send(&mut self, message: &HostMessage) -> SendOutcome {
        let element = match &mut self.lifecycle {
            Lifecycle::Ready(element) => element,
            Lifecycle::Uninitialized | Lifecycle::AwaitingReady(_) => {
                debug!(key = ?self.key, kind = message.kind(), "peer not ready, dropping message");
                return SendOutcome::NotReady;
            }
            Lifecycle::Destroyed => {
                debug!(key = ?self.key, kind = message.kind(), "frame destroyed, dropping message");
                return SendOutcome::Destroyed;
            }
        };

        match element.post_message(&message.to_value(), &self.options.target_origin) {
            Ok(()) => SendOutcome::Delivered,
            Err(err) => {
                warn!(key = ?self.key, kind = message.kind(), error = %err, "failed to post message");
                SendOutcome::Failed
            }
        }
    }

    /// Dispatch an inbound peer message addressed to this frame.
    pub fn handle(&mut self, event: &PeerEvent) -> Dispatch {
        if !self.options.origin_policy.permits(event.origin.as_deref()) {
            warn!(key = ?self.key, origin = ?event.origin, "rejected message from untrusted origin");
            return Dispatch::Rejected {
                origin: event.origin.clone(),
            };
        }

        match PeerMessage::from_value(&event.data) {
            PeerMessage::Ready => {
                if self.mark_ready() {
                    Dispatch::Ready
                } else if self.is_ready() {
                    Dispatch::AlreadyReady
                } else {
                    Dispatch::Ignored
                }
            }
            PeerMessage::Navigate { url } => self.navigate(&url),
            PeerMessage::Unknown => Dispatch::Ignored,
        }
    }

    fn navigate(&mut self, raw: &str) -> Dispatch {
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(err) => {
                warn!(key = ?self.key, url = raw, error = %err, "ignoring navigation to invalid url");
                return Dispatch::Ignored;
            }
        };

        let element = match &mut self.lifecycle {
            Lifecycle::AwaitingReady(element) | Lifecycle::Ready(element) => element,
            Lifecycle::Uninitialized | Lifecycle::Destroyed => return Dispatch::Ignored,
        };

        match element.set_location(&url) {
            Ok(()) => {
                debug!(key = ?self.key, %url, "frame navigated");
                self.location = url;
                Dispatch::Navigated {
                    url: self.location.to_string(),
                }
            }
            Err(err) => {
                warn!(key = ?self.key, error = %err, "failed to navigate frame");
                Dispatch::Ignored
            }
        }
    }

    /// Detach the element and enter the terminal `Destroyed` state.
    pub fn destroy(&mut self) {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Destroyed) {
            Lifecycle::AwaitingReady(mut element) | Lifecycle::Ready(mut element) => {
                element.detach();
                debug!(key = ?self.key, "frame destroyed");
            }
            Lifecycle::Uninitialized | Lifecycle::Destroyed => {}
        }
    }
}

impl Drop for FrameInstance {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for FrameInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameInstance")
            .field("key", &self.key)
            .field("state", &self.state())
            .field("target", &self.target)
            .field("location", &self.location.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use boardframe_host::{DocumentId, MemoryHost};
    use serde_json::json;

    use super::*;

    fn instance() -> FrameInstance {
        let target = MountTarget::Inline {
            document: DocumentId::new("notes.md"),
            mode: ViewMode::Edit,
            position: 3,
        };
        let spec = FrameSpec {
            url: Url::parse("https://moredraw.com/app/get-started/obsidian?id=abc").unwrap(),
            title: "Plan".to_string(),
            height: 300,
            class_marker: "moredraw-iframe".to_string(),
            allow: "clipboard-read; clipboard-write".to_string(),
            data_id: Some("abc".to_string()),
        };
        let options = InstanceOptions {
            host_version: "1.7.7".to_string(),
            ..InstanceOptions::default()
        };
        FrameInstance::new(target, spec, options)
    }

    fn mounted(host: &mut MemoryHost) -> (FrameInstance, FrameKey) {
        let mut frame = instance();
        let key = frame.mount(host).unwrap();
        (frame, key)
    }

    #[test]
    fn starts_uninitialized_then_awaits_ready() {
        let mut host = MemoryHost::new();
        let mut frame = instance();
        assert_eq!(frame.state(), FrameState::Uninitialized);
        assert_eq!(frame.send(&HostMessage::Reload), SendOutcome::NotReady);

        let key = frame.mount(&mut host).unwrap();

        assert_eq!(frame.state(), FrameState::AwaitingReady);
        assert_eq!(frame.mount(&mut host).unwrap(), key);
        assert_eq!(host.frames().len(), 1);
        assert_eq!(frame.identifier(), Some("abc"));
        assert_eq!(frame.mode(), Some(ViewMode::Edit));
    }

    #[test]
    fn ready_sends_init_exactly_once() {
        let mut host = MemoryHost::new();
        let (mut frame, key) = mounted(&mut host);

        assert_eq!(frame.handle(&PeerEvent::new(key, json!("ready"))), Dispatch::Ready);
        assert_eq!(
            frame.handle(&PeerEvent::new(key, json!("ready"))),
            Dispatch::AlreadyReady
        );

        assert_eq!(frame.state(), FrameState::Ready);
        assert_eq!(
            host.posted_to(key),
            vec![json!({"type": "init", "data": {"host": {"version": "1.7.7"}}})]
        );
    }

    #[test]
    fn only_literal_ready_signal_transitions() {
        let mut host = MemoryHost::new();
        let (mut frame, key) = mounted(&mut host);

        for data in [json!({"type": "ready"}), json!("READY"), json!(["ready"])] {
            assert_eq!(frame.handle(&PeerEvent::new(key, data)), Dispatch::Ignored);
        }

        assert_eq!(frame.state(), FrameState::AwaitingReady);
        assert!(host.posted_to(key).is_empty());
    }

    #[test]
    fn send_after_ready_is_delivered() {
        let mut host = MemoryHost::new();
        let (mut frame, key) = mounted(&mut host);
        frame.handle(&PeerEvent::new(key, json!("ready")));

        let outcome = frame.send(&HostMessage::Custom(json!({"type": "ping"})));

        assert_eq!(outcome, SendOutcome::Delivered);
        assert_eq!(host.posted_to(key).last(), Some(&json!({"type": "ping"})));
        assert_eq!(host.posted()[0].target_origin, "*");
    }

    #[test]
    fn send_before_ready_is_dropped() {
        let mut host = MemoryHost::new();
        let (mut frame, key) = mounted(&mut host);

        assert_eq!(frame.send(&HostMessage::Reload), SendOutcome::NotReady);
        assert!(host.posted_to(key).is_empty());
    }

    #[test]
    fn navigate_updates_location_without_remount() {
        let mut host = MemoryHost::new();
        let (mut frame, key) = mounted(&mut host);

        let dispatch = frame.handle(&PeerEvent::new(
            key,
            json!({"action": "navigate", "url": "https://moredraw.com/app/board/42"}),
        ));

        assert_eq!(
            dispatch,
            Dispatch::Navigated {
                url: "https://moredraw.com/app/board/42".to_string()
            }
        );
        assert_eq!(frame.location().as_str(), "https://moredraw.com/app/board/42");
        assert_eq!(
            host.frame(key).unwrap().location.as_str(),
            "https://moredraw.com/app/board/42"
        );
        assert_eq!(host.frames().len(), 1);
        assert_eq!(frame.state(), FrameState::AwaitingReady);
    }

    #[test]
    fn invalid_navigation_and_unknown_messages_are_ignored() {
        let mut host = MemoryHost::new();
        let (mut frame, key) = mounted(&mut host);

        for data in [
            json!({"action": "navigate", "url": "not a url"}),
            json!({"type": "telemetry", "payload": 1}),
            json!(42),
        ] {
            assert_eq!(frame.handle(&PeerEvent::new(key, data)), Dispatch::Ignored);
        }
        assert_eq!(frame.state(), FrameState::AwaitingReady);
        assert!(host.posted().is_empty());
    }

    #[test]
    fn destroy_is_terminal() {
        let mut host = MemoryHost::new();
        let (mut frame, key) = mounted(&mut host);
        frame.handle(&PeerEvent::new(key, json!("ready")));

        frame.destroy();

        assert_eq!(frame.state(), FrameState::Destroyed);
        assert!(!host.frame(key).unwrap().attached);
        assert_eq!(frame.send(&HostMessage::Reload), SendOutcome::Destroyed);
        assert_eq!(frame.handle(&PeerEvent::new(key, json!("ready"))), Dispatch::Ignored);
        assert!(matches!(frame.mount(&mut host), Err(EmbedError::Destroyed)));
        assert_eq!(host.posted_to(key).len(), 1);
    }

    #[test]
    fn drop_detaches_element() {
        let mut host = MemoryHost::new();
        let (frame, key) = mounted(&mut host);
        drop(frame);
        assert!(!host.frame(key).unwrap().attached);
    }

    #[test]
    fn allow_list_rejects_foreign_origin() {
        let mut host = MemoryHost::new();
        let mut frame = instance();
        frame.options.origin_policy =
            OriginPolicy::AllowList(vec!["https://moredraw.com".to_string()]);
        let key = frame.mount(&mut host).unwrap();

        let event = PeerEvent::new(key, json!("ready")).with_origin("https://evil.example");
        let rejected = frame.handle(&event);
        assert_eq!(
            rejected,
            Dispatch::Rejected {
                origin: Some("https://evil.example".to_string())
            }
        );
        assert_eq!(frame.state(), FrameState::AwaitingReady);

        let accepted =
            frame.handle(&PeerEvent::new(key, json!("ready")).with_origin("https://moredraw.com"));
        assert_eq!(accepted, Dispatch::Ready);
    }
}
