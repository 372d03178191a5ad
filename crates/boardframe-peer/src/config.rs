use boardframe_block::{EndpointConfig, FrameAppearance, DEFAULT_ID_LENGTH};
use url::Url;

use crate::error::{EmbedError, Result};
use crate::origin::OriginPolicy;

/// Embedding configuration for one host integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedConfig {
    /// Where frames point and how the host version is detected.
    pub endpoint: EndpointConfig,
    /// Class marker and permission grant of every frame element.
    pub appearance: FrameAppearance,
    /// Fence language tag of whiteboard blocks.
    pub block_language: String,
    /// View type key of the side panel.
    pub view_type: String,
    /// Display text of the side panel.
    pub display_text: String,
    /// Icon id of the side panel and ribbon entry.
    pub icon: String,
    /// Length of generated block identifiers.
    pub id_length: usize,
    /// When true, toggling an open panel closes it instead of revealing it.
    pub close_on_second_toggle: bool,
    /// Accepted origins for inbound peer messages.
    pub origin_policy: OriginPolicy,
    /// `targetOrigin` for outbound messages.
    pub target_origin: String,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            appearance: FrameAppearance::default(),
            block_language: "moredraw".to_string(),
            view_type: "moredraw-iframe-view".to_string(),
            display_text: "MoreDraw".to_string(),
            icon: "moredraw-icon".to_string(),
            id_length: DEFAULT_ID_LENGTH,
            close_on_second_toggle: false,
            origin_policy: OriginPolicy::Any,
            target_origin: "*".to_string(),
        }
    }
}

impl EmbedConfig {
    /// Check the configuration before any frame is built.
    pub fn validate(&self) -> Result<()> {
        if let Err(err) = Url::parse(&self.endpoint.base_url) {
            return Err(EmbedError::InvalidConfig(format!(
                "base_url {:?}: {err}",
                self.endpoint.base_url
            )));
        }
        if self.id_length == 0 {
            return Err(EmbedError::InvalidConfig(
                "id_length must be at least 1".to_string(),
            ));
        }
        if self.block_language.trim().is_empty() {
            return Err(EmbedError::InvalidConfig(
                "block_language must not be empty".to_string(),
            ));
        }
        if self.view_type.trim().is_empty() {
            return Err(EmbedError::InvalidConfig(
                "view_type must not be empty".to_string(),
            ));
        }
        if self.target_origin.is_empty() {
            return Err(EmbedError::InvalidConfig(
                "target_origin must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
