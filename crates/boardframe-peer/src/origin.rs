use boardframe_block::EndpointConfig;
use serde::{Deserialize, Serialize};
use url::Url;

/// Which sender origins inbound peer messages are accepted from.
///
/// The default accepts every origin, matching the historical behavior of the
/// integration. Tightening it is a deployment decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "origins", rename_all = "snake_case")]
pub enum OriginPolicy {
    #[default]
    Any,
    AllowList(Vec<String>),
}

impl OriginPolicy {
    /// Allow only the origin of the configured whiteboard endpoint.
    pub fn endpoint_only(endpoint: &EndpointConfig) -> Self {
        match Url::parse(&endpoint.base_url) {
            Ok(url) => OriginPolicy::AllowList(vec![url.origin().ascii_serialization()]),
            Err(_) => OriginPolicy::AllowList(Vec::new()),
        }
    }

    /// Messages without a reported origin only pass under [`OriginPolicy::Any`].
    pub fn permits(&self, origin: Option<&str>) -> bool {
        match self {
            OriginPolicy::Any => true,
            OriginPolicy::AllowList(allowed) => {
                origin.is_some_and(|origin| allowed.iter().any(|candidate| candidate == origin))
            }
        }
    }
}
