//! Frame URL construction.

use boardframe_host::ViewMode;
use regex::Regex;
use url::Url;

use crate::error::{BlockError, Result};
use crate::ident::{generate_identifier, DEFAULT_ID_LENGTH};
use crate::params::ParameterMap;

/// Reported when the user agent carries no recognizable host version.
pub const UNKNOWN_VERSION: &str = "unknown";

const ID_PARAM: &str = "id";
const MODE_PARAM: &str = "mode";
const LANG_PARAM: &str = "lang";
const UTM_SOURCE_PARAM: &str = "utm_source";
const HOST_VERSION_PARAM: &str = "host_version";

/// Where frames point and how the host identifies itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Origin of the whiteboard application.
    pub base_url: String,
    /// Path of the embedding entry point on `base_url`.
    pub entry_path: String,
    /// Value of the `utm_source` marker.
    pub utm_source: String,
    /// Product token whose `<token>/<version>` is read from the user agent.
    pub host_product: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "https://moredraw.com".to_string(),
            entry_path: "/app/get-started/obsidian".to_string(),
            utm_source: "obsidian".to_string(),
            host_product: "Obsidian".to_string(),
        }
    }
}

/// Ambient host state merged into every frame URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameContext {
    /// Host locale tag, e.g. `zh-cn`.
    pub locale: String,
    /// User-agent-like string carrying the host version.
    pub user_agent: String,
    /// Mode of the active document view, if one is active.
    pub mode: Option<ViewMode>,
}

/// Builds frame URLs on a fixed endpoint.
///
/// `build` is pure for identical inputs except when the parameter map has no
/// `id`, in which case a fresh identifier is generated.
#[derive(Debug, Clone)]
pub struct FrameUrlBuilder {
    endpoint: Url,
    utm_source: String,
    version_pattern: Regex,
    id_length: usize,
}

impl FrameUrlBuilder {
    /// Parse the endpoint once up front so that building never fails.
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.base_url)
            .and_then(|base| base.join(&config.entry_path))
            .map_err(|source| BlockError::InvalidEndpoint {
                endpoint: format!("{}{}", config.base_url, config.entry_path),
                source,
            })?;

        Ok(Self {
            endpoint,
            utm_source: config.utm_source.clone(),
            version_pattern: version_pattern(&config.host_product)?,
            id_length: DEFAULT_ID_LENGTH,
        })
    }

    /// Override the length of generated identifiers.
    pub fn with_id_length(mut self, length: usize) -> Result<Self> {
        if length == 0 {
            return Err(BlockError::InvalidIdLength);
        }
        self.id_length = length;
        Ok(self)
    }

    /// Endpoint without query.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// URL of an inline block frame.
    ///
    /// Block parameters come first in block order, followed by `id` when it is
    /// missing or empty, then `mode`, `lang`, `utm_source` and `host_version`.
    /// Context fields replace same-named block parameters in place.
    pub fn build(&self, params: &ParameterMap, context: &FrameContext) -> Url {
        let mut pairs: Vec<(String, String)> = params
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_text().into_owned()))
            .collect();

        let has_id = params.get_text(ID_PARAM).is_some_and(|id| !id.is_empty());
        if !has_id {
            set_pair(&mut pairs, ID_PARAM, generate_identifier(self.id_length));
        }
        if let Some(mode) = context.mode {
            set_pair(&mut pairs, MODE_PARAM, mode.as_str().to_string());
        }
        self.push_context(&mut pairs, context);

        self.with_query(&pairs)
    }

    /// URL of the side-panel frame: context fields only.
    pub fn build_panel(&self, context: &FrameContext) -> Url {
        let mut pairs = Vec::new();
        self.push_context(&mut pairs, context);
        self.with_query(&pairs)
    }

    /// Host version read from `user_agent`, or [`UNKNOWN_VERSION`].
    pub fn host_version(&self, user_agent: &str) -> String {
        match_version(&self.version_pattern, user_agent)
    }

    fn push_context(&self, pairs: &mut Vec<(String, String)>, context: &FrameContext) {
        set_pair(pairs, LANG_PARAM, locale_to_lang(&context.locale));
        set_pair(pairs, UTM_SOURCE_PARAM, self.utm_source.clone());
        set_pair(pairs, HOST_VERSION_PARAM, self.host_version(&context.user_agent));
    }

    fn with_query(&self, pairs: &[(String, String)]) -> Url {
        let mut url = self.endpoint.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.query_pairs_mut()
            .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        url
    }
}

/// Convert a host locale into the `lang` parameter.
///
/// Splits on `-` and upper-cases the second subtag: `zh-cn` becomes `zh-CN`.
/// An empty locale falls back to `en`.
pub fn locale_to_lang(locale: &str) -> String {
    let locale = locale.trim();
    if locale.is_empty() {
        return "en".to_string();
    }
    let mut parts: Vec<String> = locale.split('-').map(str::to_string).collect();
    if let Some(region) = parts.get_mut(1) {
        *region = region.to_uppercase();
    }
    parts.join("-")
}

/// Read `<product>/<version>` from a user agent.
pub fn extract_host_version(product: &str, user_agent: &str) -> String {
    match version_pattern(product) {
        Ok(pattern) => match_version(&pattern, user_agent),
        Err(_) => UNKNOWN_VERSION.to_string(),
    }
}

fn version_pattern(product: &str) -> Result<Regex> {
    Regex::new(&format!(r"{}/([\d.]+)", regex::escape(product)))
        .map_err(|err| BlockError::InvalidProduct(err.to_string()))
}

fn match_version(pattern: &Regex, user_agent: &str) -> String {
    pattern
        .captures(user_agent)
        .and_then(|captures| captures.get(1))
        .map(|version| version.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
}

fn set_pair(pairs: &mut Vec<(String, String)>, key: &str, value: String) {
    match pairs.iter_mut().find(|(existing, _)| existing == key) {
        Some((_, slot)) => *slot = value,
        None => pairs.push((key.to_string(), value)),
    }
}
