//! Whiteboard block codec and frame URL construction.
//!
//! A whiteboard lives in a document as a fenced block of `key:value` lines:
//!
//! ````text
//! ```moredraw
//! id:q3k9x0c1m2n8b7v6z5a4s
//! title:Untitled
//! height:400
//! ```
//! ````
//!
//! This crate turns that text into a [`ParameterMap`], builds the frame URL
//! for it with [`FrameUrlBuilder`], and renders the frame container markup.
//! No partial state: every render is a fresh parse.

pub mod codec;
pub mod endpoint;
pub mod error;
pub mod ident;
pub mod markup;
pub mod params;
pub mod state;

pub use codec::{parse_block, serialize_block, ParsedBlock};
pub use endpoint::{
    extract_host_version, locale_to_lang, EndpointConfig, FrameContext, FrameUrlBuilder,
    UNKNOWN_VERSION,
};
pub use error::{BlockError, Result};
pub use ident::{generate_identifier, is_identifier, ALPHABET, DEFAULT_ID_LENGTH};
pub use markup::{frame_spec_for, render_frame_markup, FrameAppearance};
pub use params::{is_valid_key, ParamValue, ParameterMap, DATA_KEY};
pub use state::{BlockState, DEFAULT_HEIGHT, DEFAULT_TITLE, FALLBACK_TITLE};
