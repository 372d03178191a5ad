use std::fmt;
use std::io;

use boardframe_block::BlockError;
use boardframe_peer::EmbedError;

// sysexits-style exit codes.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => USAGE,
        io::ErrorKind::InvalidData => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn block_error(context: &str, err: BlockError) -> CliError {
    let code = match err {
        BlockError::InvalidData { .. } | BlockError::InvalidKey(_) => DATA_INVALID,
        BlockError::InvalidEndpoint { .. }
        | BlockError::InvalidProduct(_)
        | BlockError::InvalidIdLength => USAGE,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn embed_error(context: &str, err: EmbedError) -> CliError {
    match err {
        EmbedError::Block(err) => block_error(context, err),
        EmbedError::InvalidConfig(_) => CliError::new(USAGE, format!("{context}: {err}")),
        EmbedError::NoActiveDocument | EmbedError::MissingPanelSlot(_) => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn json_error(context: &str, err: serde_json::Error) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_usage_errors() {
        let err = embed_error("config", EmbedError::InvalidConfig("id_length".to_string()));
        assert_eq!(err.code, USAGE);
        assert!(err.message.starts_with("config: "));
    }

    #[test]
    fn block_errors_keep_their_class() {
        let err = embed_error("render", EmbedError::Block(BlockError::InvalidIdLength));
        assert_eq!(err.code, USAGE);
        let err = block_error("render", BlockError::InvalidKey("a b".to_string()));
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn missing_file_is_usage() {
        let err = io_error("read", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn destroyed_is_internal() {
        assert_eq!(embed_error("x", EmbedError::Destroyed).code, INTERNAL);
    }
}
