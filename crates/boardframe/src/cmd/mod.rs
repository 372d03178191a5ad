use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use boardframe_block::{EndpointConfig, DEFAULT_ID_LENGTH};
use boardframe_host::{MemoryHost, ViewMode};
use boardframe_peer::EmbedConfig;

use crate::exit::{io_error, CliResult};
use crate::output::OutputFormat;

pub mod ident;
pub mod new_block;
pub mod render;
pub mod replay;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a block and print its frame URL and markup.
    Render(RenderArgs),
    /// Print a fresh whiteboard block.
    NewBlock(NewBlockArgs),
    /// Generate block identifiers.
    Ident(IdentArgs),
    /// Drive an embedder over an in-memory host from a JSON-lines script.
    Replay(ReplayArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Render(args) => render::run(args, format),
        Command::NewBlock(args) => new_block::run(args, format),
        Command::Ident(args) => ident::run(args, format),
        Command::Replay(args) => replay::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Render mode as spelled on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Preview,
    Edit,
}

impl From<ModeArg> for ViewMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Preview => ViewMode::Preview,
            ModeArg::Edit => ViewMode::Edit,
        }
    }
}

/// Host and endpoint overrides shared by commands that build frames.
#[derive(Args, Debug, Clone)]
pub struct HostArgs {
    /// Origin of the whiteboard application.
    #[arg(long, env = "BOARDFRAME_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,
    /// Host locale, e.g. `zh-cn`.
    #[arg(long, default_value = "en")]
    pub locale: String,
    /// User-agent string the host version is read from.
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,
}

impl HostArgs {
    pub fn embed_config(&self) -> EmbedConfig {
        let defaults = EndpointConfig::default();
        EmbedConfig {
            endpoint: EndpointConfig {
                base_url: self.base_url.clone().unwrap_or_else(|| defaults.base_url.clone()),
                ..defaults
            },
            ..EmbedConfig::default()
        }
    }

    pub fn memory_host(&self) -> MemoryHost {
        let host = MemoryHost::new().with_locale(self.locale.clone());
        match &self.user_agent {
            Some(user_agent) => host.with_user_agent(user_agent.clone()),
            None => host,
        }
    }
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Block file to read. Reads stdin when omitted or `-`.
    pub file: Option<PathBuf>,
    /// Mode of the active view; omitted from the URL when not set.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
    #[command(flatten)]
    pub host: HostArgs,
}

#[derive(Args, Debug)]
pub struct NewBlockArgs {
    /// Fence language tag.
    #[arg(long, default_value = "moredraw")]
    pub language: String,
    /// Identifier length.
    #[arg(long, default_value_t = DEFAULT_ID_LENGTH)]
    pub id_length: usize,
}

#[derive(Args, Debug)]
pub struct IdentArgs {
    /// Number of identifiers.
    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: usize,
    /// Identifier length.
    #[arg(long, default_value_t = DEFAULT_ID_LENGTH)]
    pub length: usize,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Script file. Reads stdin when `-`.
    pub script: PathBuf,
    /// Close the panel on a second toggle instead of revealing it.
    #[arg(long)]
    pub close_on_second_toggle: bool,
    /// Accept peer messages only from the whiteboard origin.
    #[arg(long)]
    pub strict_origin: bool,
    #[command(flatten)]
    pub host: HostArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Read a file, or stdin for `None` and `-`.
pub fn read_input(path: Option<&PathBuf>) -> CliResult<String> {
    use std::io::Read;

    match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .map_err(|err| io_error(&format!("read {}", path.display()), err)),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|err| io_error("read stdin", err))?;
            Ok(text)
        }
    }
}
