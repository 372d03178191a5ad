//! Scripted embedder sessions over an in-memory host.
//!
//! Each non-empty script line is one JSON event:
//!
//! ```text
//! {"event":"open_document","document":"a.md","text":"","mode":"edit"}
//! {"event":"render","document":"a.md","mode":"edit","position":0,"source":"id:abc"}
//! {"event":"peer","frame":1,"data":"ready"}
//! {"event":"remove_block","frame":1}
//! {"event":"layout_change"}
//! {"event":"command","command":"toggle-view"}
//! {"event":"set_mode","mode":"preview"}
//! {"event":"close_document","document":"a.md"}
//! {"event":"unload"}
//! ```
//!
//! Lines starting with `#` are comments.

use boardframe_host::{DocumentId, FrameKey, MemoryHost, PostedMessage, ViewMode};
use boardframe_peer::{
    EmbedConfig, EmbedError, Embedder, HostCommand, OriginPolicy, PeerEvent, RenderSite,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cmd::{read_input, ReplayArgs};
use crate::exit::{embed_error, json_error, CliResult, SUCCESS};
use crate::output::{print_json, print_rows, OutputFormat};

#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ReplayEvent {
    OpenDocument {
        document: DocumentId,
        #[serde(default)]
        text: String,
        #[serde(default = "default_mode")]
        mode: ViewMode,
    },
    Render {
        document: DocumentId,
        #[serde(default = "default_mode")]
        mode: ViewMode,
        #[serde(default)]
        position: usize,
        source: String,
    },
    Peer {
        frame: FrameKey,
        data: Value,
        #[serde(default)]
        origin: Option<String>,
    },
    RemoveBlock {
        frame: FrameKey,
    },
    LayoutChange,
    Command {
        command: HostCommand,
    },
    SetMode {
        mode: ViewMode,
    },
    CloseDocument {
        document: DocumentId,
    },
    Unload,
}

impl ReplayEvent {
    fn name(&self) -> &'static str {
        match self {
            ReplayEvent::OpenDocument { .. } => "open_document",
            ReplayEvent::Render { .. } => "render",
            ReplayEvent::Peer { .. } => "peer",
            ReplayEvent::RemoveBlock { .. } => "remove_block",
            ReplayEvent::LayoutChange => "layout_change",
            ReplayEvent::Command { .. } => "command",
            ReplayEvent::SetMode { .. } => "set_mode",
            ReplayEvent::CloseDocument { .. } => "close_document",
            ReplayEvent::Unload => "unload",
        }
    }
}

fn default_mode() -> ViewMode {
    ViewMode::Preview
}

#[derive(Debug, Serialize)]
struct StepOutput {
    line: usize,
    event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReplayOutput {
    steps: Vec<StepOutput>,
    posted: Vec<PostedMessage>,
}

pub fn run(args: ReplayArgs, format: OutputFormat) -> CliResult<i32> {
    let script = read_input(Some(&args.script))?;
    let events = parse_script(&script)?;

    let config = EmbedConfig {
        close_on_second_toggle: args.close_on_second_toggle,
        ..args.host.embed_config()
    };
    let config = if args.strict_origin {
        EmbedConfig {
            origin_policy: OriginPolicy::endpoint_only(&config.endpoint),
            ..config
        }
    } else {
        config
    };
    let mut embedder =
        Embedder::new(config).map_err(|err| embed_error("configure embedder", err))?;
    let mut host = args.host.memory_host();

    let steps = events
        .into_iter()
        .map(|(line, event)| {
            let name = event.name();
            match apply(&mut embedder, &mut host, event) {
                Ok(result) => StepOutput {
                    line,
                    event: name,
                    result: Some(result),
                    error: None,
                },
                Err(err) => {
                    warn!(line, event = name, error = %err, "replay step failed");
                    StepOutput {
                        line,
                        event: name,
                        result: None,
                        error: Some(err.to_string()),
                    }
                }
            }
        })
        .collect();

    let output = ReplayOutput {
        steps,
        posted: host.posted(),
    };
    print_output(&output, format);
    Ok(SUCCESS)
}

fn parse_script(script: &str) -> CliResult<Vec<(usize, ReplayEvent)>> {
    let mut events = Vec::new();
    for (index, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(line)
            .map_err(|err| json_error(&format!("script line {}", index + 1), err))?;
        events.push((index + 1, event));
    }
    Ok(events)
}

fn apply(
    embedder: &mut Embedder,
    host: &mut MemoryHost,
    event: ReplayEvent,
) -> Result<Value, EmbedError> {
    debug!(event = event.name(), "replaying");
    let value = match event {
        ReplayEvent::OpenDocument {
            document,
            text,
            mode,
        } => {
            host.open_document(document, &text, mode);
            Value::Null
        }
        ReplayEvent::Render {
            document,
            mode,
            position,
            source,
        } => {
            let site = RenderSite {
                document,
                mode,
                position,
            };
            to_value(&embedder.render_block(host, &source, &site)?)
        }
        ReplayEvent::Peer {
            frame,
            data,
            origin,
        } => {
            let mut peer_event = PeerEvent::new(frame, data);
            peer_event.origin = origin;
            to_value(&embedder.on_peer_message(&peer_event))
        }
        ReplayEvent::RemoveBlock { frame } => Value::from(embedder.on_block_removed(frame)),
        ReplayEvent::LayoutChange => to_value(&embedder.on_layout_change(&*host)),
        ReplayEvent::Command { command } => to_value(&embedder.run_command(host, command)?),
        ReplayEvent::SetMode { mode } => {
            host.set_mode(mode);
            Value::Null
        }
        ReplayEvent::CloseDocument { document } => {
            host.close_document(&document);
            Value::from(embedder.on_document_closed(&document))
        }
        ReplayEvent::Unload => to_value(&embedder.unload(host)),
    };
    Ok(value)
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn print_output(output: &ReplayOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(output),
        OutputFormat::Table => {
            print_rows(
                &["LINE", "EVENT", "RESULT"],
                output
                    .steps
                    .iter()
                    .map(|step| {
                        vec![
                            step.line.to_string(),
                            step.event.to_string(),
                            step_summary(step),
                        ]
                    })
                    .collect(),
            );
            print_rows(
                &["FRAME", "TARGET", "MESSAGE"],
                output
                    .posted
                    .iter()
                    .map(|posted| {
                        vec![
                            posted.frame.to_string(),
                            posted.target_origin.clone(),
                            posted.message.to_string(),
                        ]
                    })
                    .collect(),
            );
        }
        OutputFormat::Pretty => {
            for step in &output.steps {
                println!("line={} event={} {}", step.line, step.event, step_summary(step));
            }
            for posted in &output.posted {
                println!("posted frame={} message={}", posted.frame, posted.message);
            }
        }
    }
}

fn step_summary(step: &StepOutput) -> String {
    match (&step.result, &step.error) {
        (_, Some(error)) => format!("error: {error}"),
        (Some(Value::Null), None) | (None, None) => "ok".to_string(),
        (Some(result), None) => result.to_string(),
    }
}
