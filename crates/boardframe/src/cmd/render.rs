use boardframe_host::{DocumentId, ViewMode};
use boardframe_peer::{Embedder, RenderSite};
use serde::Serialize;
use tracing::warn;

use crate::cmd::{read_input, RenderArgs};
use crate::exit::{embed_error, CliResult, SUCCESS};
use crate::output::{print_fields, print_json, print_pretty, OutputFormat};

#[derive(Serialize)]
struct RenderOutput {
    url: String,
    id: Option<String>,
    title: String,
    height: u32,
    markup: String,
    data_error: Option<String>,
}

pub fn run(args: RenderArgs, format: OutputFormat) -> CliResult<i32> {
    let source = read_input(args.file.as_ref())?;
    let mut embedder = Embedder::new(args.host.embed_config())
        .map_err(|err| embed_error("configure embedder", err))?;
    let mut host = args.host.memory_host();

    let document = DocumentId::new("block.md");
    let mode = args.mode.map(ViewMode::from);
    if let Some(mode) = mode {
        host.open_document(document.clone(), &source, mode);
    }
    let site = RenderSite {
        document,
        mode: mode.unwrap_or(ViewMode::Preview),
        position: 0,
    };

    let rendered = embedder
        .render_block(&mut host, &source, &site)
        .map_err(|err| embed_error("render block", err))?;
    if let Some(err) = &rendered.data_error {
        warn!(error = %err, "rendered with raw data");
    }

    let frame = host.frame(rendered.frame);
    let output = RenderOutput {
        url: rendered.url.to_string(),
        id: frame.as_ref().and_then(|frame| frame.spec.data_id.clone()),
        title: frame
            .as_ref()
            .map(|frame| frame.spec.title.clone())
            .unwrap_or_default(),
        height: frame.as_ref().map(|frame| frame.spec.height).unwrap_or(0),
        markup: rendered.markup,
        data_error: rendered.data_error,
    };

    match format {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Table => print_fields(&fields(&output)),
        OutputFormat::Pretty => print_pretty(&fields(&output)),
    }
    Ok(SUCCESS)
}

fn fields(output: &RenderOutput) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("url", output.url.clone()),
        ("id", output.id.clone().unwrap_or_default()),
        ("title", output.title.clone()),
        ("height", output.height.to_string()),
        ("markup", output.markup.clone()),
    ];
    if let Some(err) = &output.data_error {
        fields.push(("data_error", err.clone()));
    }
    fields
}
