use boardframe_block::{generate_identifier, BlockState};
use serde::Serialize;

use crate::cmd::NewBlockArgs;
use crate::exit::{CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_fields, print_json, OutputFormat};

#[derive(Serialize)]
struct NewBlockOutput {
    id: String,
    title: String,
    height: u32,
    text: String,
}

pub fn run(args: NewBlockArgs, format: OutputFormat) -> CliResult<i32> {
    if args.id_length == 0 {
        return Err(CliError::new(USAGE, "--id-length must be at least 1"));
    }
    if args.language.trim().is_empty() {
        return Err(CliError::new(USAGE, "--language must not be empty"));
    }

    let block = BlockState::new(generate_identifier(args.id_length));
    let text = block.to_fenced(&args.language);

    match format {
        OutputFormat::Json => print_json(&NewBlockOutput {
            id: block.id.clone(),
            title: block.title.clone(),
            height: block.height,
            text,
        }),
        OutputFormat::Table => print_fields(&[
            ("id", block.id.clone()),
            ("title", block.title.clone()),
            ("height", block.height.to_string()),
        ]),
        OutputFormat::Pretty => print!("{text}"),
    }
    Ok(SUCCESS)
}
