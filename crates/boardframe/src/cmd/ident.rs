use boardframe_block::generate_identifier;

use crate::cmd::IdentArgs;
use crate::exit::{CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_json, print_rows, OutputFormat};

pub fn run(args: IdentArgs, format: OutputFormat) -> CliResult<i32> {
    if args.length == 0 {
        return Err(CliError::new(USAGE, "--length must be at least 1"));
    }

    let ids: Vec<String> = (0..args.count)
        .map(|_| generate_identifier(args.length))
        .collect();

    match format {
        OutputFormat::Json => print_json(&ids),
        OutputFormat::Table => print_rows(
            &["#", "ID"],
            ids.iter()
                .enumerate()
                .map(|(index, id)| vec![(index + 1).to_string(), id.clone()])
                .collect(),
        ),
        OutputFormat::Pretty => {
            for id in &ids {
                println!("{id}");
            }
        }
    }
    Ok(SUCCESS)
}
