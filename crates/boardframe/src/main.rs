mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "boardframe", version, about = "Embedded whiteboard frame tooling")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::ModeArg;

    #[test]
    fn parses_render_subcommand() {
        let cli = Cli::try_parse_from([
            "boardframe",
            "render",
            "block.txt",
            "--mode",
            "edit",
            "--locale",
            "zh-cn",
        ])
        .expect("render args should parse");

        let Command::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.mode, Some(ModeArg::Edit));
        assert_eq!(args.host.locale, "zh-cn");
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = Cli::try_parse_from(["boardframe", "render", "--mode", "split"])
            .expect_err("unknown mode should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn parses_ident_defaults() {
        let cli = Cli::try_parse_from(["boardframe", "ident"]).expect("ident args should parse");
        let Command::Ident(args) = cli.command else {
            panic!("expected ident");
        };
        assert_eq!(args.count, 1);
        assert_eq!(args.length, 21);
    }

    #[test]
    fn parses_replay_with_global_format() {
        let cli = Cli::try_parse_from([
            "boardframe",
            "replay",
            "session.jsonl",
            "--format",
            "json",
            "--close-on-second-toggle",
        ])
        .expect("replay args should parse");

        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(matches!(cli.command, Command::Replay(ref args) if args.close_on_second_toggle));
    }
}
