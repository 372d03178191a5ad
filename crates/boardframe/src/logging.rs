use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Crates whose events follow `--log-level`. Anything else is capped at warn.
const BOARDFRAME_TARGETS: [&str; 4] = [
    "boardframe",
    "boardframe_host",
    "boardframe_block",
    "boardframe_peer",
];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }

    /// Frame lifecycle events come from several crates; name them once the
    /// output gets that detailed.
    fn shows_target(self) -> bool {
        matches!(self, LogLevel::Debug | LogLevel::Trace)
    }
}

fn log_targets(level: LogLevel) -> Targets {
    let quiet = level.as_filter().min(LevelFilter::WARN);
    BOARDFRAME_TARGETS
        .iter()
        .fold(Targets::new().with_default(quiet), |targets, name| {
            targets.with_target(*name, level.as_filter())
        })
}

/// Install the stderr subscriber. Block decode warnings and frame lifecycle
/// events from the libraries land here.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.as_filter())
        .with_ansi(false)
        .with_target(level.shows_target());

    match format {
        LogFormat::Text => {
            let _ = builder.finish().with(log_targets(level)).try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().finish().with(log_targets(level)).try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn own_crates_follow_requested_level() {
        let targets = log_targets(LogLevel::Debug);

        assert!(targets.would_enable("boardframe_peer::instance", &Level::DEBUG));
        assert!(targets.would_enable("boardframe_block::codec", &Level::DEBUG));
        assert!(!targets.would_enable("boardframe_peer::live", &Level::TRACE));
    }

    #[test]
    fn other_crates_are_capped_at_warn() {
        let targets = log_targets(LogLevel::Trace);

        assert!(targets.would_enable("clap_builder", &Level::WARN));
        assert!(!targets.would_enable("clap_builder", &Level::INFO));
    }

    #[test]
    fn error_level_stays_quiet_everywhere() {
        let targets = log_targets(LogLevel::Error);

        assert!(!targets.would_enable("boardframe_peer::panel", &Level::WARN));
        assert!(!targets.would_enable("url", &Level::WARN));
        assert!(targets.would_enable("url", &Level::ERROR));
    }
}
