use std::path::Path;

use tracing::debug;
use tracing_appender::rolling::{Builder, InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::cli::Cli;

/// How many days of log files are kept.
const KEEP_LOG_FILES: usize = 45;

/// `RUST_LOG` takes priority over the level picked on the command line.
pub fn env_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if debug { "debug" } else { "info" };
        EnvFilter::try_new(format!("trendmaster={level},tracing_unwrap"))
            .expect("hard-coded env filter should be valid")
    })
}

/// Writes to `<path>.<date>`, starting a new file every day.
pub fn rolling_file(path: &Path) -> Result<RollingFileAppender, InitError> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let prefix = path.file_name().map_or_else(
        || "trendmaster.log".to_owned(),
        |name| name.to_string_lossy().into_owned(),
    );

    Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .max_log_files(KEEP_LOG_FILES)
        .build(dir)
}

pub fn init_tracing(cli: &Cli) -> Result<(), InitError> {
    let stdout = (!cli.quiet).then(fmt::layer);

    let file = match &cli.log_file {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(rolling_file(path)?),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(stdout)
        .with(file)
        .with(env_filter(cli.debug))
        .init();

    debug!(log_file = ?cli.log_file, "finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::rolling_file;

    #[test]
    fn log_file_is_dated() {
        let dir = tempfile::tempdir().expect("temp dir is creatable");
        let mut log = rolling_file(&dir.path().join("bot.log")).expect("appender builds");
        writeln!(log, "hello").expect("log is writable");
        log.flush().expect("log is writable");

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .expect("temp dir is readable")
            .map(|entry| {
                entry
                    .expect("entry is readable")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();

        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("bot.log."), "{names:?}");
    }
}
