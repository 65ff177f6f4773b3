//! Tracing subscriber for the bot: stdout, plus a daily `tangybot.*.log`
//! file under `LOG_DIR` when set. `LOG_FORMAT=json` switches to JSON lines.

use std::env;
use std::path::Path;
use std::sync::OnceLock;

use tracing::info;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{fmt, time::ChronoLocal, writer::MakeWriterExt};

/// Keeps the file writer flushing until the process exits.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let file = env::var("LOG_DIR")
        .ok()
        .and_then(|dir| daily_file(Path::new(&dir)));
    let to_file = file.is_some();

    let builder = fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(false);

    match (json, file) {
        (true, Some(file)) => builder.json().with_writer(std::io::stdout.and(file)).init(),
        (true, None) => builder.json().init(),
        (false, Some(file)) => builder
            .with_ansi(false)
            .with_writer(std::io::stdout.and(file))
            .init(),
        (false, None) => builder.init(),
    }

    info!(json, to_file, "📝 Logging initialized");
}

/// Non-blocking writer to a daily rotated file in `dir`, or `None` when the
/// directory cannot be used.
fn daily_file(dir: &Path) -> Option<NonBlocking> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("tangybot")
        .filename_suffix("log")
        .build(dir);

    let appender = match appender {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("cannot log to {}: {e}", dir.display());
            return None;
        }
    };

    let (writer, guard) = tracing_appender::non_blocking(appender);
    LOG_GUARD.set(guard).ok()?;
    Some(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unusable_log_dir_falls_back_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("taken");
        std::fs::write(&not_a_dir, b"").unwrap();

        assert!(daily_file(&not_a_dir).is_none());
    }
}
