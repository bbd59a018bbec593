use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

pub type LogWriter = Mutex<Box<dyn Write + Send>>;

/// Open the session log, truncating the previous one. Without a usable
/// path, log lines are dropped.
pub fn open_log(path: Option<&Path>) -> LogWriter {
    let sink: Box<dyn Write + Send> = match path.map(File::create) {
        Some(Ok(file)) => Box::new(file),
        _ => Box::new(io::sink()),
    };
    Mutex::new(sink)
}

pub fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

pub fn subscriber(filter: EnvFilter, writer: LogWriter) -> impl Subscriber + Send + Sync {
    tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("wsc-{}-{}.log", name, std::process::id()))
    }

    #[test]
    fn errors_land_in_the_log_file() {
        let path = scratch("errors");
        let subscriber = subscriber(EnvFilter::new("warn"), open_log(Some(&path)));
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(
                endpoint = "/api/user/list",
                content_type = "text/html",
                body = "<html><body>Login required</body></html>",
                "expected a JSON result"
            );
            tracing::debug!("below the filter");
        });

        let logged = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(logged.contains("expected a JSON result"));
        assert!(logged.contains("Login required"));
        assert!(!logged.contains("below the filter"));
    }

    #[test]
    fn unusable_path_discards() {
        let missing = Path::new("/nonexistent-dir/for/wsc/test.log");
        let writer = open_log(Some(missing));
        let mut sink = writer.lock().unwrap();
        assert!(sink.write_all(b"dropped").is_ok());
    }
}
