use tracing::warn;
use tracing_subscriber::EnvFilter;

const FALLBACK_LEVEL: &str = "info";

/// Maps a `STORJ_EXPORTER_LOG_LEVEL` value onto a tracing level. Accepts the
/// tracing names and the classic `WARNING`, `CRITICAL`, `FATAL`, `NOTSET`.
pub fn level_directive(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_uppercase().as_str() {
        "TRACE" | "NOTSET" => Some("trace"),
        "DEBUG" => Some("debug"),
        "INFO" => Some("info"),
        "WARN" | "WARNING" => Some("warn"),
        "ERROR" | "CRITICAL" | "FATAL" => Some("error"),
        "OFF" => Some("off"),
        _ => None,
    }
}

/// `RUST_LOG` wins when set; otherwise the configured level applies to
/// everything, and an unknown level means `info`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(level).unwrap_or(FALLBACK_LEVEL)))
}

pub fn init(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(false)
        .init();

    if std::env::var_os("RUST_LOG").is_none() && level_directive(level).is_none() {
        warn!(level, "unknown log level, using {FALLBACK_LEVEL}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_level_directive() {
        assert_eq!(level_directive("WARNING"), Some("warn"));
        assert_eq!(level_directive("CRITICAL"), Some("error"));
        assert_eq!(level_directive("fatal"), Some("error"));
        assert_eq!(level_directive("NOTSET"), Some("trace"));
        assert_eq!(level_directive(" info "), Some("info"));
        assert_eq!(level_directive("loud"), None);
    }

    #[test]
    fn test_level_names() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        assert_eq!(env_filter("DEBUG").max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(env_filter(" warn ").max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(env_filter("WARNING").max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(env_filter("CRITICAL").max_level_hint(), Some(LevelFilter::ERROR));
        assert_eq!(env_filter("loud").max_level_hint(), Some(LevelFilter::INFO));
    }
}
