//! Server configuration read from the environment
//!
//! Call [`load_dotenv`] before installing the tracing subscriber so a
//! `RUST_LOG` set in `.env` applies, then build [`Settings`] once logging is up
//! so fallback warnings are recorded.

use std::str::FromStr;
use std::time::Duration;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "catalog.db";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15000;

/// Runtime settings for the catalog server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Path of the redb file
    pub database_url: String,
    pub request_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

/// Loads a `.env` file from the working directory into the environment
///
/// A missing file is not an error.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

impl Settings {
    /// Reads `HOST`, `PORT`, `DATABASE_URL` and `REQUEST_TIMEOUT_MS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", lookup("PORT"), defaults.port),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            request_timeout_ms: parse_or(
                "REQUEST_TIMEOUT_MS",
                lookup("REQUEST_TIMEOUT_MS"),
                defaults.request_timeout_ms,
            ),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = %default, "invalid setting, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Collects formatted log output in memory
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[]));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.addr(), "0.0.0.0:8080");
        assert_eq!(settings.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_reads_values() {
        let settings = Settings::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("DATABASE_URL", "/tmp/library.db"),
            ("REQUEST_TIMEOUT_MS", "500"),
        ]));
        assert_eq!(settings.addr(), "127.0.0.1:3000");
        assert_eq!(settings.database_url, "/tmp/library.db");
        assert_eq!(settings.request_timeout_ms, 500);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let settings = Settings::from_lookup(lookup(&[("PORT", "eighty"), ("REQUEST_TIMEOUT_MS", "-1")]));
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.request_timeout_ms, 15000);
    }

    #[test]
    fn test_invalid_number_logs_warning() {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let settings = tracing::subscriber::with_default(subscriber, || {
            Settings::from_lookup(lookup(&[("PORT", "eighty")]))
        });

        assert_eq!(settings.port, 8080);
        let logs = buffer.contents();
        assert!(logs.contains("WARN"));
        assert!(logs.contains("invalid setting, using default"));
        assert!(logs.contains("PORT"));
        assert!(logs.contains("eighty"));
    }
}
