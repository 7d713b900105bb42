use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_DEFINITION_BYTES: usize = 4 * 1024 * 1024;

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name).ok().and_then(|s| s.parse::<T>().ok()).unwrap_or(default)
}

/// Tunables of a [`crate::SourceReader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Deadline for a single URL fetch.
    pub http_timeout: Duration,
    /// Largest accepted raw definition.
    pub max_definition_bytes: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            max_definition_bytes: DEFAULT_MAX_DEFINITION_BYTES,
        }
    }
}

impl ReaderConfig {
    /// Reads `N9_HTTP_TIMEOUT_SECS` and `N9_MAX_DEFINITION_BYTES`; unset or
    /// unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self {
            http_timeout: Duration::from_secs(env_or("N9_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)),
            max_definition_bytes: env_or("N9_MAX_DEFINITION_BYTES", DEFAULT_MAX_DEFINITION_BYTES),
        }
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_max_definition_bytes(mut self, max: usize) -> Self {
        self.max_definition_bytes = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ReaderConfig::default();
        assert_eq!(cfg.http_timeout, Duration::from_secs(10));
        assert_eq!(cfg.max_definition_bytes, 4 * 1024 * 1024);
        assert_eq!(env_or("N9_TEST_SURELY_UNSET_VARIABLE", 7u64), 7);
    }
}
