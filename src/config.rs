use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://./debts.db?mode=rwc";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub log_json: bool,
    /// TUI log destination; the TUI stays silent without one.
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            log_json: false,
            log_file: None,
        }
    }
}

/// An environment value that could not be used and was replaced by its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub var: &'static str,
    pub value: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} {:?}, using default", self.var, self.value)
    }
}

/// Logs the fallbacks collected while loading. Call once a subscriber is installed.
pub fn log_warnings(warnings: &[ConfigWarning]) {
    for w in warnings {
        tracing::warn!(var = w.var, value = %w.value, "invalid config value, using default");
    }
}

impl AppConfig {
    /// Reads the process environment. Logging is not up yet at this point,
    /// so fallbacks are returned for [`log_warnings`] instead of logged here.
    pub fn from_env() -> (Self, Vec<ConfigWarning>) {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<ConfigWarning>) {
        let defaults = Self::default();
        let mut warnings = Vec::new();
        let mut fallback = |var: &'static str, value: String| {
            warnings.push(ConfigWarning { var, value });
        };

        let bind_addr = match lookup("DEBTS_BIND") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                fallback("DEBTS_BIND", raw);
                defaults.bind_addr
            }),
            None => defaults.bind_addr,
        };

        let max_connections = match lookup("DEBTS_MAX_CONNECTIONS") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    fallback("DEBTS_MAX_CONNECTIONS", raw);
                    defaults.max_connections
                }
            },
            None => defaults.max_connections,
        };

        let log_json = match lookup("DEBTS_LOG_JSON") {
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                fallback("DEBTS_LOG_JSON", raw);
                defaults.log_json
            }),
            None => defaults.log_json,
        };

        let config = Self {
            database_url: lookup("DATABASE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.database_url),
            bind_addr,
            max_connections,
            log_json,
            log_file: lookup("DEBTS_LOG_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        };
        (config, warnings)
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> (AppConfig, Vec<ConfigWarning>) {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        load(vars).0
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config(&[]), AppConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let cfg = config(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DEBTS_BIND", "0.0.0.0:8080"),
            ("DEBTS_MAX_CONNECTIONS", "2"),
            ("DEBTS_LOG_JSON", "yes"),
            ("DEBTS_LOG_FILE", "/tmp/debts.log"),
        ]);
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.max_connections, 2);
        assert!(cfg.log_json);
        assert_eq!(cfg.log_file, Some(PathBuf::from("/tmp/debts.log")));
    }

    #[test]
    fn bad_values_fall_back() {
        let (cfg, warnings) = load(&[
            ("DEBTS_BIND", "not an address"),
            ("DEBTS_MAX_CONNECTIONS", "0"),
            ("DEBTS_LOG_JSON", "maybe"),
        ]);
        assert_eq!(cfg.bind_addr, AppConfig::default().bind_addr);
        assert_eq!(cfg.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert!(!cfg.log_json);

        let vars: Vec<&str> = warnings.iter().map(|w| w.var).collect();
        assert_eq!(vars, ["DEBTS_BIND", "DEBTS_MAX_CONNECTIONS", "DEBTS_LOG_JSON"]);
        assert_eq!(warnings[0].value, "not an address");
        assert_eq!(
            warnings[1].to_string(),
            "invalid DEBTS_MAX_CONNECTIONS \"0\", using default"
        );
    }

    #[test]
    fn valid_values_raise_no_warnings() {
        let (_, warnings) = load(&[("DEBTS_BIND", "127.0.0.1:4000"), ("DEBTS_LOG_JSON", "0")]);
        assert!(warnings.is_empty());
    }
}
