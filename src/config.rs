//! Driver configuration from ODBC connection strings.
//!
//! ```text
//! DSN=Mock;Mode=Partial;FailOn=SQLFetch,SQLExecute;ErrorCode=08S01;Latency=20ms
//! ```
//!
//! Keys are case-insensitive. Unknown keys are ignored, and malformed values
//! fall back to their defaults.

mod error;
mod pairs;

use std::path::Path;
use std::time::Duration;

use crate::catalog::CatalogPreset;

pub use error::ConfigError;
pub use pairs::{leading_int, parse_pairs};

/// Default SQLSTATE reported for injected failures.
pub const DEFAULT_ERROR_CODE: &str = "42000";

/// Default seed for [`BehaviorMode::Random`].
pub const DEFAULT_SEED: u64 = 0x4D4F_434B;

/// How injected failures are decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BehaviorMode {
    /// Nothing fails.
    #[default]
    Success,
    /// Every gated operation fails.
    Failure,
    /// Each gated operation fails with `failure_probability` percent.
    Random,
    /// Operations named in `fail_on` fail.
    Partial,
}

impl BehaviorMode {
    fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "failure" | "fail" => BehaviorMode::Failure,
            "random" => BehaviorMode::Random,
            "partial" => BehaviorMode::Partial,
            _ => BehaviorMode::Success,
        }
    }
}

/// Transaction behavior applied to a new connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionMode {
    #[default]
    Autocommit,
    Manual,
    ReadOnly,
}

impl TransactionMode {
    fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "manual" => TransactionMode::Manual,
            "readonly" => TransactionMode::ReadOnly,
            _ => TransactionMode::Autocommit,
        }
    }
}

/// Whether statement-state violations are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateChecking {
    #[default]
    Strict,
    /// Allows execute without prepare (when SQL text is present) and
    /// closing a cursor that is not open.
    Lenient,
}

impl StateChecking {
    fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("lenient") {
            StateChecking::Lenient
        } else {
            StateChecking::Strict
        }
    }
}

/// Parsed driver configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig {
    pub mode: BehaviorMode,
    pub catalog: CatalogPreset,
    /// Rows generated for a SELECT on a fixture table.
    pub result_set_size: usize,
    /// Operation names that fail in [`BehaviorMode::Partial`].
    pub fail_on: Vec<String>,
    /// SQLSTATE of injected failures.
    pub error_code: String,
    /// Blocking delay applied at gated entry points.
    pub latency: Duration,
    /// Open connections allowed per session; 0 is unlimited.
    pub max_connections: usize,
    pub transaction_mode: TransactionMode,
    /// Percent chance (0-100) of failure in [`BehaviorMode::Random`].
    pub failure_probability: u32,
    /// Diagnostic records pushed per injected failure (1-10).
    pub error_count: usize,
    pub state_checking: StateChecking,
    pub seed: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            mode: BehaviorMode::Success,
            catalog: CatalogPreset::Default,
            result_set_size: 100,
            fail_on: Vec::new(),
            error_code: DEFAULT_ERROR_CODE.to_string(),
            latency: Duration::ZERO,
            max_connections: 0,
            transaction_mode: TransactionMode::Autocommit,
            failure_probability: 50,
            error_count: 1,
            state_checking: StateChecking::Strict,
            seed: DEFAULT_SEED,
        }
    }
}

impl DriverConfig {
    /// Parses a connection string. Never fails: anything unrecognized keeps
    /// its default.
    pub fn parse(conn_str: &str) -> Self {
        let pairs = parse_pairs(conn_str);
        let get = |key: &str| pairs.get(key).map(String::as_str);
        let int = |key: &str| get(key).and_then(leading_int);
        let defaults = Self::default();

        Self {
            mode: get("mode").map_or(defaults.mode, BehaviorMode::parse),
            catalog: get("catalog")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.catalog),
            result_set_size: int("resultsetsize")
                .map_or(defaults.result_set_size, |n| n.max(0) as usize),
            fail_on: get("failon").map_or_else(Vec::new, |s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(String::from)
                    .collect()
            }),
            error_code: get("errorcode")
                .map_or(defaults.error_code, String::from),
            latency: get("latency").map_or(defaults.latency, parse_latency),
            max_connections: int("maxconnections")
                .map_or(defaults.max_connections, |n| n.max(0) as usize),
            transaction_mode: get("transactionmode")
                .map_or(defaults.transaction_mode, TransactionMode::parse),
            failure_probability: int("failureprobability")
                .map_or(defaults.failure_probability, |n| n.clamp(0, 100) as u32),
            error_count: int("errorcount").map_or(defaults.error_count, |n| n.clamp(1, 10) as usize),
            state_checking: get("statechecking")
                .map_or(defaults.state_checking, StateChecking::parse),
            seed: int("seed").map_or(defaults.seed, |n| n as u64),
        }
    }

    /// Reads and parses a connection string file; see
    /// [`read_connection_string`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self::parse(&read_connection_string(path)?))
    }

    /// Whether `operation` is listed in `fail_on`, ignoring case.
    pub fn fails_on(&self, operation: &str) -> bool {
        self.fail_on.iter().any(|f| f.eq_ignore_ascii_case(operation))
    }
}

/// Reads a connection string from a file. Lines are joined as separate
/// pairs; blank lines and lines starting with `#` are skipped.
pub fn read_connection_string(path: impl AsRef<Path>) -> Result<String, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join(";"))
}

/// `Nms` and bare `N` are milliseconds, `Nus` microseconds.
fn parse_latency(s: &str) -> Duration {
    let value = leading_int(s).unwrap_or(0).max(0) as u64;
    if s.contains("ms") {
        Duration::from_millis(value)
    } else if s.contains("us") {
        Duration::from_micros(value)
    } else {
        Duration::from_millis(value)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = DriverConfig::parse("");
        assert_eq!(config, DriverConfig::default());
        assert_eq!(config.result_set_size, 100);
        assert_eq!(config.error_code, "42000");
    }

    #[test]
    fn test_parse_all_keys() {
        let config = DriverConfig::parse(
            "Mode=Partial;Catalog=Empty;ResultSetSize=7;FailOn=SQLFetch, SQLExecute;\
             ErrorCode=08S01;Latency=250us;MaxConnections=2;TransactionMode=ReadOnly;\
             FailureProbability=30;ErrorCount=3;StateChecking=lenient;Seed=9",
        );
        assert_eq!(config.mode, BehaviorMode::Partial);
        assert_eq!(config.catalog, CatalogPreset::Empty);
        assert_eq!(config.result_set_size, 7);
        assert_eq!(config.fail_on, vec!["SQLFetch", "SQLExecute"]);
        assert_eq!(config.error_code, "08S01");
        assert_eq!(config.latency, Duration::from_micros(250));
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.transaction_mode, TransactionMode::ReadOnly);
        assert_eq!(config.failure_probability, 30);
        assert_eq!(config.error_count, 3);
        assert_eq!(config.state_checking, StateChecking::Lenient);
        assert_eq!(config.seed, 9);
    }

    #[test]
    fn test_mode_aliases() {
        assert_eq!(DriverConfig::parse("mode=fail").mode, BehaviorMode::Failure);
        assert_eq!(DriverConfig::parse("MODE=Random").mode, BehaviorMode::Random);
        assert_eq!(DriverConfig::parse("Mode=bogus").mode, BehaviorMode::Success);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let config = DriverConfig::parse("ResultSetSize=lots;ErrorCount=99;Latency=soon");
        assert_eq!(config.result_set_size, 100);
        assert_eq!(config.error_count, 10);
        assert_eq!(config.latency, Duration::ZERO);
        assert_eq!(DriverConfig::parse("ErrorCount=0").error_count, 1);
    }

    #[test]
    fn test_latency_units() {
        assert_eq!(parse_latency("20ms"), Duration::from_millis(20));
        assert_eq!(parse_latency("20"), Duration::from_millis(20));
        assert_eq!(parse_latency("1500us"), Duration::from_micros(1500));
    }

    #[test]
    fn test_fails_on_ignores_case() {
        let config = DriverConfig::parse("FailOn=sqlfetch");
        assert!(config.fails_on("SQLFetch"));
        assert!(!config.fails_on("SQLExecute"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# mock driver").unwrap();
        writeln!(file, "Mode=Failure").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "ErrorCode=HYT00;ResultSetSize=3").unwrap();

        assert_eq!(
            read_connection_string(file.path()).unwrap(),
            "Mode=Failure;ErrorCode=HYT00;ResultSetSize=3"
        );
        let config = DriverConfig::from_file(file.path()).unwrap();
        assert_eq!(config.mode, BehaviorMode::Failure);
        assert_eq!(config.error_code, "HYT00");
        assert_eq!(config.result_set_size, 3);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DriverConfig::from_file(dir.path().join("absent.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
