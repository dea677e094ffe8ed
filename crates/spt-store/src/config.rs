//! Indexer configuration and logging setup.
//!
//! [`IndexerConfig`] starts from built-in defaults and is overlaid by an
//! optional TOML file and then by `SPT_*` environment variables
//! (`SPT_DATA_DIR`, `SPT_LOG_LEVEL`, `SPT_LOG_FORMAT`, `SPT_ADDRESS_HRP`).

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use spt_core::constants::DEFAULT_ADDRESS_HRP;
use spt_core::error::SptError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "SPT";

/// Configuration for an indexer instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Root directory for all persistent data.
    pub data_dir: PathBuf,
    /// Log level filter string (e.g. "info", "debug", "spt_ledger=trace").
    pub log_level: String,
    /// Log output format: "text" or "json".
    pub log_format: String,
    /// Human-readable part used when rendering witness addresses.
    pub address_hrp: String,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("spt-index");

        Self {
            data_dir,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            address_hrp: DEFAULT_ADDRESS_HRP.to_string(),
        }
    }
}

impl IndexerConfig {
    /// Load configuration from `file` (if given) and the environment.
    ///
    /// A missing file is an error only when a path was passed explicitly.
    pub fn load(file: Option<&Path>) -> Result<Self, SptError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| SptError::Config(e.to_string()))
    }

    /// Path to the RocksDB balance database.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("balances")
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logging(level: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_log_level_is_info() {
        let cfg = IndexerConfig::default();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.log_format, "text");
    }

    #[test]
    fn default_hrp_matches_core() {
        assert_eq!(IndexerConfig::default().address_hrp, DEFAULT_ADDRESS_HRP);
    }

    #[test]
    fn default_data_dir_ends_with_spt_index() {
        let cfg = IndexerConfig::default();
        assert!(
            cfg.data_dir.ends_with("spt-index"),
            "data_dir should end with 'spt-index': {:?}",
            cfg.data_dir
        );
    }

    #[test]
    fn db_path_appends_balances() {
        let cfg = IndexerConfig {
            data_dir: PathBuf::from("/tmp/spt-test"),
            ..IndexerConfig::default()
        };
        assert_eq!(cfg.db_path(), PathBuf::from("/tmp/spt-test/balances"));
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spt.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "data_dir = \"/var/lib/spt\"").unwrap();
        writeln!(f, "log_format = \"json\"").unwrap();
        drop(f);

        let cfg = IndexerConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/var/lib/spt"));
        assert_eq!(cfg.log_format, "json");
        assert_eq!(cfg.address_hrp, DEFAULT_ADDRESS_HRP);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = IndexerConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, SptError::Config(_)));
    }

    #[test]
    fn config_roundtrips_through_serde() {
        let cfg = IndexerConfig::default();
        let toml_like = config::Config::try_from(&cfg).unwrap();
        let back: IndexerConfig = toml_like.try_deserialize().unwrap();
        assert_eq!(back, cfg);
    }
}
