//! Global configuration types for Primus.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! progression rules, the storage backend, the HTTP listener, and static
//! credentials.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rules::{Enforcement, PointBuySchedule};

/// Top-level configuration for Primus.
///
/// Loaded from `~/.primus/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    /// Optional TOML file replacing the built-in roles/archetypes/skills.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

/// Point-buy and level parameters for the rule engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "default_budget")]
    pub budget: u32,

    #[serde(default)]
    pub schedule: PointBuySchedule,

    #[serde(default = "default_score_floor")]
    pub score_floor: u8,

    #[serde(default = "default_score_ceiling")]
    pub score_ceiling: u8,

    #[serde(default = "default_min_level")]
    pub min_level: u32,

    #[serde(default = "default_max_level")]
    pub max_level: u32,

    #[serde(default)]
    pub enforcement: Enforcement,
}

fn default_budget() -> u32 {
    27
}

fn default_score_floor() -> u8 {
    8
}

fn default_score_ceiling() -> u8 {
    15
}

fn default_min_level() -> u32 {
    1
}

fn default_max_level() -> u32 {
    20
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            budget: default_budget(),
            schedule: PointBuySchedule::default(),
            score_floor: default_score_floor(),
            score_ceiling: default_score_ceiling(),
            min_level: default_min_level(),
            max_level: default_max_level(),
            enforcement: Enforcement::default(),
        }
    }
}

impl RulesConfig {
    /// The flat "sum of six" variant: every score costs its value, 90 points, range [1, 30].
    pub fn linear() -> Self {
        Self {
            budget: 90,
            schedule: PointBuySchedule::Linear,
            score_floor: 1,
            score_ceiling: 30,
            ..Self::default()
        }
    }

    /// Reject configurations the rule engine cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.score_floor > self.score_ceiling {
            return Err(ConfigError::InvertedScoreRange {
                floor: self.score_floor,
                ceiling: self.score_ceiling,
            });
        }
        if self.schedule == PointBuySchedule::Stepped
            && (self.score_floor < 8 || self.score_ceiling > 15)
        {
            return Err(ConfigError::SteppedRangeOutOfDomain {
                floor: self.score_floor,
                ceiling: self.score_ceiling,
            });
        }
        if self.min_level == 0 {
            return Err(ConfigError::ZeroMinimumLevel);
        }
        if self.min_level > self.max_level {
            return Err(ConfigError::InvertedLevelRange {
                min: self.min_level,
                max: self.max_level,
            });
        }
        Ok(())
    }
}

/// Which `CharacterRepository` implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Relational store in `{data_dir}/{storage.sqlite.file}`.
    #[default]
    Sqlite,
    /// Process-local key-value map; nothing survives a restart.
    Memory,
    /// One JSON document per owner under `{data_dir}/characters/`.
    File,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::File => write!(f, "file"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            "file" => Ok(StorageBackend::File),
            other => Err(format!("invalid storage backend: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Only read when `backend = "sqlite"`.
    #[serde(default)]
    pub sqlite: SqliteConfig,
}

/// `[storage.sqlite]`: database file and connection tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// File name inside the data directory.
    #[serde(default = "default_sqlite_file")]
    pub file: String,

    /// Size of the read-only pool. Writes always go through one connection.
    #[serde(default = "default_reader_connections")]
    pub reader_connections: u32,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_sqlite_file() -> String {
    "primus.db".to_string()
}

fn default_reader_connections() -> u32 {
    4
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            file: default_sqlite_file(),
            reader_connections: default_reader_connections(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Credentials declared in configuration rather than the database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub static_keys: Vec<StaticKey>,
}

/// An API key known only by its SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticKey {
    pub owner_id: String,
    /// Lowercase hex SHA-256 of the plaintext key.
    pub key_sha256: String,
    #[serde(default = "default_key_name")]
    pub name: String,
}

fn default_key_name() -> String {
    "static".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.rules.budget, 27);
        assert_eq!(config.rules.schedule, PointBuySchedule::Stepped);
        assert_eq!(config.rules.score_floor, 8);
        assert_eq!(config.rules.score_ceiling, 15);
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.server.port, 5000);
        assert!(config.auth.static_keys.is_empty());
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.rules, RulesConfig::default());
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
catalog_path = "/etc/primus/catalog.toml"

[rules]
budget = 90
schedule = "linear"
score_floor = 1
score_ceiling = 30
enforcement = "warn"

[storage]
backend = "file"

[storage.sqlite]
reader_connections = 2

[server]
port = 8080

[[auth.static_keys]]
owner_id = "alice"
key_sha256 = "abc123"
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.rules.budget, 90);
        assert_eq!(config.rules.schedule, PointBuySchedule::Linear);
        assert_eq!(config.rules.enforcement, Enforcement::Warn);
        assert_eq!(config.rules.max_level, 20);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.sqlite.reader_connections, 2);
        assert_eq!(config.storage.sqlite.file, "primus.db");
        assert_eq!(config.storage.sqlite.busy_timeout_ms, 5000);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.auth.static_keys.len(), 1);
        assert_eq!(config.auth.static_keys[0].name, "static");
        assert_eq!(
            config.catalog_path,
            Some(PathBuf::from("/etc/primus/catalog.toml"))
        );
    }

    #[test]
    fn test_rules_validate() {
        assert!(RulesConfig::default().validate().is_ok());
        assert!(RulesConfig::linear().validate().is_ok());

        let inverted = RulesConfig {
            score_floor: 15,
            score_ceiling: 8,
            ..RulesConfig::default()
        };
        assert_eq!(
            inverted.validate(),
            Err(ConfigError::InvertedScoreRange {
                floor: 15,
                ceiling: 8
            })
        );

        let stepped_wide = RulesConfig {
            score_floor: 1,
            ..RulesConfig::default()
        };
        assert!(matches!(
            stepped_wide.validate(),
            Err(ConfigError::SteppedRangeOutOfDomain { .. })
        ));

        let levels = RulesConfig {
            min_level: 5,
            max_level: 3,
            ..RulesConfig::default()
        };
        assert!(matches!(
            levels.validate(),
            Err(ConfigError::InvertedLevelRange { min: 5, max: 3 })
        ));
    }

    #[test]
    fn test_storage_backend_roundtrip() {
        for backend in [StorageBackend::Sqlite, StorageBackend::Memory, StorageBackend::File] {
            let parsed: StorageBackend = backend.to_string().parse().unwrap();
            assert_eq!(parsed, backend);
        }
    }
}
