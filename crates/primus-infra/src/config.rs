//! Global configuration and catalog loading for Primus.
//!
//! Reads `config.toml` from the data directory (`~/.primus/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to defaults when the
//! file is missing or malformed. An explicitly requested file (`--config`)
//! must exist and parse.

use std::path::Path;

use anyhow::Context;
use primus_core::catalog::GameCatalog;
use primus_types::config::GlobalConfig;

use crate::filesystem::resolve_in_data_dir;

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Load configuration from an explicit path. Unlike [`load_global_config`],
/// a missing or invalid file is an error.
pub async fn load_config_file(path: &Path) -> anyhow::Result<GlobalConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse config file {}", path.display()))
}

/// Build the game catalog named by `catalog_path`, or the built-in one.
///
/// Relative paths resolve against the data directory.
pub async fn load_catalog(config: &GlobalConfig, data_dir: &Path) -> anyhow::Result<GameCatalog> {
    let Some(path) = &config.catalog_path else {
        tracing::debug!("using built-in game catalog");
        return Ok(GameCatalog::builtin());
    };

    let path = resolve_in_data_dir(data_dir, path);
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    let catalog = GameCatalog::from_toml_str(&content)
        .with_context(|| format!("invalid catalog {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        roles = catalog.roles().len(),
        archetypes = catalog.archetypes().len(),
        skills = catalog.skills().len(),
        "loaded game catalog"
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use primus_types::config::StorageBackend;
    use primus_types::rules::PointBuySchedule;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.rules.budget, 27);
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[rules]
budget = 90
schedule = "linear"
score_floor = 1
score_ceiling = 30

[storage]
backend = "memory"
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.rules.budget, 90);
        assert_eq!(config.rules.schedule, PointBuySchedule::Linear);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.rules.budget, 27);
    }

    #[tokio::test]
    async fn load_config_file_requires_the_file() {
        let tmp = TempDir::new().unwrap();
        assert!(load_config_file(&tmp.path().join("absent.toml")).await.is_err());

        let path = tmp.path().join("custom.toml");
        tokio::fs::write(&path, "[server]\nport = 8080\n").await.unwrap();
        assert_eq!(load_config_file(&path).await.unwrap().server.port, 8080);

        tokio::fs::write(&path, "[server]\nport = \"x\"\n").await.unwrap();
        assert!(load_config_file(&path).await.is_err());
    }

    #[tokio::test]
    async fn load_catalog_builtin_and_from_file() {
        let tmp = TempDir::new().unwrap();
        let builtin = load_catalog(&GlobalConfig::default(), tmp.path()).await.unwrap();
        assert_eq!(builtin.skills().len(), 16);

        tokio::fs::write(
            tmp.path().join("catalog.toml"),
            r#"
[[roles]]
id = "bard"
name = "Bard"
description = "Sings."

[[archetypes]]
id = "skald"
name = "Skald"
description = "War songs."
role_id = "bard"
bonuses = { charisma = 2 }
"#,
        )
        .await
        .unwrap();

        let config = GlobalConfig {
            catalog_path: Some("catalog.toml".into()),
            ..Default::default()
        };
        let custom = load_catalog(&config, tmp.path()).await.unwrap();
        assert_eq!(custom.roles().len(), 1);
        assert_eq!(custom.archetype("skald").unwrap().role_id, "bard");
    }

    #[tokio::test]
    async fn load_catalog_rejects_dangling_references() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("catalog.toml"),
            r#"
[[archetypes]]
id = "skald"
name = "Skald"
description = "War songs."
role_id = "bard"
"#,
        )
        .await
        .unwrap();

        let config = GlobalConfig {
            catalog_path: Some("catalog.toml".into()),
            ..Default::default()
        };
        assert!(load_catalog(&config, tmp.path()).await.is_err());
    }
}
