//! Application state wiring all services together.
//!
//! AppState is the central dependency container for the Primus application.
//! It loads configuration, builds the game catalog and progression rules, and
//! picks the character store named by `storage.backend`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use primus_core::auth::box_verifier::BoxAuthVerifier;
use primus_core::catalog::GameCatalog;
use primus_core::repository::box_character::BoxCharacterRepository;
use primus_core::rules::ProgressionRules;
use primus_core::service::character::CharacterService;
use primus_infra::auth::chain::ChainedVerifier;
use primus_infra::auth::sqlite::SqliteApiKeyStore;
use primus_infra::auth::static_keys::StaticKeyVerifier;
use primus_infra::config::{load_catalog, load_config_file, load_global_config};
use primus_infra::file::JsonFileCharacterRepository;
use primus_infra::filesystem::{ensure_data_dir, resolve_data_dir};
use primus_infra::memory::InMemoryCharacterRepository;
use primus_infra::sqlite::character::SqliteCharacterRepository;
use primus_infra::sqlite::pool::DatabasePool;
use primus_types::config::{GlobalConfig, StorageBackend};

/// Concrete type aliases for the service generics, wired with the
/// type-erased repository so the backend can be chosen at runtime.
pub type AppCharacterService = CharacterService<BoxCharacterRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and the REST API handlers.
/// Wrapped in Arc for cheap cloning across async tasks.
#[derive(Clone)]
pub struct AppState {
    pub character_service: Arc<AppCharacterService>,
    pub verifier: Arc<BoxAuthVerifier>,
    /// Present only with the SQLite backend, which owns the `api_keys` table.
    pub key_store: Option<SqliteApiKeyStore>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state.
    ///
    /// 1. Resolves the data directory (`PRIMUS_DATA_DIR` or `~/.primus`)
    /// 2. Loads `config.toml`, or the file named by `--config`
    /// 3. Builds catalog, rules, store and verifiers
    pub async fn init(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        ensure_data_dir(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let config = match config_path {
            Some(path) => load_config_file(path).await?,
            None => load_global_config(&data_dir).await,
        };

        Self::from_config(config, data_dir).await
    }

    /// Build the state from an already loaded configuration.
    pub async fn from_config(config: GlobalConfig, data_dir: PathBuf) -> anyhow::Result<Self> {
        let catalog = Arc::new(load_catalog(&config, &data_dir).await?);
        let rules = Arc::new(
            ProgressionRules::new(&config.rules, Arc::clone(&catalog))
                .context("invalid [rules] configuration")?,
        );

        let static_keys = StaticKeyVerifier::new(&config.auth.static_keys);
        if !static_keys.is_empty() {
            tracing::debug!(count = static_keys.len(), "static API keys configured");
        }
        let mut verifiers = vec![BoxAuthVerifier::new(static_keys)];

        let (repo, key_store) = match config.storage.backend {
            StorageBackend::Sqlite => {
                let sqlite = &config.storage.sqlite;
                let pool = DatabasePool::in_data_dir(&data_dir, sqlite)
                    .await
                    .with_context(|| {
                        format!("failed to open database {}", data_dir.join(&sqlite.file).display())
                    })?;
                let key_store = SqliteApiKeyStore::new(pool.clone());
                verifiers.push(BoxAuthVerifier::new(key_store.clone()));
                (
                    BoxCharacterRepository::new(SqliteCharacterRepository::new(pool)),
                    Some(key_store),
                )
            }
            StorageBackend::Memory => (
                BoxCharacterRepository::new(InMemoryCharacterRepository::new()),
                None,
            ),
            StorageBackend::File => (
                BoxCharacterRepository::new(JsonFileCharacterRepository::in_data_dir(&data_dir)),
                None,
            ),
        };

        tracing::info!(
            backend = %config.storage.backend,
            schedule = %config.rules.schedule,
            budget = config.rules.budget,
            data_dir = %data_dir.display(),
            "application state ready"
        );

        let character_service = Arc::new(CharacterService::new(
            repo,
            rules,
            config.rules.enforcement,
        ));

        Ok(Self {
            character_service,
            verifier: Arc::new(BoxAuthVerifier::new(ChainedVerifier::new(verifiers))),
            key_store,
            config: Arc::new(config),
            data_dir,
        })
    }

    pub fn rules(&self) -> &ProgressionRules {
        self.character_service.rules()
    }

    pub fn catalog(&self) -> &GameCatalog {
        self.rules().catalog()
    }
}
