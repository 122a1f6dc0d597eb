//! SQLite connections for the `sqlite` storage backend.
//!
//! Character and key writes are serialized through a single writer
//! connection; list and lookup queries use a read-only pool sized by
//! `[storage.sqlite] reader_connections`. The database runs in WAL mode so
//! readers never block the writer.

use std::path::Path;
use std::time::Duration;

use primus_types::config::SqliteConfig;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

/// Reader and writer pools over one database file.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open `{data_dir}/{config.file}`, creating it if needed.
    pub async fn in_data_dir(data_dir: &Path, config: &SqliteConfig) -> Result<Self, sqlx::Error> {
        Self::open(&data_dir.join(&config.file), config).await
    }

    /// Open the database at `path` and bring its schema up to date.
    ///
    /// The writer is connected and migrated first so the read-only pool
    /// always sees an existing file with the current schema.
    pub async fn open(path: &Path, config: &SqliteConfig) -> Result<Self, sqlx::Error> {
        let options = connect_options(path, config);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(config.reader_connections.max(1))
            .connect_with(options.read_only(true))
            .await?;

        tracing::debug!(
            path = %path.display(),
            readers = config.reader_connections.max(1),
            "sqlite database ready"
        );

        Ok(Self { reader, writer })
    }
}

fn connect_options(path: &Path, config: &SqliteConfig) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
}
