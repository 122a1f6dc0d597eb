//! API key management: create, list, revoke.
//!
//! Keys are issued by the SQLite backend's `api_keys` table. Other backends
//! authenticate only through `[[auth.static_keys]]` in the config file.

use anyhow::{Result, anyhow};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use primus_infra::auth::hash_api_key;
use primus_infra::auth::sqlite::SqliteApiKeyStore;
use primus_types::auth::OwnerId;

use crate::state::AppState;

fn key_store(state: &AppState) -> Result<&SqliteApiKeyStore> {
    state.key_store.as_ref().ok_or_else(|| {
        anyhow!(
            "API keys are stored only by the sqlite backend (current: {}); add a \
             [[auth.static_keys]] entry with the key's SHA-256 instead",
            state.config.storage.backend
        )
    })
}

/// Issue a key and print the plaintext once.
pub async fn create_key(state: &AppState, owner: &str, name: &str, json: bool) -> Result<()> {
    let store = key_store(state)?;
    let (plaintext, info) = store.create_key(&OwnerId::new(owner), name).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "key": plaintext,
                "id": info.id,
                "owner_id": info.owner_id,
                "name": info.name,
                "key_sha256": hash_api_key(&plaintext),
            }))?
        );
        return Ok(());
    }

    println!();
    println!(
        "  {} API key created for '{}' (save this -- it won't be shown again):",
        style("🔑").bold(),
        style(owner).cyan()
    );
    println!();
    println!("  {}", style(&plaintext).yellow().bold());
    println!();
    println!(
        "  Use it as: {}",
        style("Authorization: Bearer <key>").dim()
    );
    println!();
    Ok(())
}

pub async fn list_keys(state: &AppState, owner: &str, json: bool) -> Result<()> {
    let store = key_store(state)?;
    let keys = store.list_keys(&OwnerId::new(owner)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&keys)?);
        return Ok(());
    }

    if keys.is_empty() {
        println!();
        println!(
            "  {} No keys for '{}'. Create one with: {}",
            style("i").blue().bold(),
            owner,
            style(format!("primus key create --owner {owner}")).yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Created").fg(Color::White),
        Cell::new("Last used").fg(Color::White),
        Cell::new("Id").fg(Color::White),
    ]);
    for key in &keys {
        let last_used = key
            .last_used_at
            .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "never".to_string());
        table.add_row(vec![
            Cell::new(&key.name).fg(Color::Cyan),
            Cell::new(key.created_at.format("%Y-%m-%d %H:%M UTC")),
            Cell::new(last_used).fg(Color::DarkGrey),
            Cell::new(&key.id).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

pub async fn revoke_key(state: &AppState, owner: &str, id: &str, json: bool) -> Result<()> {
    let store = key_store(state)?;
    store.revoke_key(&OwnerId::new(owner), id).await?;

    if json {
        println!("{}", serde_json::json!({"revoked": true, "id": id}));
    } else {
        println!("  {} Key {} revoked.", style("✓").red().bold(), style(id).dim());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use primus_types::config::{GlobalConfig, StorageBackend};

    #[tokio::test]
    async fn test_keys_need_the_sqlite_backend() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = GlobalConfig::default();
        config.storage.backend = StorageBackend::Memory;
        let state = AppState::from_config(config, tmp.path().to_path_buf())
            .await
            .unwrap();

        let err = create_key(&state, "alice", "cli", true).await.unwrap_err();
        assert!(err.to_string().contains("sqlite"));
    }

    #[tokio::test]
    async fn test_create_list_revoke() {
        let tmp = tempfile::tempdir().unwrap();
        let state = AppState::from_config(GlobalConfig::default(), tmp.path().to_path_buf())
            .await
            .unwrap();

        create_key(&state, "alice", "cli", true).await.unwrap();
        let store = state.key_store.clone().unwrap();
        let keys = store.list_keys(&OwnerId::new("alice")).await.unwrap();
        assert_eq!(keys.len(), 1);

        list_keys(&state, "alice", true).await.unwrap();
        revoke_key(&state, "alice", &keys[0].id, true).await.unwrap();
        assert!(revoke_key(&state, "alice", &keys[0].id, true).await.is_err());
    }
}
