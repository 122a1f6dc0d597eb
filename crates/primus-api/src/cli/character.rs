//! Character CLI commands: validate, list, show, export, delete, stats.

use std::path::Path;

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

use primus_core::repository::SortOrder;
use primus_core::repository::character::{CharacterFilter, CharacterSort};
use primus_types::auth::OwnerId;
use primus_types::character::{CharacterDraft, CharacterId};
use primus_types::rules::ValidationReport;

use crate::state::AppState;

fn parse_id(raw: &str) -> Result<CharacterId> {
    raw.parse()
        .with_context(|| format!("'{raw}' is not a valid character id"))
}

/// Validate a draft stored on disk without saving it.
///
/// Fails (non-zero exit) when the draft breaks any rule.
pub async fn validate_file(state: &AppState, file: &Path, json: bool) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let draft: CharacterDraft = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a character draft", file.display()))?;

    let report = state.character_service.validate(&draft);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&draft.name, &report);
    }

    if !report.valid {
        bail!("{} rule violation(s)", report.violations.len());
    }
    Ok(())
}

fn print_report(name: &str, report: &ValidationReport) {
    println!();
    if report.valid {
        println!(
            "  {} '{}' is valid",
            style("✓").green().bold(),
            style(name).cyan()
        );
    } else {
        println!(
            "  {} '{}' breaks {} rule{}",
            style("✗").red().bold(),
            style(name).cyan(),
            report.violations.len(),
            if report.violations.len() == 1 { "" } else { "s" }
        );
        for violation in &report.violations {
            println!(
                "    {} {} {}",
                style("•").dim(),
                style(violation.code()).yellow(),
                violation
            );
        }
    }
    println!();
    println!(
        "  {}  {} / {} points used",
        style("Point buy:").bold(),
        report.point_buy.spent,
        report.point_buy.budget
    );
    for usage in &report.tiers {
        let counts = format!("{}/{}", usage.selected, usage.cap);
        let counts = if usage.selected as u64 > u64::from(usage.cap) {
            style(counts).red()
        } else {
            style(counts).green()
        };
        println!("  {}  {}", style(format!("Tier {}:", usage.tier.number())).bold(), counts);
    }
    println!();
}

/// List an owner's characters in a table.
pub async fn list_characters(
    state: &AppState,
    owner: &str,
    role: Option<String>,
    level: Option<u32>,
    sort: &str,
    order: &str,
    json: bool,
) -> Result<()> {
    let filter = CharacterFilter {
        role,
        level,
        sort_by: Some(sort.parse::<CharacterSort>().map_err(|e| anyhow::anyhow!(e))?),
        sort_order: Some(order.parse::<SortOrder>().map_err(|e| anyhow::anyhow!(e))?),
        ..Default::default()
    };

    let owner = OwnerId::new(owner);
    let characters = state.character_service.list(&owner, &filter).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&characters)?);
        return Ok(());
    }

    if characters.is_empty() {
        println!();
        println!(
            "  {} No characters found for '{}'.",
            style("i").blue().bold(),
            owner
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Level").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Archetype").fg(Color::White),
        Cell::new("Points").fg(Color::White),
        Cell::new("Id").fg(Color::White),
    ]);

    let point_buy = state.rules().point_buy();
    for character in &characters {
        let spent = point_buy.compute_cost(&character.stats);
        let points = Cell::new(format!("{spent}/{}", point_buy.budget));
        let points = if spent > point_buy.budget {
            points.fg(Color::Red)
        } else {
            points
        };
        table.add_row(vec![
            Cell::new(&character.name).fg(Color::Cyan),
            Cell::new(character.level),
            Cell::new(&character.role),
            Cell::new(&character.archetype),
            points,
            Cell::new(character.id.to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} character{}",
        style(characters.len()).bold(),
        if characters.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Print the printable character sheet.
pub async fn show_character(state: &AppState, owner: &str, id: &str, json: bool) -> Result<()> {
    let id = parse_id(id)?;
    let sheet = state
        .character_service
        .sheet(&OwnerId::new(owner), &id)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sheet)?);
        return Ok(());
    }

    println!();
    for line in sheet.render_text().lines() {
        println!("  {line}");
    }
    println!();
    Ok(())
}

/// Export the full sheet (record plus derived values) as JSON.
pub async fn export_character(
    state: &AppState,
    owner: &str,
    id: &str,
    out: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    let id = parse_id(id)?;
    let sheet = state
        .character_service
        .sheet(&OwnerId::new(owner), &id)
        .await?;
    let content = serde_json::to_string_pretty(&sheet)?;

    match out {
        Some(path) => {
            tokio::fs::write(path, content)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            if !quiet {
                println!(
                    "  {} Exported '{}' to {}",
                    style("✓").green().bold(),
                    sheet.character.name,
                    style(path.display()).dim()
                );
            }
        }
        None => println!("{content}"),
    }
    Ok(())
}

/// Delete a character permanently with confirmation.
pub async fn delete_character(
    state: &AppState,
    owner: &str,
    id: &str,
    force: bool,
    json: bool,
) -> Result<()> {
    let id = parse_id(id)?;
    let owner = OwnerId::new(owner);
    let character = state.character_service.get(&owner, &id).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete character '{}'?",
                style(&character.name).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.red} {msg}")?);
    spinner.set_message(format!("Deleting {}...", character.name));
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    let deleted = state.character_service.delete(&owner, &id).await;
    spinner.finish_and_clear();
    let deleted = deleted?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": true, "id": deleted.id, "name": deleted.name})
        );
    } else {
        println!(
            "  {} Character '{}' deleted.",
            style("✓").red().bold(),
            deleted.name
        );
    }

    Ok(())
}

/// Count, mean level and role breakdown for one owner.
pub async fn show_stats(state: &AppState, owner: &str, json: bool) -> Result<()> {
    let stats = state.character_service.stats(&OwnerId::new(owner)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!(
        "  {}  {}",
        style("Characters:").bold(),
        stats.total_characters
    );
    println!(
        "  {}  {:.1}",
        style("Average level:").bold(),
        stats.average_level
    );
    for (role, count) in &stats.role_breakdown {
        println!("    {} {role}: {count}", style("•").dim());
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use primus_types::config::{GlobalConfig, StorageBackend};
    use primus_types::character::CreateCharacterRequest;

    async fn file_state(dir: &Path) -> AppState {
        let mut config = GlobalConfig::default();
        config.storage.backend = StorageBackend::File;
        AppState::from_config(config, dir.to_path_buf()).await.unwrap()
    }

    #[tokio::test]
    async fn test_validate_file_reports_violations() {
        let tmp = tempfile::tempdir().unwrap();
        let state = file_state(tmp.path()).await;

        let valid = tmp.path().join("valid.json");
        tokio::fs::write(
            &valid,
            r#"{"name":"Aria","level":1,"role":"scout","archetype":"ranger",
               "stats":{"str":8,"dex":15,"con":13,"int":8,"wis":14,"cha":8},
               "skills":["archery"]}"#,
        )
        .await
        .unwrap();
        validate_file(&state, &valid, true).await.unwrap();

        let invalid = tmp.path().join("invalid.json");
        tokio::fs::write(
            &invalid,
            r#"{"name":"Aria","level":1,"role":"scout","archetype":"wizard",
               "stats":{"str":8,"dex":15,"con":13,"int":8,"wis":14,"cha":8}}"#,
        )
        .await
        .unwrap();
        assert!(validate_file(&state, &invalid, true).await.is_err());

        let garbage = tmp.path().join("garbage.json");
        tokio::fs::write(&garbage, "[1, 2, 3]").await.unwrap();
        assert!(validate_file(&state, &garbage, true).await.is_err());
    }

    #[tokio::test]
    async fn test_export_writes_sheet_json() {
        let tmp = tempfile::tempdir().unwrap();
        let state = file_state(tmp.path()).await;
        let owner = OwnerId::new("alice");
        let character = state
            .character_service
            .create(
                &owner,
                CreateCharacterRequest {
                    name: "Aria".to_string(),
                    level: Some(2),
                    role: "scout".to_string(),
                    archetype: "ranger".to_string(),
                    stats: None,
                    skills: Some(vec!["archery".to_string()]),
                },
            )
            .await
            .unwrap();

        let out = tmp.path().join("aria.json");
        export_character(&state, "alice", &character.id.to_string(), Some(&out), true)
            .await
            .unwrap();

        let exported: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(&out).await.unwrap()).unwrap();
        assert_eq!(exported["character"]["name"], "Aria");
        assert_eq!(exported["point_buy"]["spent"], 0);
        assert_eq!(exported["abilities"].as_array().unwrap().len(), 6);

        assert!(
            export_character(&state, "bob", &character.id.to_string(), Some(&out), true)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_delete_with_force_removes_character() {
        let tmp = tempfile::tempdir().unwrap();
        let state = file_state(tmp.path()).await;
        let owner = OwnerId::new("alice");
        let character = state
            .character_service
            .create(
                &owner,
                CreateCharacterRequest {
                    name: "Aria".to_string(),
                    level: None,
                    role: "scout".to_string(),
                    archetype: "ranger".to_string(),
                    stats: None,
                    skills: None,
                },
            )
            .await
            .unwrap();

        delete_character(&state, "alice", &character.id.to_string(), true, true)
            .await
            .unwrap();
        assert!(state.character_service.get(&owner, &character.id).await.is_err());
        assert!(show_character(&state, "alice", "nope", true).await.is_err());
    }
}
