//! `primus catalog` -- print the role, archetype, and skill tables.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use primus_core::catalog::GameCatalog;
use primus_types::catalog::SkillTier;
use primus_types::character::format_modifier;

use super::CatalogSection;
use crate::state::AppState;

pub fn show_catalog(state: &AppState, section: Option<CatalogSection>, json: bool) -> Result<()> {
    let catalog = state.catalog();

    if json {
        let value = match section {
            None => serde_json::to_value(catalog.tables())?,
            Some(CatalogSection::Roles) => serde_json::to_value(catalog.roles())?,
            Some(CatalogSection::Archetypes) => serde_json::to_value(catalog.archetypes())?,
            Some(CatalogSection::Skills) => serde_json::to_value(catalog.skills())?,
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let sections: &[CatalogSection] = match &section {
        Some(one) => std::slice::from_ref(one),
        None => &[
            CatalogSection::Roles,
            CatalogSection::Archetypes,
            CatalogSection::Skills,
        ],
    };

    for section in sections {
        let (title, table) = match section {
            CatalogSection::Roles => ("Roles", roles_table(catalog)),
            CatalogSection::Archetypes => ("Archetypes", archetypes_table(catalog)),
            CatalogSection::Skills => ("Skills", skills_table(catalog)),
        };
        println!();
        println!("  {}", style(format!("── {title} ──")).dim());
        println!("{table}");
    }
    println!();

    Ok(())
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::White))
            .collect::<Vec<_>>(),
    );
    table
}

fn roles_table(catalog: &GameCatalog) -> Table {
    let mut table = new_table(&["Id", "Name", "Primary", "Recommended skills"]);
    for role in catalog.roles() {
        let primary = role
            .primary_stats
            .iter()
            .map(|a| a.abbreviation())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(&role.id).fg(Color::Cyan),
            Cell::new(&role.name),
            Cell::new(primary),
            Cell::new(role.recommended_skills.join(", ")).fg(Color::DarkGrey),
        ]);
    }
    table
}

fn archetypes_table(catalog: &GameCatalog) -> Table {
    let mut table = new_table(&["Id", "Name", "Role", "Bonuses"]);
    for archetype in catalog.archetypes() {
        let bonuses = archetype
            .bonuses
            .iter()
            .map(|(ability, bonus)| {
                format!("{} {}", ability.abbreviation(), format_modifier(i32::from(*bonus)))
            })
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(&archetype.id).fg(Color::Cyan),
            Cell::new(&archetype.name),
            Cell::new(&archetype.role_id),
            Cell::new(bonuses).fg(Color::Green),
        ]);
    }
    table
}

fn skills_table(catalog: &GameCatalog) -> Table {
    let mut table = new_table(&["Id", "Name", "Tier", "Unlocks", "Roles"]);
    for tier in SkillTier::ALL {
        for skill in catalog.skills_in_tier(tier) {
            let roles = match &skill.roles {
                Some(roles) => roles.join(", "),
                None => "any".to_string(),
            };
            table.add_row(vec![
                Cell::new(&skill.id).fg(Color::Cyan),
                Cell::new(&skill.name),
                Cell::new(tier.to_string()),
                Cell::new(format!("level {}", tier.unlock_level())).fg(Color::DarkGrey),
                Cell::new(roles),
            ]);
        }
    }
    table
}
