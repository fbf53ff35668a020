use anyhow::{Result, bail};
use colored::Colorize;
use comfy_table::{Cell, Table};
use keyshelf_core::services::keys as keys_service;
use keyshelf_core::view::KeyViewState;
use keyshelf_core::{AppCore, KeyRecord};
use serde_json::json;
use std::sync::Arc;

use crate::cli::KeyCommands;
use crate::output::{OutputFormat, json::print_json, table::print_table};

pub async fn run(core: Arc<AppCore>, command: KeyCommands, format: OutputFormat) -> Result<()> {
    match command {
        KeyCommands::List { reveal, reveal_all } => {
            list_keys(&core, &reveal, reveal_all, format).await
        }
        KeyCommands::Add {
            name,
            value,
            key_type,
        } => add_key(&core, &name, &value, key_type.as_deref(), format).await,
        KeyCommands::Edit { id, name, value } => edit_key(&core, &id, name, value, format).await,
        KeyCommands::Show { id, reveal } => show_key(&core, &id, reveal, format).await,
        KeyCommands::Remove { id } => remove_key(&core, &id, format).await,
        KeyCommands::Check { key } => check_key(&core, &key, format).await,
    }
}

async fn list_keys(
    core: &AppCore,
    reveal: &[String],
    reveal_all: bool,
    format: OutputFormat,
) -> Result<()> {
    let records = keys_service::list_keys(core).await?;

    let mut view = KeyViewState::new();
    if reveal_all {
        for record in &records {
            view.reveal(&record.id);
        }
    }
    for id in reveal {
        view.reveal(&resolve_key_id(&records, id)?);
    }

    if format.is_json() {
        let items: Vec<_> = records
            .iter()
            .map(|record| record_json(record, &view.display_value(record)))
            .collect();
        return print_json(&items);
    }

    if records.is_empty() {
        println!("No keys stored yet. Add one with `keyshelf key add <name> <value>`.");
        return Ok(());
    }

    print_table(key_table(&records, &view))
}

async fn add_key(
    core: &AppCore,
    name: &str,
    value: &str,
    key_type: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let record = keys_service::create_key(core, name, value, key_type).await?;

    if format.is_json() {
        return print_json(&record);
    }

    println!("Added key: {} ({})", short_id(&record.id), record.name);
    Ok(())
}

async fn edit_key(
    core: &AppCore,
    id: &str,
    name: Option<String>,
    value: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    if name.is_none() && value.is_none() {
        bail!("Nothing to change: pass --name and/or --value");
    }

    let records = keys_service::list_keys(core).await?;
    let existing = find_key(&records, id)?;

    // Fields left out keep their stored values.
    let name = name.unwrap_or_else(|| existing.name.clone());
    let value = value.unwrap_or_else(|| existing.value.clone());
    let record = keys_service::update_key(core, &existing.id, &name, &value).await?;

    if format.is_json() {
        return print_json(&record);
    }

    println!("Updated key: {} ({})", short_id(&record.id), record.name);
    Ok(())
}

async fn show_key(core: &AppCore, id: &str, reveal: bool, format: OutputFormat) -> Result<()> {
    let records = keys_service::list_keys(core).await?;
    let record = find_key(&records, id)?;

    let mut view = KeyViewState::new();
    if reveal {
        view.reveal(&record.id);
    }
    let value = view.display_value(record);

    if format.is_json() {
        return print_json(&record_json(record, &value));
    }

    println!("ID:           {}", record.id);
    println!("Name:         {}", record.name);
    println!("Value:        {}", value);
    println!("Type:         {}", record.key_type);
    println!("Usage:        {}", record.usage);
    println!("Created:      {}", record.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    Ok(())
}

async fn remove_key(core: &AppCore, id: &str, format: OutputFormat) -> Result<()> {
    let records = keys_service::list_keys(core).await?;
    let resolved = resolve_key_id(&records, id)?;
    keys_service::delete_key(core, &resolved).await?;

    if format.is_json() {
        return print_json(&json!({ "deleted": resolved }));
    }

    println!("Removed key: {}", short_id(&resolved));
    Ok(())
}

async fn check_key(core: &AppCore, candidate: &str, format: OutputFormat) -> Result<()> {
    let outcome = keys_service::validate_key(core, candidate).await?;

    if format.is_json() {
        return print_json(&outcome);
    }

    if outcome.success {
        println!("{} {}", "✓".green().bold(), outcome.message.green());
    } else {
        println!("{} {}", "✗".red().bold(), outcome.message.red());
    }
    println!("  {}", outcome.details.dimmed());
    Ok(())
}

fn key_table(records: &[KeyRecord], view: &KeyViewState) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Value", "Type", "Usage", "Created"]);

    for record in records {
        table.add_row(vec![
            Cell::new(short_id(&record.id)),
            Cell::new(&record.name),
            Cell::new(view.display_value(record)),
            Cell::new(&record.key_type),
            Cell::new(record.usage),
            Cell::new(record.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }

    table
}

fn record_json(record: &KeyRecord, value: &str) -> serde_json::Value {
    json!({
        "id": record.id,
        "name": record.name,
        "key_value": value,
        "key_type": record.key_type,
        "usage": record.usage,
        "created_at": record.created_at,
    })
}

fn short_id(value: &str) -> String {
    value.chars().take(8).collect::<String>()
}

fn find_key<'a>(records: &'a [KeyRecord], id: &str) -> Result<&'a KeyRecord> {
    let resolved = resolve_key_id(records, id)?;
    records
        .iter()
        .find(|record| record.id == resolved)
        .ok_or_else(|| anyhow::anyhow!("API key {id} not found"))
}

/// Accept a full id or an unambiguous prefix of one.
fn resolve_key_id(records: &[KeyRecord], id: &str) -> Result<String> {
    if records.iter().any(|record| record.id == id) {
        return Ok(id.to_string());
    }

    let matches: Vec<_> = records
        .iter()
        .filter(|record| record.id.starts_with(id))
        .collect();

    if matches.is_empty() {
        bail!("API key {id} not found");
    }

    if matches.len() > 1 {
        bail!("API key id '{id}' is ambiguous");
    }

    Ok(matches[0].id.clone())
}
