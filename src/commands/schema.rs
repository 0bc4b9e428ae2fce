use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

use trending_sync::notion::schema_from_properties;
use trending_sync::Config;

pub fn execute(config: &Config, database: Option<&str>, save: Option<&Path>) -> Result<()> {
    let database_id = config.database_id(database)?;
    let client = super::notion_client(config)?;

    println!("🔍 Reading database {}...", database_id);
    let database = client.fetch_database(database_id)?;
    let properties = database
        .get("properties")
        .and_then(Value::as_object)
        .context("Database response has no properties object")?;

    let schema = schema_from_properties(properties);
    let title = database
        .pointer("/title/0/plain_text")
        .and_then(Value::as_str)
        .unwrap_or("(untitled)");

    println!("\n📊 {} ({} columns)", title, schema.len());
    for column in schema.columns() {
        println!("  [{:13}] {}", column.kind, column.name);
        if column.kind.is_choice() && !column.choices.is_empty() {
            let choices: Vec<&str> = column.choices.iter().map(String::as_str).collect();
            println!("                  choices: {}", choices.join(", "));
        }
    }

    if let Some(path) = save {
        let json = serde_json::to_string_pretty(properties)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("\n💾 Saved raw properties to {}", path.display());
    }

    Ok(())
}
