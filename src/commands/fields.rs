use anyhow::Result;
use colored::Colorize;

use trending_sync::pipeline::SchemaSource;
use trending_sync::schema;
use trending_sync::{Config, FieldKey};

/// Print the key → column mapping. Returns the process exit code.
pub fn execute(config: &Config, database: Option<&str>) -> Result<i32> {
    let database_id = config.database_id(database)?;
    let client = super::notion_client(config)?;

    println!("🔍 Reading database {}...", database_id);
    let schema = client.fetch_schema(database_id)?;

    let candidates = super::sync::candidates(config);
    let mapping = schema::match_fields(&schema, &FieldKey::ALL, &candidates);

    println!("\n🧭 Field mapping ({} of {} keys):", mapping.len(), FieldKey::ALL.len());
    for key in FieldKey::ALL {
        match mapping.get(key).and_then(|name| schema.get(name)) {
            Some(column) => println!(
                "  {} {:15} → {} ({})",
                "✓".green(),
                key.id(),
                column.name,
                column.kind
            ),
            None => println!("  {} {:15} → (unmapped)", "-".dimmed(), key.id()),
        }
    }

    let unclaimed: Vec<&str> = schema
        .names()
        .filter(|name| !mapping.iter().any(|(_, column)| column == *name))
        .collect();
    if !unclaimed.is_empty() {
        println!("\n  Columns left empty: {}", unclaimed.join(", "));
    }

    match schema::validate(&mapping) {
        Ok(()) => Ok(0),
        Err(e) => {
            println!("\n{} {}", "❌".red(), e);
            Ok(1)
        }
    }
}
