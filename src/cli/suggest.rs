use std::path::Path;

use colored::Colorize;

use crate::config::{load_config, save_config};
use crate::error::Result;
use crate::importer::parse_input;
use crate::resolver::suggest_mappings;

pub fn run(file: &str, config_path: &Path) -> Result<()> {
    let data = std::fs::read_to_string(file)?;
    let rows = parse_input(&data)?;

    let mut config = load_config(config_path);

    let mut distinct: Vec<String> = Vec::new();
    for row in &rows {
        if !distinct.contains(&row.txn.category) {
            distinct.push(row.txn.category.clone());
        }
    }
    let already_mapped = distinct
        .iter()
        .filter(|c| config.mapping.contains_key(*c))
        .count();
    let unmapped: Vec<String> = distinct
        .iter()
        .filter(|c| !config.mapping.contains_key(*c))
        .cloned()
        .collect();

    // Saved mappings are never overwritten; only the gaps get suggestions.
    let suggestions = suggest_mappings(&unmapped, &config.structure);
    for (cat, mapping) in &suggestions {
        if mapping.sub.is_empty() {
            println!("{} -> {}", cat, mapping.main);
        } else {
            println!("{} -> {} / {}", cat, mapping.main, mapping.sub);
        }
    }
    let added = suggestions.len();
    config.mapping.extend(suggestions);
    save_config(config_path, &config)?;

    println!(
        "{} ({} categories seen, {added} suggested, {already_mapped} already mapped)",
        "Suggestions saved".green(),
        distinct.len()
    );
    Ok(())
}
