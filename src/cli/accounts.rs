use std::path::Path;

use comfy_table::{Cell, Table};

use crate::config::{load_config, save_config};
use crate::error::Result;
use crate::models::AccountMapping;

pub fn list(config_path: &Path) -> Result<()> {
    let config = load_config(config_path);
    let mut table = Table::new();
    table.set_header(vec!["Source", "Wallet Name", "Currency", "Color"]);
    let mut sources: Vec<&String> = config.accounts.keys().collect();
    sources.sort();
    for source in sources {
        let acc = &config.accounts[source];
        table.add_row(vec![
            Cell::new(source),
            Cell::new(&acc.name),
            Cell::new(&acc.currency),
            Cell::new(&acc.color),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn set(
    config_path: &Path,
    source: &str,
    name: Option<&str>,
    currency: Option<&str>,
    color: Option<&str>,
) -> Result<()> {
    let mut config = load_config(config_path);
    let entry = config
        .accounts
        .entry(source.to_string())
        .or_insert_with(|| AccountMapping::unchanged(source));
    if let Some(name) = name {
        entry.name = name.to_string();
    }
    if let Some(currency) = currency {
        entry.currency = currency.to_string();
    }
    if let Some(color) = color {
        entry.color = color.to_string();
    }
    save_config(config_path, &config)?;
    println!("Mapped account: {source}");
    Ok(())
}
