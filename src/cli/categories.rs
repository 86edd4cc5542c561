use std::path::Path;

use comfy_table::{Cell, Table};

use crate::config::{load_config, save_config};
use crate::error::Result;

pub fn list(config_path: &Path) -> Result<()> {
    let config = load_config(config_path);
    if config.structure.is_empty() {
        println!("No categories configured.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Name", "Subcategories", "Color", "Icon", "Income"]);
    for node in config.structure.nodes() {
        table.add_row(vec![
            Cell::new(&node.name),
            Cell::new(node.subs.join(", ")),
            Cell::new(&node.color),
            Cell::new(&node.icon),
            Cell::new(if node.income { "yes" } else { "" }),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn add(config_path: &Path, name: &str, color: &str, icon: &str) -> Result<()> {
    let mut config = load_config(config_path);
    if config.structure.add_main(name, color, icon) {
        save_config(config_path, &config)?;
        println!("Added category: {name}");
    } else {
        println!("Category already exists: {name}");
    }
    Ok(())
}

pub fn remove(config_path: &Path, name: &str) -> Result<()> {
    let mut config = load_config(config_path);
    if config.structure.remove_main(name) {
        save_config(config_path, &config)?;
        println!("Removed category: {name}");
    } else {
        println!("No such category: {name}");
    }
    Ok(())
}

pub fn add_sub(config_path: &Path, main: &str, sub: &str) -> Result<()> {
    let mut config = load_config(config_path);
    if config.structure.add_sub(main, sub)? {
        save_config(config_path, &config)?;
        println!("Added {sub} under {main}");
    } else {
        println!("{sub} already exists under {main}");
    }
    Ok(())
}

pub fn remove_sub(config_path: &Path, main: &str, sub: &str) -> Result<()> {
    let mut config = load_config(config_path);
    if config.structure.remove_sub(main, sub)? {
        save_config(config_path, &config)?;
        println!("Removed {sub} from {main}");
    } else {
        println!("No such subcategory: {sub} under {main}");
    }
    Ok(())
}
