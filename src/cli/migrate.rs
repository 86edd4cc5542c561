use std::path::Path;

use colored::Colorize;

use crate::config::load_config;
use crate::error::{MigrateError, Result};
use crate::pipeline::{self, OutputFormat};

pub fn run(file: &str, output: &str, format_key: &str, config_path: &Path) -> Result<()> {
    let format = OutputFormat::from_key(format_key)
        .ok_or_else(|| MigrateError::UnknownFormat(format_key.to_string()))?;

    let data = std::fs::read_to_string(file)?;
    let config = load_config(config_path);

    let outcome = pipeline::run(&data, &config, format)?;
    std::fs::write(output, &outcome.artifact)?;

    println!(
        "{} {} transactions ({} amounts recovered), {} transfer pairs",
        "Migrated".green().bold(),
        outcome.rows,
        outcome.recovered_amounts,
        outcome.transfers_paired
    );
    println!(
        "Wrote {} ({} wallets, {} categories, format {})",
        output,
        outcome.wallets,
        outcome.categories,
        format.key()
    );
    Ok(())
}
