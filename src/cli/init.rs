use std::path::Path;

use crate::config::{save_config, MigrationConfig};
use crate::error::{MigrateError, Result};

pub fn run(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        return Err(MigrateError::Config(format!(
            "{} already exists (pass --force to overwrite)",
            config_path.display()
        )));
    }
    let config = MigrationConfig::default();
    save_config(config_path, &config)?;
    println!(
        "Wrote {} with {} main categories",
        config_path.display(),
        config.structure.len()
    );
    Ok(())
}
