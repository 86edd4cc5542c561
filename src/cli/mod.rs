pub mod accounts;
pub mod categories;
pub mod init;
pub mod migrate;
pub mod suggest;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub(crate) fn config_path(arg: &Option<String>) -> PathBuf {
    arg.as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(crate::config::default_config_path)
}

#[derive(Parser)]
#[command(
    name = "cashport",
    about = "Migrate Wallet by BudgetBakers exports into Cashew's native store."
)]
pub struct Cli {
    /// Path to the configuration document (default: ~/.config/cashport/config.json)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a fresh configuration document with the stock category structure.
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
    /// Manage the destination category structure.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Manage account mappings.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Suggest destination categories for an export's unmapped categories and save them.
    Suggest {
        /// Path to the Wallet CSV export
        file: String,
    },
    /// Run the migration and write the output artifact.
    Migrate {
        /// Path to the Wallet CSV export
        file: String,
        /// Output file path
        #[arg(long)]
        output: String,
        /// Output format: sql, sqlite, csv
        #[arg(long, default_value = "sqlite")]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List main categories and their subcategories.
    List,
    /// Add a main category.
    Add {
        /// Main category name
        name: String,
        #[arg(long, default_value = "#9E9E9E")]
        color: String,
        #[arg(long, default_value = "category_default.png")]
        icon: String,
    },
    /// Remove a main category and all its subcategories.
    Remove {
        name: String,
    },
    /// Add a subcategory under a main category.
    AddSub {
        main: String,
        sub: String,
    },
    /// Remove a subcategory.
    RemoveSub {
        main: String,
        sub: String,
    },
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// List account mappings.
    List,
    /// Map a source account to a destination wallet name/currency/color.
    Set {
        /// Source account name as it appears in the export
        source: String,
        /// Destination wallet name (default: unchanged)
        #[arg(long)]
        name: Option<String>,
        /// Wallet currency, e.g. EUR
        #[arg(long)]
        currency: Option<String>,
        /// Wallet color, e.g. '#607D8B'
        #[arg(long)]
        color: Option<String>,
    },
}
