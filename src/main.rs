mod assembler;
mod cli;
mod config;
mod db;
mod error;
mod export;
mod importer;
mod models;
mod pipeline;
mod resolver;
mod taxonomy;
mod transfers;

use clap::Parser;

use cli::{AccountsCommands, CategoriesCommands, Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let config_path = cli::config_path(&cli.config);

    let result = match cli.command {
        Commands::Init { force } => cli::init::run(&config_path, force),
        Commands::Categories { command } => match command {
            CategoriesCommands::List => cli::categories::list(&config_path),
            CategoriesCommands::Add { name, color, icon } => {
                cli::categories::add(&config_path, &name, &color, &icon)
            }
            CategoriesCommands::Remove { name } => cli::categories::remove(&config_path, &name),
            CategoriesCommands::AddSub { main, sub } => {
                cli::categories::add_sub(&config_path, &main, &sub)
            }
            CategoriesCommands::RemoveSub { main, sub } => {
                cli::categories::remove_sub(&config_path, &main, &sub)
            }
        },
        Commands::Accounts { command } => match command {
            AccountsCommands::List => cli::accounts::list(&config_path),
            AccountsCommands::Set {
                source,
                name,
                currency,
                color,
            } => cli::accounts::set(
                &config_path,
                &source,
                name.as_deref(),
                currency.as_deref(),
                color.as_deref(),
            ),
        },
        Commands::Suggest { file } => cli::suggest::run(&file, &config_path),
        Commands::Migrate {
            file,
            output,
            format,
        } => cli::migrate::run(&file, &output, &format, &config_path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
