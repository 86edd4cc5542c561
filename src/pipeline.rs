use crate::assembler;
use crate::config::MigrationConfig;
use crate::db::CashewStore;
use crate::error::Result;
use crate::export;
use crate::importer;
use crate::models::SourceTransaction;
use crate::resolver;
use crate::transfers;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Sql,
    Sqlite,
    Csv,
}

impl OutputFormat {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "sql" => Some(Self::Sql),
            "sqlite" => Some(Self::Sqlite),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::Sqlite => "sqlite",
            Self::Csv => "csv",
        }
    }
}

/// What one run produced, for the caller's summary line.
#[derive(Debug)]
pub struct MigrationOutcome {
    pub artifact: Vec<u8>,
    pub rows: usize,
    pub recovered_amounts: usize,
    pub transfers_paired: usize,
    pub wallets: usize,
    pub categories: usize,
}

/// The whole pipeline, strictly forward: parse → resolve categories → pair
/// transfers → assemble → serialize. Synchronous, no cancellation; a failed
/// run produces no artifact.
pub fn run(input: &str, config: &MigrationConfig, format: OutputFormat) -> Result<MigrationOutcome> {
    // Private snapshot: the collaborating session may keep editing its
    // configuration while we run.
    let config = config.clone();

    let normalized = importer::parse_input(input)?;
    let recovered_amounts = normalized.iter().filter(|r| r.amount_recovered).count();
    let rows: Vec<SourceTransaction> = normalized.into_iter().map(|r| r.txn).collect();

    let mut distinct: Vec<String> = Vec::new();
    for t in &rows {
        if !distinct.contains(&t.category) {
            distinct.push(t.category.clone());
        }
    }
    let mappings = resolver::resolve_mappings(&distinct, &config.structure, &config.mapping);

    let pairing = transfers::pair_transfers(&rows);
    let transfers_paired = pairing.iter().filter(|p| p.is_some()).count() / 2;

    let batch = assembler::assemble(&rows, &pairing, &mappings, &config.accounts, &config.structure);

    let artifact = match format {
        OutputFormat::Csv => export::write_csv(&batch)?,
        OutputFormat::Sql => {
            let mut store = CashewStore::in_memory()?;
            store.insert_batch(&batch)?;
            store.dump_sql()?.into_bytes()
        }
        OutputFormat::Sqlite => {
            let mut store = CashewStore::in_memory()?;
            store.insert_batch(&batch)?;
            store.to_bytes()?
        }
    };

    Ok(MigrationOutcome {
        artifact,
        rows: rows.len(),
        recovered_amounts,
        transfers_paired,
        wallets: batch.wallets.len(),
        categories: batch.categories.len(),
    })
}
