use chrono::Utc;
use rusqlite::types::ValueRef;
use rusqlite::{backup, Connection};
use uuid::Uuid;

use crate::assembler::AssembledBatch;
use crate::error::Result;

/// The destination app's schema. The auxiliary tables stay empty but must
/// exist for a restored backup to be accepted.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS wallets (
    wallet_pk TEXT NOT NULL PRIMARY KEY,
    name TEXT NOT NULL,
    colour TEXT,
    icon_name TEXT,
    date_created INTEGER NOT NULL,
    date_time_modified INTEGER,
    "order" INTEGER NOT NULL,
    currency TEXT,
    currency_format TEXT,
    decimals INTEGER NOT NULL DEFAULT 2,
    home_page_widget_display TEXT
);

CREATE TABLE IF NOT EXISTS categories (
    category_pk TEXT NOT NULL PRIMARY KEY,
    name TEXT NOT NULL,
    colour TEXT,
    icon_name TEXT,
    emoji_icon_name TEXT,
    date_created INTEGER NOT NULL,
    date_time_modified INTEGER,
    "order" INTEGER NOT NULL,
    income INTEGER NOT NULL DEFAULT 0 CHECK (income IN (0, 1)),
    method_added INTEGER,
    main_category_pk TEXT REFERENCES categories (category_pk)
);

CREATE TABLE IF NOT EXISTS transactions (
    transaction_pk TEXT NOT NULL PRIMARY KEY,
    paired_transaction_fk TEXT REFERENCES transactions (transaction_pk) DEFERRABLE INITIALLY DEFERRED,
    name TEXT NOT NULL,
    amount REAL NOT NULL,
    note TEXT NOT NULL DEFAULT '',
    category_fk TEXT NOT NULL,
    sub_category_fk TEXT REFERENCES categories (category_pk),
    wallet_fk TEXT NOT NULL REFERENCES wallets (wallet_pk),
    date_created INTEGER NOT NULL,
    date_time_modified INTEGER,
    original_date_due INTEGER,
    income INTEGER NOT NULL DEFAULT 0 CHECK (income IN (0, 1)),
    period_length INTEGER,
    reoccurrence INTEGER,
    end_date INTEGER,
    upcoming_transaction_notification INTEGER CHECK (upcoming_transaction_notification IN (0, 1)),
    type INTEGER,
    paid INTEGER NOT NULL DEFAULT 1 CHECK (paid IN (0, 1)),
    created_another_future_transaction INTEGER CHECK (created_another_future_transaction IN (0, 1)),
    skip_paid INTEGER NOT NULL DEFAULT 0 CHECK (skip_paid IN (0, 1)),
    method_added INTEGER,
    transaction_owner_email TEXT,
    transaction_original_owner_email TEXT,
    shared_key TEXT,
    shared_old_key TEXT,
    shared_status INTEGER,
    shared_date_updated INTEGER,
    shared_reference_budget_pk TEXT,
    objective_fk TEXT,
    objective_loan_fk TEXT,
    budget_fks_exclude TEXT
);

CREATE TABLE IF NOT EXISTS associated_titles (
    associated_title_pk TEXT NOT NULL PRIMARY KEY,
    category_fk TEXT NOT NULL,
    title TEXT NOT NULL,
    date_created INTEGER NOT NULL,
    date_time_modified INTEGER,
    "order" INTEGER NOT NULL,
    is_exact_match INTEGER NOT NULL DEFAULT 0 CHECK (is_exact_match IN (0, 1))
);

CREATE TABLE IF NOT EXISTS category_budget_limits (
    category_limit_pk TEXT NOT NULL PRIMARY KEY,
    category_fk TEXT NOT NULL,
    budget_fk TEXT NOT NULL,
    amount REAL NOT NULL,
    date_time_modified INTEGER,
    wallet_fk TEXT NOT NULL DEFAULT '0'
);

CREATE TABLE IF NOT EXISTS delete_logs (
    delete_log_pk TEXT NOT NULL PRIMARY KEY,
    entry_pk TEXT NOT NULL,
    type INTEGER NOT NULL,
    date_time_modified INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS scanner_templates (
    scanner_template_pk TEXT NOT NULL PRIMARY KEY,
    date_created INTEGER NOT NULL,
    date_time_modified INTEGER,
    template_name TEXT NOT NULL,
    contains TEXT NOT NULL,
    title_transaction_before TEXT NOT NULL,
    title_transaction_after TEXT NOT NULL,
    amount_transaction_before TEXT NOT NULL,
    amount_transaction_after TEXT NOT NULL,
    default_category_fk TEXT NOT NULL,
    wallet_fk TEXT NOT NULL,
    "ignore" INTEGER NOT NULL DEFAULT 0 CHECK ("ignore" IN (0, 1))
);
"#;

/// Tables the migration writes rows into; the dump clears exactly these.
const DATA_TABLES: &[&str] = &["wallets", "categories", "transactions"];

/// An in-memory instance of the destination store. Rows go in once, inside
/// a single transaction; both artifacts are read back out of the same
/// instance, so the two output modes cannot diverge.
pub struct CashewStore {
    conn: Connection,
}

impl CashewStore {
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(CashewStore { conn })
    }

    pub fn insert_batch(&mut self, batch: &AssembledBatch) -> Result<()> {
        let now_ms = Utc::now().timestamp_millis();
        let tx = self.conn.transaction()?;

        for w in &batch.wallets {
            tx.execute(
                "INSERT INTO wallets (wallet_pk, name, colour, icon_name, date_created, \
                 date_time_modified, \"order\", currency, currency_format, decimals, \
                 home_page_widget_display) \
                 VALUES (?1, ?2, ?3, NULL, ?4, ?4, ?5, ?6, NULL, 2, NULL)",
                rusqlite::params![w.pk, w.name, w.colour, now_ms, w.order, w.currency],
            )?;
        }

        for c in &batch.categories {
            tx.execute(
                "INSERT INTO categories (category_pk, name, colour, icon_name, emoji_icon_name, \
                 date_created, date_time_modified, \"order\", income, method_added, \
                 main_category_pk) \
                 VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?5, ?6, ?7, 0, ?8)",
                rusqlite::params![
                    c.pk,
                    c.name,
                    c.colour,
                    c.icon,
                    now_ms,
                    c.order,
                    c.income,
                    c.main_category_pk
                ],
            )?;
        }

        for t in &batch.transactions {
            tx.execute(
                "INSERT INTO transactions (transaction_pk, paired_transaction_fk, name, amount, \
                 note, category_fk, sub_category_fk, wallet_fk, date_created, date_time_modified, \
                 original_date_due, income, upcoming_transaction_notification, paid, \
                 created_another_future_transaction, skip_paid, method_added) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?9, ?11, 1, 1, 0, 0, 0)",
                rusqlite::params![
                    t.pk,
                    t.paired_pk,
                    t.title,
                    t.amount,
                    t.note,
                    t.category_fk,
                    t.sub_category_fk,
                    t.wallet_fk,
                    t.date_ms,
                    now_ms,
                    t.income
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Textual restore script: clear the data tables, then re-insert every
    /// row, all inside one transaction.
    pub fn dump_sql(&self) -> Result<String> {
        let mut out = String::from("BEGIN TRANSACTION;\n");
        for table in DATA_TABLES {
            out.push_str(&format!("DELETE FROM {table};\n"));
        }
        for table in DATA_TABLES {
            let mut stmt = self.conn.prepare(&format!("SELECT * FROM \"{table}\""))?;
            let column_count = stmt.column_count();
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    values.push(sql_literal(row.get_ref(i)?));
                }
                out.push_str(&format!(
                    "INSERT INTO \"{table}\" VALUES({});\n",
                    values.join(",")
                ));
            }
        }
        out.push_str("COMMIT;\n");
        Ok(out)
    }

    /// Binary store image, byte-for-byte what the destination app restores.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let path = std::env::temp_dir().join(format!("cashport-{}.sqlite", Uuid::new_v4()));
        {
            let mut dst = Connection::open(&path)?;
            let bk = backup::Backup::new(&self.conn, &mut dst)?;
            bk.run_to_completion(64, std::time::Duration::from_millis(0), None)?;
        }
        let bytes = std::fs::read(&path)?;
        let _ = std::fs::remove_file(&path);
        Ok(bytes)
    }

    #[cfg(test)]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn sql_literal(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => {
            // Keep a decimal point so the literal round-trips as REAL.
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{f:.1}")
            } else {
                f.to_string()
            }
        }
        ValueRef::Text(t) => format!("'{}'", String::from_utf8_lossy(t).replace('\'', "''")),
        ValueRef::Blob(b) => format!(
            "X'{}'",
            b.iter().map(|x| format!("{x:02x}")).collect::<String>()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble;
    use crate::models::SourceTransaction;
    use crate::taxonomy::Taxonomy;
    use crate::transfers::pair_transfers;
    use std::collections::HashMap;

    fn txn(account: &str, category: &str, amount: f64, note: &str, transfer: bool) -> SourceTransaction {
        SourceTransaction {
            account: account.to_string(),
            category: category.to_string(),
            amount,
            currency: "EUR".to_string(),
            note: note.to_string(),
            payee: String::new(),
            labels: String::new(),
            date_str: "2023-01-01 10:00:00".to_string(),
            is_transfer: transfer,
        }
    }

    fn sample_batch() -> AssembledBatch {
        let rows = vec![
            txn("Conto", "Ristorante", -25.0, "Bob's dinner", false),
            txn("Conto", "XYZ", -5.0, "", false),
            txn("Conto", "Transfer", -100.0, "", true),
            txn("Risparmi", "Transfer", 100.0, "", true),
            txn("Risparmi", "Stipendio", 1800.0, "salary", false),
        ];
        let pairing = pair_transfers(&rows);
        let mut mappings = HashMap::new();
        mappings.insert(
            "Ristorante".to_string(),
            crate::models::CategoryMapping {
                main: "Ristorazione".to_string(),
                sub: "Ristorante".to_string(),
                color: "#FF9800".to_string(),
                icon: "food.png".to_string(),
            },
        );
        assemble(&rows, &pairing, &mappings, &HashMap::new(), &Taxonomy::default_structure())
    }

    fn table_count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT count(*) FROM \"{table}\""), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_schema_creates_required_tables() {
        let store = CashewStore::in_memory().unwrap();
        let tables: Vec<String> = store
            .connection()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &[
            "wallets",
            "categories",
            "transactions",
            "associated_titles",
            "category_budget_limits",
            "delete_logs",
            "scanner_templates",
        ] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_insert_batch_satisfies_constraints() {
        // Includes a mutually paired transfer and a catch-all row; any
        // constraint violation would surface as an Err here.
        let mut store = CashewStore::in_memory().unwrap();
        store.insert_batch(&sample_batch()).unwrap();
        assert_eq!(table_count(store.connection(), "wallets"), 2);
        assert_eq!(table_count(store.connection(), "transactions"), 5);
        let paired: i64 = store
            .connection()
            .query_row(
                "SELECT count(*) FROM transactions WHERE paired_transaction_fk IS NOT NULL",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(paired, 2);
    }

    #[test]
    fn test_dump_sql_shape_and_escaping() {
        let mut store = CashewStore::in_memory().unwrap();
        store.insert_batch(&sample_batch()).unwrap();
        let dump = store.dump_sql().unwrap();
        assert!(dump.starts_with("BEGIN TRANSACTION;\n"));
        assert!(dump.trim_end().ends_with("COMMIT;"));
        for table in DATA_TABLES {
            assert!(dump.contains(&format!("DELETE FROM {table};")));
        }
        // The single quote in the note doubles.
        assert!(dump.contains("Bob''s dinner"));
    }

    #[test]
    fn test_dump_replays_into_fresh_schema() {
        let mut store = CashewStore::in_memory().unwrap();
        let batch = sample_batch();
        store.insert_batch(&batch).unwrap();
        let dump = store.dump_sql().unwrap();

        let fresh = Connection::open_in_memory().unwrap();
        fresh.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
        fresh.execute_batch(SCHEMA).unwrap();
        fresh.execute_batch(&dump).unwrap();

        for table in DATA_TABLES {
            assert_eq!(
                table_count(&fresh, table),
                table_count(store.connection(), table),
                "row count mismatch in {table}"
            );
        }
    }

    #[test]
    fn test_binary_image_matches_store() {
        let mut store = CashewStore::in_memory().unwrap();
        store.insert_batch(&sample_batch()).unwrap();
        let bytes = store.to_bytes().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.sqlite");
        std::fs::write(&path, &bytes).unwrap();
        let conn = Connection::open(&path).unwrap();
        for table in DATA_TABLES {
            assert_eq!(
                table_count(&conn, table),
                table_count(store.connection(), table),
                "row count mismatch in {table}"
            );
        }
    }

    #[test]
    fn test_sentinel_category_fk_is_insertable() {
        let rows = vec![txn("A", "Mystery", -1.0, "", false)];
        let batch = assemble(&rows, &[None], &HashMap::new(), &HashMap::new(), &Taxonomy::new());
        assert_eq!(batch.transactions[0].category_fk, crate::assembler::SENTINEL_ID);
        let mut store = CashewStore::in_memory().unwrap();
        store.insert_batch(&batch).unwrap();
        assert_eq!(table_count(store.connection(), "transactions"), 1);
    }

    #[test]
    fn test_sql_literal_quoting() {
        assert_eq!(sql_literal(ValueRef::Null), "NULL");
        assert_eq!(sql_literal(ValueRef::Integer(42)), "42");
        assert_eq!(sql_literal(ValueRef::Real(100.0)), "100.0");
        assert_eq!(sql_literal(ValueRef::Real(-12.5)), "-12.5");
        assert_eq!(sql_literal(ValueRef::Text(b"it's")), "'it''s'");
    }
}
