use assert_cmd::Command;
use predicates::prelude::*;

const SAMPLE_EXPORT: &str = "\
account;category;amount;currency;note;payee;date;transfer;type
Conto;Benzina;-40,00;EUR;pieno;Esso;2023-01-05 08:30:00;false;EXPENSE
Conto;Ristorante;-25,00;EUR;cena;;2023-01-06 20:00:00;false;EXPENSE
Conto;Transfer;-100,00;EUR;;;2023-01-07 10:00:00;true;TRANSFER
Risparmi;Transfer;100,00;EUR;;;2023-01-07 10:00:00;true;TRANSFER
Risparmi;Stipendio;1.800,00;EUR;;;2023-01-08 09:00:00;false;INCOME
";

fn cashport() -> Command {
    Command::cargo_bin("cashport").unwrap()
}

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        Workspace {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn config(&self) -> std::path::PathBuf {
        self.dir.path().join("config.json")
    }

    fn export(&self) -> std::path::PathBuf {
        let path = self.dir.path().join("wallet-export.csv");
        std::fs::write(&path, SAMPLE_EXPORT).unwrap();
        path
    }

    fn out(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }
}

#[test]
fn init_writes_default_config() {
    let ws = Workspace::new();
    cashport()
        .arg("--config")
        .arg(ws.config())
        .args(["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("main categories"));
    let content = std::fs::read_to_string(ws.config()).unwrap();
    assert!(content.contains("Alimentari"));
    assert!(content.contains("Correzione saldo"));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let ws = Workspace::new();
    cashport().arg("--config").arg(ws.config()).args(["init"]).assert().success();
    cashport()
        .arg("--config")
        .arg(ws.config())
        .args(["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
    cashport()
        .arg("--config")
        .arg(ws.config())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn categories_add_and_list() {
    let ws = Workspace::new();
    cashport().arg("--config").arg(ws.config()).args(["init"]).assert().success();
    cashport()
        .arg("--config")
        .arg(ws.config())
        .args(["categories", "add", "Animali", "--color", "#8BC34A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added category: Animali"));
    cashport()
        .arg("--config")
        .arg(ws.config())
        .args(["categories", "add-sub", "Animali", "Veterinario"])
        .assert()
        .success();
    cashport()
        .arg("--config")
        .arg(ws.config())
        .args(["categories", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Animali").and(predicate::str::contains("Veterinario")));
}

#[test]
fn suggest_fills_unmapped_categories_only() {
    let ws = Workspace::new();
    cashport().arg("--config").arg(ws.config()).args(["init"]).assert().success();
    cashport()
        .arg("--config")
        .arg(ws.config())
        .arg("suggest")
        .arg(ws.export())
        .assert()
        .success()
        .stdout(predicate::str::contains("Suggestions saved"));
    let content = std::fs::read_to_string(ws.config()).unwrap();
    let config: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(config["mapping"]["Benzina"]["main"], "Trasporti");
    assert_eq!(config["mapping"]["Benzina"]["sub"], "Carburante");

    // A second run leaves the saved mapping untouched.
    cashport()
        .arg("--config")
        .arg(ws.config())
        .arg("suggest")
        .arg(ws.export())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 suggested"));
}

#[test]
fn migrate_writes_sql_script() {
    let ws = Workspace::new();
    let out = ws.out("restore.sql");
    cashport()
        .arg("--config")
        .arg(ws.config())
        .arg("migrate")
        .arg(ws.export())
        .arg("--output")
        .arg(&out)
        .args(["--format", "sql"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Migrated"));
    let script = std::fs::read_to_string(&out).unwrap();
    assert!(script.starts_with("BEGIN TRANSACTION;"));
    assert!(script.contains("DELETE FROM transactions;"));
    assert!(script.contains("INSERT INTO \"wallets\""));
    assert!(script.trim_end().ends_with("COMMIT;"));
}

#[test]
fn migrate_writes_sqlite_image_by_default() {
    let ws = Workspace::new();
    let out = ws.out("cashew.sqlite");
    cashport()
        .arg("--config")
        .arg(ws.config())
        .arg("migrate")
        .arg(ws.export())
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"SQLite format 3\0"));
}

#[test]
fn migrate_writes_csv() {
    let ws = Workspace::new();
    let out = ws.out("cashew.csv");
    cashport()
        .arg("--config")
        .arg(ws.config())
        .arg("migrate")
        .arg(ws.export())
        .arg("--output")
        .arg(&out)
        .args(["--format", "csv"])
        .assert()
        .success();
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text
        .lines()
        .next()
        .unwrap()
        .starts_with("account,amount,currency,title,note,date,income"));
    assert_eq!(text.lines().count(), 6);
    assert!(text.contains("Transfer"));
}

#[test]
fn migrate_rejects_unknown_format() {
    let ws = Workspace::new();
    cashport()
        .arg("--config")
        .arg(ws.config())
        .arg("migrate")
        .arg(ws.export())
        .arg("--output")
        .arg(ws.out("x"))
        .args(["--format", "xlsx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown output format"));
}

#[test]
fn migrate_halts_on_malformed_input_before_writing() {
    let ws = Workspace::new();
    let bad = ws.dir.path().join("bad.csv");
    std::fs::write(&bad, "nonsense\nmore nonsense\n").unwrap();
    let out = ws.out("never.sql");
    cashport()
        .arg("--config")
        .arg(ws.config())
        .arg("migrate")
        .arg(&bad)
        .arg("--output")
        .arg(&out)
        .args(["--format", "sql"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
    assert!(!out.exists());
}
