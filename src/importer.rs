use encoding_rs::WINDOWS_1252;

use crate::error::{MigrateError, Result};
use crate::models::{NormalizedRow, SourceTransaction, DEFAULT_CURRENCY};

pub const PRIMARY_DELIMITER: u8 = b';';
pub const SECONDARY_DELIMITER: u8 = b',';

/// A parse that detects fewer columns than this is retried with the
/// secondary delimiter.
const MIN_COLUMNS: usize = 2;

const REQUIRED_COLUMNS: &[&str] = &["account", "category", "amount", "date"];

// ---------------------------------------------------------------------------
// Field normalization
// ---------------------------------------------------------------------------

/// Best-effort mojibake repair: Wallet exports are UTF-8 files that some
/// spreadsheet tools re-save after decoding them as windows-1252, turning
/// "Caffè" into "CaffÃ¨". Re-encode as windows-1252 and re-decode as UTF-8;
/// keep the original text whenever the round-trip is not clean. Never fails.
pub fn fix_encoding(text: &str) -> String {
    let (bytes, _, had_unmappable) = WINDOWS_1252.encode(text);
    if had_unmappable {
        return text.to_string();
    }
    match std::str::from_utf8(&bytes) {
        Ok(repaired) => repaired.to_string(),
        Err(_) => text.to_string(),
    }
}

fn parse_amount_opt(raw: &str) -> Option<f64> {
    let mut s: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '€' | '$' | '£'))
        .collect();
    // Locale-ambiguous separators: when both appear, the later one is the
    // decimal separator; a lone comma is a decimal separator.
    if s.contains(',') && s.contains('.') {
        if s.rfind(',') > s.rfind('.') {
            s = s.replace('.', "").replace(',', ".");
        } else {
            s = s.replace(',', "");
        }
    } else if s.contains(',') {
        s = s.replace(',', ".");
    }
    s.parse().ok()
}

pub fn parse_amount(raw: &str) -> f64 {
    parse_amount_opt(raw).unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Table parsing
// ---------------------------------------------------------------------------

fn read_table(data: &str, delimiter: u8) -> Result<(Vec<String>, Vec<csv::StringRecord>)> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(data.as_bytes());
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| fix_encoding(h.trim()))
        .collect();
    let mut records = Vec::new();
    for result in rdr.records() {
        let Ok(record) = result else { continue };
        records.push(record);
    }
    Ok((headers, records))
}

/// Parse the raw export into normalized rows. Tries `;` first and re-parses
/// from the start with `,` when the header comes out too narrow. Fatal when
/// neither delimiter yields a usable table or a mandatory column is absent;
/// everything below that is recovered per row.
pub fn parse_input(data: &str) -> Result<Vec<NormalizedRow>> {
    let (headers, records) = match read_table(data, PRIMARY_DELIMITER) {
        Ok((h, r)) if h.len() >= MIN_COLUMNS => (h, r),
        _ => match read_table(data, SECONDARY_DELIMITER) {
            Ok((h, r)) if h.len() >= MIN_COLUMNS => (h, r),
            Ok(_) => {
                return Err(MigrateError::MalformedInput(
                    "fewer than 2 columns detected under ';' and ','".to_string(),
                ))
            }
            Err(e) => return Err(MigrateError::MalformedInput(e.to_string())),
        },
    };

    let col = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    for required in REQUIRED_COLUMNS {
        if col(required).is_none() {
            return Err(MigrateError::MissingColumn((*required).to_string()));
        }
    }

    let idx_account = col("account");
    let idx_category = col("category");
    let idx_amount = col("amount");
    let idx_date = col("date");
    let idx_currency = col("currency");
    let idx_note = col("note");
    let idx_payee = col("payee");
    let idx_labels = col("labels");
    let idx_transfer = col("transfer");
    let idx_type = col("type");

    let field = |record: &csv::StringRecord, idx: Option<usize>| -> String {
        idx.and_then(|i| record.get(i))
            .map(|v| fix_encoding(v.trim()))
            .unwrap_or_default()
    };

    let mut rows = Vec::new();
    for record in &records {
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let mut account = field(record, idx_account);
        if account.is_empty() {
            account = "Unknown".to_string();
        }
        let mut category = field(record, idx_category);
        if category.is_empty() {
            category = "Uncategorized".to_string();
        }
        let mut currency = field(record, idx_currency);
        if currency.is_empty() {
            currency = DEFAULT_CURRENCY.to_string();
        }

        let raw_amount = field(record, idx_amount);
        let amount = parse_amount(&raw_amount);
        let amount_recovered = !raw_amount.is_empty() && parse_amount_opt(&raw_amount).is_none();

        let transfer_col = field(record, idx_transfer);
        let type_col = field(record, idx_type);
        let is_transfer =
            transfer_col.eq_ignore_ascii_case("true") || type_col.eq_ignore_ascii_case("transfer");

        rows.push(NormalizedRow {
            txn: SourceTransaction {
                account,
                category,
                amount,
                currency,
                note: field(record, idx_note),
                payee: field(record, idx_payee),
                labels: field(record, idx_labels),
                date_str: field(record, idx_date),
                is_transfer,
            },
            amount_recovered,
        });
    }
    Ok(rows)
}
