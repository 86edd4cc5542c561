use crate::assembler::AssembledBatch;
use crate::error::{MigrateError, Result};

/// Column order Cashew's CSV import expects.
pub const CSV_COLUMNS: &[&str] = &[
    "account",
    "amount",
    "currency",
    "title",
    "note",
    "date",
    "income",
    "type",
    "category name",
    "subcategory name",
    "color",
    "icon",
    "emoji",
    "budget",
    "objective",
];

/// Cashew stores colors as `0xffrrggbb` (8 hex digits, opaque alpha), not
/// as bare `#RRGGBB` strings.
pub fn cashew_color(hex: &str) -> String {
    let h = hex.trim().trim_start_matches('#').to_lowercase();
    let h6: String = if h.len() == 3 {
        h.chars().flat_map(|c| [c, c]).collect()
    } else {
        h
    };
    if h6.len() == 6 && h6.chars().all(|c| c.is_ascii_hexdigit()) {
        format!("0xff{h6}")
    } else {
        "0xff9e9e9e".to_string()
    }
}

/// Millisecond-precision timestamp in Cashew's CSV date format.
pub fn format_date_ms(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.naive_utc().format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_default()
}

pub fn write_csv(batch: &AssembledBatch) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_COLUMNS)?;
    for t in &batch.transactions {
        let record: Vec<String> = vec![
            t.account_name.clone(),
            t.amount.to_string(),
            t.currency.clone(),
            t.title.clone(),
            t.note.clone(),
            format_date_ms(t.date_ms),
            if t.income { "true" } else { "false" }.to_string(),
            "null".to_string(),
            t.main_category_name.clone(),
            t.sub_category_name.clone(),
            cashew_color(&t.color),
            t.icon.clone(),
            String::new(),
            String::new(),
            String::new(),
        ];
        wtr.write_record(&record)?;
    }
    wtr.into_inner()
        .map_err(|e| MigrateError::Other(e.to_string()))
}
