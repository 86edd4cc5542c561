use serde::{Deserialize, Serialize};

pub const CATCH_ALL_CATEGORY: &str = "Altro";
pub const DEFAULT_CATEGORY_COLOR: &str = "#9E9E9E";
pub const DEFAULT_CATEGORY_ICON: &str = "category_default.png";
pub const DEFAULT_WALLET_COLOR: &str = "#607D8B";
pub const DEFAULT_CURRENCY: &str = "EUR";

/// One raw row from the Wallet export, after normalization. Immutable from
/// here on; the transfer-pairing stage keeps its references in a parallel
/// vector rather than mutating these.
#[derive(Debug, Clone)]
pub struct SourceTransaction {
    pub account: String,
    pub category: String,
    pub amount: f64,
    pub currency: String,
    pub note: String,
    pub payee: String,
    pub labels: String,
    pub date_str: String,
    pub is_transfer: bool,
}

/// A normalized row plus its recovery marker. Recovered rows stay in the
/// batch and look identical to the user; tests can tell them apart.
#[derive(Debug, Clone)]
pub struct NormalizedRow {
    pub txn: SourceTransaction,
    pub amount_recovered: bool,
}

/// Saved or suggested mapping for one source category name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryMapping {
    pub main: String,
    #[serde(default)]
    pub sub: String,
    #[serde(default = "default_category_color")]
    pub color: String,
    #[serde(default = "default_category_icon")]
    pub icon: String,
}

fn default_category_color() -> String {
    DEFAULT_CATEGORY_COLOR.to_string()
}

fn default_category_icon() -> String {
    DEFAULT_CATEGORY_ICON.to_string()
}

impl Default for CategoryMapping {
    fn default() -> Self {
        Self {
            main: CATCH_ALL_CATEGORY.to_string(),
            sub: String::new(),
            color: default_category_color(),
            icon: default_category_icon(),
        }
    }
}

/// Destination settings for one source account name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountMapping {
    pub name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_wallet_color")]
    pub color: String,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_wallet_color() -> String {
    DEFAULT_WALLET_COLOR.to_string()
}

impl AccountMapping {
    pub fn unchanged(source_name: &str) -> Self {
        Self {
            name: source_name.to_string(),
            currency: default_currency(),
            color: default_wallet_color(),
        }
    }
}

// ---------------------------------------------------------------------------
// Destination records — fully keyed, ready for the schema writer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DestWallet {
    pub pk: String,
    pub name: String,
    pub colour: String,
    pub currency: String,
    pub order: i64,
}

#[derive(Debug, Clone)]
pub struct DestCategory {
    pub pk: String,
    pub name: String,
    pub colour: Option<String>,
    pub icon: Option<String>,
    pub income: bool,
    pub order: i64,
    pub main_category_pk: Option<String>,
}

/// One destination transaction. Carries both the foreign keys the relational
/// store needs and the display fields the CSV artifact needs, so no writer
/// has to re-resolve anything.
#[derive(Debug, Clone)]
pub struct DestTransaction {
    pub pk: String,
    pub paired_pk: Option<String>,
    pub title: String,
    pub amount: f64,
    pub note: String,
    pub category_fk: String,
    pub sub_category_fk: Option<String>,
    pub wallet_fk: String,
    pub date_ms: i64,
    pub income: bool,
    pub account_name: String,
    pub currency: String,
    pub main_category_name: String,
    pub sub_category_name: String,
    pub color: String,
    pub icon: String,
}
