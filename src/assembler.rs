use std::collections::HashMap;

use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use crate::models::{
    AccountMapping, CategoryMapping, DestCategory, DestTransaction, DestWallet, SourceTransaction,
    CATCH_ALL_CATEGORY, DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_ICON,
};
use crate::taxonomy::Taxonomy;
use crate::transfers::{BALANCE_CORRECTION_CATEGORY, TRANSFER_TITLE};

/// Stands in for a foreign key whose target could not be resolved; the
/// destination app treats it as "no category".
pub const SENTINEL_ID: &str = "0";

const NOTE_DELIMITER: &str = " | ";

#[derive(Debug)]
pub struct AssembledBatch {
    pub wallets: Vec<DestWallet>,
    pub categories: Vec<DestCategory>,
    pub transactions: Vec<DestTransaction>,
}

fn new_pk() -> String {
    Uuid::new_v4().to_string()
}

/// Parse the first 19 characters as `YYYY-MM-DD HH:MM:SS` into epoch
/// milliseconds; unparseable dates fall back to the run timestamp.
pub fn timestamp_ms(date_str: &str, fallback_ms: i64) -> i64 {
    let head = date_str.get(..19).unwrap_or(date_str);
    NaiveDateTime::parse_from_str(head, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(fallback_ms)
}

/// Allocate ids and resolve every relationship. Consumes the normalized
/// rows, the pairing from the transfer matcher, and the configuration
/// snapshot; produces records the schema writer can serialize verbatim.
pub fn assemble(
    rows: &[SourceTransaction],
    pairing: &[Option<usize>],
    mappings: &HashMap<String, CategoryMapping>,
    accounts: &HashMap<String, AccountMapping>,
    taxonomy: &Taxonomy,
) -> AssembledBatch {
    let now_ms = Utc::now().timestamp_millis();

    // One wallet per distinct source account, first-seen order.
    let mut wallet_ids: HashMap<String, String> = HashMap::new();
    let mut wallets: Vec<DestWallet> = Vec::new();
    for t in rows {
        if wallet_ids.contains_key(&t.account) {
            continue;
        }
        let conf = accounts
            .get(&t.account)
            .cloned()
            .unwrap_or_else(|| AccountMapping::unchanged(&t.account));
        let pk = new_pk();
        wallet_ids.insert(t.account.clone(), pk.clone());
        wallets.push(DestWallet {
            pk,
            name: conf.name,
            colour: conf.color,
            currency: conf.currency,
            order: wallets.len() as i64,
        });
    }
    let first_wallet_id = wallets.first().map(|w| w.pk.clone());

    // Main categories first, then every (main, sub) pair, in taxonomy order.
    // Ids are allocated exactly once per key, so lookups stay stable for
    // the whole run.
    let mut category_ids: HashMap<(String, String), String> = HashMap::new();
    let mut categories: Vec<DestCategory> = Vec::new();
    for node in taxonomy.nodes() {
        let main_pk = new_pk();
        category_ids.insert((node.name.clone(), String::new()), main_pk.clone());
        categories.push(DestCategory {
            pk: main_pk.clone(),
            name: node.name.clone(),
            colour: Some(node.color.clone()),
            icon: Some(node.icon.clone()),
            income: node.income,
            order: categories.len() as i64,
            main_category_pk: None,
        });
        for sub in &node.subs {
            let sub_pk = new_pk();
            category_ids.insert((node.name.clone(), sub.clone()), sub_pk.clone());
            categories.push(DestCategory {
                pk: sub_pk,
                name: sub.clone(),
                colour: None,
                icon: None,
                income: node.income,
                order: categories.len() as i64,
                main_category_pk: Some(main_pk.clone()),
            });
        }
    }
    let catch_all_id = category_ids
        .get(&(CATCH_ALL_CATEGORY.to_string(), String::new()))
        .cloned();

    let mut transactions: Vec<DestTransaction> = Vec::new();
    for (i, t) in rows.iter().enumerate() {
        let paired = pairing.get(i).copied().flatten().is_some();

        let mapping = if paired {
            let (color, icon) = taxonomy
                .get(BALANCE_CORRECTION_CATEGORY)
                .map(|n| (n.color.clone(), n.icon.clone()))
                .unwrap_or_else(|| {
                    (
                        DEFAULT_CATEGORY_COLOR.to_string(),
                        DEFAULT_CATEGORY_ICON.to_string(),
                    )
                });
            CategoryMapping {
                main: BALANCE_CORRECTION_CATEGORY.to_string(),
                sub: String::new(),
                color,
                icon,
            }
        } else {
            mappings.get(&t.category).cloned().unwrap_or_default()
        };

        let wallet_fk = wallet_ids
            .get(&t.account)
            .cloned()
            .or_else(|| first_wallet_id.clone())
            .unwrap_or_else(|| SENTINEL_ID.to_string());

        let category_fk = category_ids
            .get(&(mapping.main.clone(), String::new()))
            .cloned()
            .or_else(|| catch_all_id.clone())
            .unwrap_or_else(|| SENTINEL_ID.to_string());

        let sub_category_fk = if mapping.sub.is_empty() {
            None
        } else {
            category_ids
                .get(&(mapping.main.clone(), mapping.sub.clone()))
                .cloned()
        };

        let note = [t.note.as_str(), t.payee.as_str(), t.labels.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(NOTE_DELIMITER);

        let conf = accounts.get(&t.account);
        let account_name = conf
            .map(|c| c.name.clone())
            .unwrap_or_else(|| t.account.clone());
        let currency = conf
            .map(|c| c.currency.clone())
            .unwrap_or_else(|| t.currency.clone());

        transactions.push(DestTransaction {
            pk: new_pk(),
            paired_pk: None,
            title: if paired {
                TRANSFER_TITLE.to_string()
            } else {
                mapping.main.clone()
            },
            amount: t.amount,
            note,
            category_fk,
            sub_category_fk,
            wallet_fk,
            date_ms: timestamp_ms(&t.date_str, now_ms),
            income: t.amount > 0.0,
            account_name,
            currency,
            main_category_name: mapping.main,
            sub_category_name: mapping.sub,
            color: mapping.color,
            icon: mapping.icon,
        });
    }

    // Translate the index pairing into destination ids, both directions.
    for (i, p) in pairing.iter().enumerate() {
        if let Some(j) = *p {
            if j < transactions.len() {
                transactions[i].paired_pk = Some(transactions[j].pk.clone());
            }
        }
    }

    AssembledBatch {
        wallets,
        categories,
        transactions,
    }
}
