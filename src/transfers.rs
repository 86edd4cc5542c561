use std::collections::{HashMap, VecDeque};

use crate::models::SourceTransaction;

/// Title given to both legs of a matched pair.
pub const TRANSFER_TITLE: &str = "Transfer";

/// Reserved category forced onto both legs of a matched pair, overriding
/// any mapping.
pub const BALANCE_CORRECTION_CATEGORY: &str = "Correzione saldo";

fn cents(amount: f64) -> i64 {
    (amount.abs() * 100.0).round() as i64
}

/// Pair the debit and credit legs of account-to-account transfers.
///
/// Transfer-flagged rows are split into incoming (amount > 0) and outgoing
/// (amount < 0). Incoming legs are bucketed by (|amount| in cents, date
/// string) preserving arrival order; outgoing legs walk in original order
/// and pop the first bucket entry for their key. Account identity is
/// ignored on purpose: same-account legs pair as self-corrections, and a
/// window of several same-key candidates resolves purely FIFO.
///
/// Returns a vector parallel to `rows`; `pairing[i] == Some(j)` implies
/// `pairing[j] == Some(i)`, and a popped leg is never offered again.
pub fn pair_transfers(rows: &[SourceTransaction]) -> Vec<Option<usize>> {
    let mut pairing: Vec<Option<usize>> = vec![None; rows.len()];

    let mut incoming: HashMap<(i64, String), VecDeque<usize>> = HashMap::new();
    for (i, t) in rows.iter().enumerate() {
        if t.is_transfer && t.amount > 0.0 {
            incoming
                .entry((cents(t.amount), t.date_str.clone()))
                .or_default()
                .push_back(i);
        }
    }

    for (i, t) in rows.iter().enumerate() {
        if !t.is_transfer || t.amount >= 0.0 {
            continue;
        }
        if let Some(bucket) = incoming.get_mut(&(cents(t.amount), t.date_str.clone())) {
            if let Some(j) = bucket.pop_front() {
                pairing[i] = Some(j);
                pairing[j] = Some(i);
            }
        }
    }

    pairing
}
