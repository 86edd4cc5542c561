use std::collections::HashMap;

use crate::models::{CategoryMapping, DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_ICON};
use crate::taxonomy::Taxonomy;

/// A suggestion must score strictly above this to be accepted.
pub const MATCH_THRESHOLD: u8 = 60;

/// Well-known Wallet category names whose destination cannot be inferred
/// from spelling alone. Each alias whose target exists in the current
/// taxonomy becomes one extra match candidate backing that target.
const SYNONYMS: &[(&str, &str, &str)] = &[
    ("Benzina", "Trasporti", "Carburante"),
    ("Fuel", "Trasporti", "Carburante"),
    ("Groceries", "Alimentari", "Supermercato"),
    ("Spesa", "Alimentari", "Supermercato"),
    ("Salary", "Reddito", "Stipendio"),
    ("Rent", "Abitazione", "Affitto"),
    ("Bollette", "Abitazione", "Luce"),
    ("Palestra", "Salute & Benessere", "Sport"),
    ("Auto", "Trasporti", ""),
];

// ---------------------------------------------------------------------------
// Edit-distance similarity
// ---------------------------------------------------------------------------

/// Levenshtein edit distance using the two-row O(min(m,n)) space algorithm.
fn levenshtein(s1: &str, s2: &str) -> usize {
    let a = s1.as_bytes();
    let b = s2.as_bytes();
    let (m, n) = (a.len(), b.len());

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let (a, b, m, n) = if m <= n { (a, b, m, n) } else { (b, a, n, m) };

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

fn normalize(s: &str) -> String {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn ratio(a: &str, b: &str) -> u32 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 100;
    }
    let dist = levenshtein(a, b).min(max_len);
    (100 * (max_len - dist) / max_len) as u32
}

/// Similarity on a 0–100 scale over normalized (lowercased, alphanumeric)
/// words. Takes the better of the full-string ratio and a substring-window
/// ratio discounted to 90, so a short name buried in a longer candidate
/// still scores high without beating an exact full match.
pub fn similarity(a: &str, b: &str) -> u8 {
    let a = normalize(a);
    let b = normalize(b);
    if a == b {
        return 100;
    }
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let full = ratio(&a, &b);

    let (short, long) = if a.chars().count() <= b.chars().count() {
        (&a, &b)
    } else {
        (&b, &a)
    };
    let short_chars: Vec<char> = short.chars().collect();
    let long_chars: Vec<char> = long.chars().collect();
    let mut best_window = 0u32;
    for start in 0..=(long_chars.len() - short_chars.len()) {
        let window: String = long_chars[start..start + short_chars.len()].iter().collect();
        best_window = best_window.max(ratio(short, &window));
    }

    full.max(best_window * 9 / 10) as u8
}

// ---------------------------------------------------------------------------
// Suggestion
// ---------------------------------------------------------------------------

struct Candidate {
    text: String,
    main: String,
    sub: String,
}

/// Flatten the taxonomy into match candidates: the bare main name, one
/// `"<main> <sub>"` entry per subcategory, then the applicable synonyms.
fn flatten(taxonomy: &Taxonomy) -> Vec<Candidate> {
    let mut out = Vec::new();
    for node in taxonomy.nodes() {
        out.push(Candidate {
            text: node.name.clone(),
            main: node.name.clone(),
            sub: String::new(),
        });
        for sub in &node.subs {
            out.push(Candidate {
                text: format!("{} {}", node.name, sub),
                main: node.name.clone(),
                sub: sub.clone(),
            });
        }
    }
    for (alias, main, sub) in SYNONYMS {
        let target_exists = if sub.is_empty() {
            taxonomy.contains(main)
        } else {
            taxonomy
                .get(main)
                .map_or(false, |n| n.subs.iter().any(|s| s == sub))
        };
        if target_exists {
            out.push(Candidate {
                text: (*alias).to_string(),
                main: (*main).to_string(),
                sub: (*sub).to_string(),
            });
        }
    }
    out
}

fn mapping_for(taxonomy: &Taxonomy, main: &str, sub: &str) -> CategoryMapping {
    let (color, icon) = taxonomy
        .get(main)
        .map(|n| (n.color.clone(), n.icon.clone()))
        .unwrap_or_else(|| {
            (
                DEFAULT_CATEGORY_COLOR.to_string(),
                DEFAULT_CATEGORY_ICON.to_string(),
            )
        });
    CategoryMapping {
        main: main.to_string(),
        sub: sub.to_string(),
        color,
        icon,
    }
}

/// Suggest a destination (main, sub) for every given source category name.
/// Below-threshold names land in the catch-all. Ties go to the earliest
/// candidate; there is deliberately no further tie-breaking.
pub fn suggest_mappings(
    categories: &[String],
    taxonomy: &Taxonomy,
) -> HashMap<String, CategoryMapping> {
    let candidates = flatten(taxonomy);
    let mut suggestions = HashMap::new();
    for cat in categories {
        let mut best: Option<(&Candidate, u8)> = None;
        for candidate in &candidates {
            let score = similarity(cat, &candidate.text);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((candidate, score));
            }
        }
        let mapping = match best {
            Some((candidate, score)) if score > MATCH_THRESHOLD => {
                mapping_for(taxonomy, &candidate.main, &candidate.sub)
            }
            _ => CategoryMapping::default(),
        };
        suggestions.insert(cat.clone(), mapping);
    }
    suggestions
}

/// Resolve every source category: a saved mapping always wins and is never
/// overwritten; the rest get fresh suggestions.
pub fn resolve_mappings(
    categories: &[String],
    taxonomy: &Taxonomy,
    saved: &HashMap<String, CategoryMapping>,
) -> HashMap<String, CategoryMapping> {
    let unmapped: Vec<String> = categories
        .iter()
        .filter(|c| !saved.contains_key(*c))
        .cloned()
        .collect();
    let mut resolved = suggest_mappings(&unmapped, taxonomy);
    for (cat, mapping) in saved {
        if categories.contains(cat) {
            resolved.insert(cat.clone(), mapping.clone());
        }
    }
    resolved
}
