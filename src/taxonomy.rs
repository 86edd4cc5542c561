use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, Result};
use crate::models::{CATCH_ALL_CATEGORY, DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_ICON};

/// One main category of the destination taxonomy with its ordered
/// subcategories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyNode {
    pub name: String,
    #[serde(default)]
    pub subs: Vec<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub income: bool,
}

fn default_color() -> String {
    DEFAULT_CATEGORY_COLOR.to_string()
}

fn default_icon() -> String {
    DEFAULT_CATEGORY_ICON.to_string()
}

/// The destination category structure: an ordered list of main categories,
/// names unique across the taxonomy, subcategory names unique within their
/// node. Edited between runs only; the pipeline reads a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<TaxonomyNode>", into = "Vec<TaxonomyNode>")]
pub struct Taxonomy {
    nodes: Vec<TaxonomyNode>,
}

impl From<Vec<TaxonomyNode>> for Taxonomy {
    fn from(nodes: Vec<TaxonomyNode>) -> Self {
        let mut taxonomy = Taxonomy { nodes: Vec::new() };
        for mut node in nodes {
            if taxonomy.get(&node.name).is_some() {
                continue;
            }
            let mut seen = Vec::new();
            node.subs.retain(|s| {
                if seen.contains(s) {
                    false
                } else {
                    seen.push(s.clone());
                    true
                }
            });
            taxonomy.nodes.push(node);
        }
        taxonomy
    }
}

impl From<Taxonomy> for Vec<TaxonomyNode> {
    fn from(taxonomy: Taxonomy) -> Self {
        taxonomy.nodes
    }
}

impl Taxonomy {
    pub fn new() -> Self {
        Taxonomy { nodes: Vec::new() }
    }

    pub fn nodes(&self) -> &[TaxonomyNode] {
        &self.nodes
    }

    pub fn get(&self, name: &str) -> Option<&TaxonomyNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Add a main category. No-op (returns false) when the name exists.
    pub fn add_main(&mut self, name: &str, color: &str, icon: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.nodes.push(TaxonomyNode {
            name: name.to_string(),
            subs: Vec::new(),
            color: color.to_string(),
            icon: icon.to_string(),
            income: false,
        });
        true
    }

    /// Remove a main category and all its subcategories.
    pub fn remove_main(&mut self, name: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.name != name);
        self.nodes.len() != before
    }

    /// Add a subcategory under `main`. No-op (Ok(false)) when it already
    /// exists there.
    pub fn add_sub(&mut self, main: &str, sub: &str) -> Result<bool> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.name == main)
            .ok_or_else(|| MigrateError::UnknownCategory(main.to_string()))?;
        if node.subs.iter().any(|s| s == sub) {
            return Ok(false);
        }
        node.subs.push(sub.to_string());
        Ok(true)
    }

    pub fn remove_sub(&mut self, main: &str, sub: &str) -> Result<bool> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.name == main)
            .ok_or_else(|| MigrateError::UnknownCategory(main.to_string()))?;
        let before = node.subs.len();
        node.subs.retain(|s| s != sub);
        Ok(node.subs.len() != before)
    }

    /// The stock Cashew structure new configurations start from.
    pub fn default_structure() -> Self {
        fn node(name: &str, subs: &[&str], color: &str, icon: &str, income: bool) -> TaxonomyNode {
            TaxonomyNode {
                name: name.to_string(),
                subs: subs.iter().map(|s| s.to_string()).collect(),
                color: color.to_string(),
                icon: icon.to_string(),
                income,
            }
        }
        Taxonomy {
            nodes: vec![
                node(
                    "Alimentari",
                    &["Supermercato", "Minimarket", "Panificio", "Macelleria"],
                    "#4CAF50",
                    "groceries.png",
                    false,
                ),
                node(
                    "Ristorazione",
                    &["Ristorante", "Bar", "Fast Food", "Delivery", "Caffè"],
                    "#FF9800",
                    "food.png",
                    false,
                ),
                node(
                    "Trasporti",
                    &[
                        "Carburante",
                        "Mezzi Pubblici",
                        "Treno",
                        "Taxi",
                        "Parcheggio",
                        "Manutenzione",
                        "Assicurazione",
                    ],
                    "#F44336",
                    "car.png",
                    false,
                ),
                node(
                    "Abitazione",
                    &[
                        "Affitto",
                        "Mutuo",
                        "Luce",
                        "Gas",
                        "Acqua",
                        "Internet",
                        "Condominio",
                        "Riparazioni",
                    ],
                    "#795548",
                    "house.png",
                    false,
                ),
                node(
                    "Shopping",
                    &["Abbigliamento", "Elettronica", "Casa", "Hobby", "Libri", "Regali"],
                    "#9C27B0",
                    "shopping.png",
                    false,
                ),
                node(
                    "Salute & Benessere",
                    &["Farmacia", "Medico", "Dentista", "Sport", "Barbiere/Parrucchiere"],
                    "#00BCD4",
                    "health.png",
                    false,
                ),
                node(
                    "Intrattenimento",
                    &["Cinema", "Streaming (Netflix/Spotify)", "Viaggi", "Hotel", "Eventi"],
                    "#E91E63",
                    "entertainment.png",
                    false,
                ),
                node(
                    "Reddito",
                    &["Stipendio", "Rimborsi", "Bonus", "Vendite"],
                    "#2196F3",
                    "salary.png",
                    true,
                ),
                node(
                    "Finanza",
                    &["Tasse", "Multe", "Commissioni", "Investimenti"],
                    "#607D8B",
                    "bank.png",
                    false,
                ),
                node("Correzione saldo", &[], "#9E9E9E", "charts.png", false),
                node(CATCH_ALL_CATEGORY, &[], "#9E9E9E", "category_default.png", false),
            ],
        }
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Taxonomy::default_structure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_main_is_noop_on_existing() {
        let mut t = Taxonomy::new();
        assert!(t.add_main("Casa", "#111", "house.png"));
        assert!(!t.add_main("Casa", "#222", "other.png"));
        assert_eq!(t.len(), 1);
        assert_eq!(t.get("Casa").unwrap().color, "#111");
    }

    #[test]
    fn test_remove_main_drops_subtree() {
        let mut t = Taxonomy::new();
        t.add_main("Casa", "#111", "house.png");
        t.add_sub("Casa", "Affitto").unwrap();
        assert!(t.remove_main("Casa"));
        assert!(!t.contains("Casa"));
        assert!(!t.remove_main("Casa"));
    }

    #[test]
    fn test_add_sub_unique_within_node() {
        let mut t = Taxonomy::new();
        t.add_main("Casa", "#111", "house.png");
        assert!(t.add_sub("Casa", "Affitto").unwrap());
        assert!(!t.add_sub("Casa", "Affitto").unwrap());
        assert_eq!(t.get("Casa").unwrap().subs, vec!["Affitto"]);
    }

    #[test]
    fn test_sub_ops_on_unknown_main() {
        let mut t = Taxonomy::new();
        assert!(t.add_sub("Nope", "X").is_err());
        assert!(t.remove_sub("Nope", "X").is_err());
    }

    #[test]
    fn test_remove_sub() {
        let mut t = Taxonomy::new();
        t.add_main("Casa", "#111", "house.png");
        t.add_sub("Casa", "Affitto").unwrap();
        assert!(t.remove_sub("Casa", "Affitto").unwrap());
        assert!(!t.remove_sub("Casa", "Affitto").unwrap());
    }

    #[test]
    fn test_default_structure_reserved_categories() {
        let t = Taxonomy::default_structure();
        assert!(t.contains("Correzione saldo"));
        assert!(t.contains(CATCH_ALL_CATEGORY));
        assert!(t.get("Reddito").unwrap().income);
        assert!(!t.get("Trasporti").unwrap().income);
    }

    #[test]
    fn test_serde_round_trip_preserves_order() {
        let t = Taxonomy::default_structure();
        let json = serde_json::to_string(&t).unwrap();
        let back: Taxonomy = serde_json::from_str(&json).unwrap();
        let names: Vec<&str> = back.nodes().iter().map(|n| n.name.as_str()).collect();
        let expected: Vec<&str> = t.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_deserialize_drops_duplicate_mains() {
        let json = r##"[
            {"name": "Casa", "subs": ["Affitto", "Affitto", "Luce"], "color": "#111", "icon": "a.png"},
            {"name": "Casa", "subs": [], "color": "#222", "icon": "b.png"}
        ]"##;
        let t: Taxonomy = serde_json::from_str(json).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.get("Casa").unwrap().color, "#111");
        assert_eq!(t.get("Casa").unwrap().subs, vec!["Affitto", "Luce"]);
    }
}
