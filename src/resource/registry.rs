//! Category Registry - Load category definitions from JSON
//!
//! Category definitions are embedded at compile time and parsed once on
//! first access.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded category JSON (compiled into the binary)
const CATEGORY_FILE: &str = include_str!("../resources/categories.json");

/// Category definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDef {
    pub display_name: String,
    /// Whether resources can be looked up by name as well as by id
    #[serde(default)]
    pub named: bool,
}

/// Root structure of resources/categories.json
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConfig {
    #[serde(default)]
    pub categories: HashMap<String, CategoryDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<CategoryConfig> = OnceLock::new();

/// Get the category registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static CategoryConfig {
    REGISTRY.get_or_init(|| {
        serde_json::from_str(CATEGORY_FILE)
            .unwrap_or_else(|e| panic!("Failed to parse embedded category JSON: {}", e))
    })
}

/// Get a category definition by key
pub fn get_category(key: &str) -> Option<&'static CategoryDef> {
    get_registry().categories.get(key)
}

/// Get all category keys, sorted
pub fn all_category_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = get_registry()
        .categories
        .keys()
        .map(|s| s.as_str())
        .collect();
    keys.sort_unstable();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_loads_successfully() {
        let registry = get_registry();
        assert!(
            !registry.categories.is_empty(),
            "Registry should have categories"
        );
    }

    #[test]
    fn test_berry_category_is_named() {
        let berry = get_category("berry").expect("berry category should exist");
        assert_eq!(berry.display_name, "Berry");
        assert!(berry.named);
    }

    #[test]
    fn test_id_only_categories() {
        for key in ["characteristic", "contest-effect", "evolution-chain", "machine"] {
            let def = get_category(key).unwrap();
            assert!(!def.named, "{} should be id-only", key);
        }
    }

    #[test]
    fn test_unknown_category() {
        assert!(get_category("digimon").is_none());
    }

    #[test]
    fn test_all_category_keys_sorted() {
        let keys = all_category_keys();
        assert!(keys.contains(&"pokemon"));
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }
}
