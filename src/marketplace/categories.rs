// Immutable category tables: marketplace vocabularies plus the gift-side
// occasion / age-group / image-label mappings. Built once at startup and
// passed explicitly to the components that need them.

use std::collections::HashMap;

/// Age group labels used by the gift orchestrator.
pub const AGE_CHILD: &str = "child";
pub const AGE_TEEN: &str = "teen";
pub const AGE_ADULT: &str = "adult";
pub const AGE_SENIOR: &str = "senior";

pub struct CategoryTables {
    marketplace: HashMap<&'static str, HashMap<&'static str, &'static str>>,
    occasions: HashMap<&'static str, Vec<&'static str>>,
    age_groups: HashMap<&'static str, Vec<&'static str>>,
    labels: HashMap<&'static str, Vec<&'static str>>,
}

impl CategoryTables {
    pub fn new() -> Self {
        let mut marketplace: HashMap<&str, HashMap<&str, &str>> = HashMap::new();
        marketplace.insert(
            "kaspi",
            HashMap::from([
                ("electronics", "Электроника"),
                ("books", "Книги"),
                ("sports", "Спорт и отдых"),
                ("beauty", "Красота и здоровье"),
                ("toys", "Детские товары"),
                ("home", "Товары для дома"),
            ]),
        );
        marketplace.insert(
            "aliexpress",
            HashMap::from([
                ("electronics", "Electronics"),
                ("books", "Books & Office"),
                ("sports", "Sports & Entertainment"),
                ("beauty", "Beauty & Health"),
                ("toys", "Toys & Hobbies"),
                ("home", "Home & Garden"),
            ]),
        );
        marketplace.insert(
            "wildberries",
            HashMap::from([
                ("electronics", "Электроника"),
                ("books", "Книги"),
                ("sports", "Спорт"),
                ("beauty", "Красота"),
                ("toys", "Детям"),
                ("home", "Дом"),
            ]),
        );
        marketplace.insert(
            "ozon",
            HashMap::from([
                ("electronics", "Электроника"),
                ("books", "Книги"),
                ("sports", "Спорт и отдых"),
                ("beauty", "Красота и здоровье"),
                ("toys", "Детские товары"),
                ("home", "Дом и сад"),
            ]),
        );

        let occasions = HashMap::from([
            ("birthday", vec!["electronics", "beauty", "sports", "home"]),
            ("wedding", vec!["home", "electronics"]),
            ("graduation", vec!["electronics", "books", "sports"]),
            ("newborn", vec!["toys", "home"]),
        ]);

        let age_groups = HashMap::from([
            (AGE_CHILD, vec!["toys", "books", "sports"]),
            (AGE_TEEN, vec!["electronics", "sports", "books"]),
            (AGE_ADULT, vec!["electronics", "beauty", "home", "sports"]),
            (AGE_SENIOR, vec!["home", "books", "health"]),
        ]);

        let labels = HashMap::from([
            ("Sports", vec!["sports"]),
            ("Electronics", vec!["electronics"]),
            ("Book", vec!["books"]),
            ("Game", vec!["toys", "electronics"]),
            ("Pet", vec!["home"]),
            ("Music", vec!["electronics"]),
            ("Art", vec!["home"]),
            ("Food", vec!["home"]),
            ("Fashion", vec!["beauty"]),
            ("Technology", vec!["electronics"]),
            ("Fitness", vec!["sports"]),
            ("Baby", vec!["toys"]),
            ("Garden", vec!["home"]),
            ("Beauty", vec!["beauty"]),
        ]);

        Self {
            marketplace,
            occasions,
            age_groups,
            labels,
        }
    }

    /// Translate generic categories into a marketplace's own vocabulary.
    /// Categories with no mapping entry are silently dropped.
    pub fn map_for_marketplace(&self, marketplace: &str, categories: &[String]) -> Vec<String> {
        let Some(table) = self.marketplace.get(marketplace) else {
            return Vec::new();
        };
        categories
            .iter()
            .filter_map(|cat| table.get(cat.as_str()))
            .map(|mapped| (*mapped).to_string())
            .collect()
    }

    pub fn occasion_categories(&self, occasion: &str) -> &[&'static str] {
        self.occasions
            .get(occasion)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Map an age in years onto its age group.
    pub fn age_group(age: u32) -> &'static str {
        match age {
            0..=12 => AGE_CHILD,
            13..=19 => AGE_TEEN,
            20..=59 => AGE_ADULT,
            _ => AGE_SENIOR,
        }
    }

    pub fn age_categories(&self, age: u32) -> &[&'static str] {
        self.age_groups
            .get(Self::age_group(age))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Categories suggested by a detected image label, if any.
    pub fn label_categories(&self, label: &str) -> &[&'static str] {
        self.labels.get(label).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for CategoryTables {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_categories_are_dropped_silently() {
        let tables = CategoryTables::new();
        let cats = vec!["electronics".to_string(), "spaceships".to_string()];
        let mapped = tables.map_for_marketplace("kaspi", &cats);
        assert_eq!(mapped, vec!["Электроника".to_string()]);
    }

    #[test]
    fn unknown_marketplace_maps_to_nothing() {
        let tables = CategoryTables::new();
        let cats = vec!["electronics".to_string()];
        assert!(tables.map_for_marketplace("etsy", &cats).is_empty());
    }

    #[test]
    fn age_group_boundaries() {
        assert_eq!(CategoryTables::age_group(0), AGE_CHILD);
        assert_eq!(CategoryTables::age_group(12), AGE_CHILD);
        assert_eq!(CategoryTables::age_group(13), AGE_TEEN);
        assert_eq!(CategoryTables::age_group(19), AGE_TEEN);
        assert_eq!(CategoryTables::age_group(20), AGE_ADULT);
        assert_eq!(CategoryTables::age_group(59), AGE_ADULT);
        assert_eq!(CategoryTables::age_group(60), AGE_SENIOR);
    }

    #[test]
    fn label_lookup_is_exact() {
        let tables = CategoryTables::new();
        assert_eq!(tables.label_categories("Game"), ["toys", "electronics"]);
        assert!(tables.label_categories("game").is_empty());
    }
}
