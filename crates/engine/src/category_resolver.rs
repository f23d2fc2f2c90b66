//! Raw label → canonical category.
//!
//! Resolution order, comparing labels case-insensitively:
//!
//! 1. a category whose display name matches the label;
//! 2. an alias whose text matches the label, resolved to its target;
//! 3. the "Uncategorized" category (also for missing or blank labels).
//!
//! A direct name match always beats an alias, so a stale alias spelled like a
//! real category can never redirect that category's transactions.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    Category, CategoryAlias,
    categories::UNCATEGORIZED_NAME_NORM,
    util::normalize_category_key,
};

/// Id used when the reference data has no "Uncategorized" row.
pub const UNCATEGORIZED_FALLBACK_ID: Uuid = Uuid::nil();

/// Immutable snapshot of categories and aliases.
///
/// Holds no interior mutability, so one resolver can be shared by concurrent
/// sub-aggregates of the same request.
#[derive(Clone, Debug)]
pub struct CategoryResolver {
    by_name: HashMap<String, Category>,
    by_alias: HashMap<String, Category>,
    uncategorized: Category,
}

impl CategoryResolver {
    pub fn new(
        categories: impl IntoIterator<Item = Category>,
        aliases: impl IntoIterator<Item = CategoryAlias>,
    ) -> Self {
        let mut by_name: HashMap<String, Category> = HashMap::new();
        for category in categories {
            if let Some(key) = normalize_category_key(&category.name) {
                by_name.entry(key).or_insert(category);
            }
        }

        let by_id: HashMap<Uuid, &Category> =
            by_name.values().map(|category| (category.id, category)).collect();
        let mut by_alias: HashMap<String, Category> = HashMap::new();
        for alias in aliases {
            let Some(target) = by_id.get(&alias.category_id) else {
                continue;
            };
            if let Some(key) = normalize_category_key(&alias.alias) {
                by_alias.entry(key).or_insert_with(|| (*target).clone());
            }
        }

        let uncategorized = by_name
            .get(UNCATEGORIZED_NAME_NORM)
            .cloned()
            .unwrap_or_else(|| Category::uncategorized(UNCATEGORIZED_FALLBACK_ID));

        Self {
            by_name,
            by_alias,
            uncategorized,
        }
    }

    /// Resolves a raw label. Never fails.
    pub fn resolve(&self, label: Option<&str>) -> &Category {
        let Some(key) = label.and_then(normalize_category_key) else {
            return &self.uncategorized;
        };
        self.by_name
            .get(&key)
            .or_else(|| self.by_alias.get(&key))
            .unwrap_or(&self.uncategorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> (CategoryResolver, Category, Category, Category) {
        let uncategorized = Category::uncategorized(Uuid::new_v4());
        let food = Category::new("Food");
        let groceries = Category::new("Groceries");
        let aliases = vec![
            CategoryAlias::new("restaurant", food.id),
            CategoryAlias::new("Take Away", food.id),
            // Stale alias spelled like a canonical category.
            CategoryAlias::new("groceries", food.id),
            // Alias pointing at an unknown category is ignored.
            CategoryAlias::new("ghost", Uuid::new_v4()),
        ];
        let resolver = CategoryResolver::new(
            vec![uncategorized.clone(), food.clone(), groceries.clone()],
            aliases,
        );
        (resolver, uncategorized, food, groceries)
    }

    #[test]
    fn direct_name_is_case_insensitive() {
        let (resolver, _, food, _) = resolver();
        assert_eq!(resolver.resolve(Some("food")), &food);
        assert_eq!(resolver.resolve(Some("  FOOD ")), &food);
    }

    #[test]
    fn alias_resolves_to_target() {
        let (resolver, _, food, _) = resolver();
        assert_eq!(resolver.resolve(Some("Restaurant")), &food);
        assert_eq!(resolver.resolve(Some("take  away")), &food);
    }

    #[test]
    fn direct_name_beats_alias() {
        let (resolver, _, _, groceries) = resolver();
        assert_eq!(resolver.resolve(Some("Groceries")), &groceries);
    }

    #[test]
    fn unknown_blank_and_missing_fall_back() {
        let (resolver, uncategorized, _, _) = resolver();
        assert_eq!(resolver.resolve(None), &uncategorized);
        assert_eq!(resolver.resolve(Some("")), &uncategorized);
        assert_eq!(resolver.resolve(Some("   ")), &uncategorized);
        assert_eq!(resolver.resolve(Some("ghost")), &uncategorized);
        assert_eq!(resolver.resolve(Some("uncategorized")), &uncategorized);
    }

    #[test]
    fn missing_uncategorized_row_uses_fallback() {
        let resolver = CategoryResolver::new(vec![Category::new("Food")], vec![]);
        assert_eq!(resolver.resolve(None).id, UNCATEGORIZED_FALLBACK_ID);
        assert_eq!(resolver.resolve(Some("x")).name, "Uncategorized");
    }
}
