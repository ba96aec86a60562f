use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::cpq::pricing;
use crate::domain::catalog::{CatalogItem, Category, CategoryId, ItemId};

const BUILTIN_CATALOG: &str = include_str!("../../catalog/standard.toml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate category id `{0}`")]
    DuplicateCategory(CategoryId),
    #[error("duplicate item id `{0}`")]
    DuplicateItem(ItemId),
    #[error("item `{item}` is listed under `{listed_under}` but declares category `{declared}`")]
    CategoryMismatch { item: ItemId, listed_under: CategoryId, declared: CategoryId },
    #[error("item `{item}` has an invalid price: {reason}")]
    InvalidPrice { item: ItemId, reason: String },
}

/// Read-only reference data: categories in display order, items in category order.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    index: HashMap<ItemId, (usize, usize)>,
}

impl Catalog {
    pub fn new(categories: Vec<Category>) -> Result<Self, CatalogError> {
        let mut seen_categories = HashSet::new();
        let mut index = HashMap::new();

        for (category_pos, category) in categories.iter().enumerate() {
            if !seen_categories.insert(category.id.clone()) {
                return Err(CatalogError::DuplicateCategory(category.id.clone()));
            }

            for (item_pos, item) in category.items.iter().enumerate() {
                if item.category_id != category.id {
                    return Err(CatalogError::CategoryMismatch {
                        item: item.id.clone(),
                        listed_under: category.id.clone(),
                        declared: item.category_id.clone(),
                    });
                }
                validate_prices(item)?;
                if index.insert(item.id.clone(), (category_pos, item_pos)).is_some() {
                    return Err(CatalogError::DuplicateItem(item.id.clone()));
                }
            }
        }

        Ok(Self { categories, index })
    }

    /// The stand catalog shipped with the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let document = toml::from_str::<CatalogDocument>(raw)?;
        let categories = document
            .categories
            .into_iter()
            .map(|category| {
                let id = CategoryId(category.id);
                let items = category
                    .items
                    .into_iter()
                    .map(|item| CatalogItem {
                        id: ItemId(item.id),
                        name: item.name,
                        unit_price: item.unit_price,
                        unit_cost: item.unit_cost,
                        category_id: item.category_id.map(CategoryId).unwrap_or_else(|| id.clone()),
                    })
                    .collect();
                Category { id, display_name: category.display_name, icon: category.icon, items }
            })
            .collect();

        Self::new(categories)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        let catalog = Self::from_toml_str(&raw)?;
        info!(
            event_name = "catalog.loaded",
            path = %path.display(),
            categories = catalog.categories.len(),
            items = catalog.len(),
            "catalog loaded from file"
        );
        Ok(catalog)
    }

    /// Loads `path` when given, otherwise the built-in catalog.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    pub fn find(&self, item_id: &ItemId) -> Option<&CatalogItem> {
        let (category_pos, item_pos) = *self.index.get(item_id)?;
        self.categories.get(category_pos)?.items.get(item_pos)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.categories.iter().flat_map(|category| category.items.iter())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn validate_prices(item: &CatalogItem) -> Result<(), CatalogError> {
    pricing::check_unit_amounts(item.unit_price, item.unit_cost).map_err(|reason| {
        CatalogError::InvalidPrice { item: item.id.clone(), reason: reason.to_string() }
    })
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    categories: Vec<CategoryEntry>,
}

#[derive(Debug, Deserialize)]
struct CategoryEntry {
    id: String,
    display_name: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    items: Vec<ItemEntry>,
}

#[derive(Debug, Deserialize)]
struct ItemEntry {
    id: String,
    name: String,
    unit_price: Decimal,
    unit_cost: Option<Decimal>,
    category_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Catalog, CatalogError};
    use crate::domain::catalog::ItemId;

    #[test]
    fn builtin_catalog_is_valid_and_indexed() {
        let catalog = Catalog::builtin().expect("builtin catalog");

        assert!(!catalog.is_empty());
        assert_eq!(catalog.len(), catalog.items().count());
        for item in catalog.items() {
            assert_eq!(catalog.find(&item.id), Some(item));
        }
    }

    #[test]
    fn builtin_catalog_keeps_category_order_and_prices() {
        let catalog = Catalog::builtin().expect("builtin catalog");

        let ids: Vec<_> = catalog.categories().iter().map(|category| category.id.0.as_str()).collect();
        assert_eq!(ids.first(), Some(&"structure"));
        assert_eq!(ids.last(), Some(&"media"));
        assert_eq!(ids.len(), 10);

        let island = catalog.find(&ItemId::from("ilha")).expect("ilha");
        assert_eq!(island.unit_price, Decimal::new(15_000, 0));
        assert_eq!(island.unit_cost, Some(Decimal::new(8_000, 0)));

        let custom = catalog.find(&ItemId::from("personalizado")).expect("custom stand");
        assert!(custom.unit_price.is_zero());
    }

    #[test]
    fn parses_string_prices_exactly() {
        let catalog = Catalog::from_toml_str(
            r#"
[[categories]]
id = "floor"
display_name = "Piso"
icon = "grid"

[[categories.items]]
id = "carpet"
name = "Carpete"
unit_price = "250.50"
unit_cost = "120.00"
"#,
        )
        .expect("catalog");

        let item = catalog.find(&ItemId::from("carpet")).expect("carpet");
        assert_eq!(item.unit_price, Decimal::new(25_050, 2));
        assert_eq!(item.unit_cost, Some(Decimal::new(12_000, 2)));
        assert_eq!(item.category_id.0, "floor");
    }

    #[test]
    fn rejects_duplicate_item_ids_across_categories() {
        let error = Catalog::from_toml_str(
            r#"
[[categories]]
id = "a"
display_name = "A"
[[categories.items]]
id = "dup"
name = "One"
unit_price = "1.00"

[[categories]]
id = "b"
display_name = "B"
[[categories.items]]
id = "dup"
name = "Two"
unit_price = "2.00"
"#,
        )
        .expect_err("duplicate should fail");

        assert!(matches!(error, CatalogError::DuplicateItem(ref id) if id.0 == "dup"));
    }

    #[test]
    fn rejects_cost_above_price() {
        let error = Catalog::from_toml_str(
            r#"
[[categories]]
id = "a"
display_name = "A"
[[categories.items]]
id = "lamp"
name = "Spot"
unit_price = "10.00"
unit_cost = "12.00"
"#,
        )
        .expect_err("cost above price should fail");

        assert!(matches!(error, CatalogError::InvalidPrice { .. }));
    }

    #[test]
    fn rejects_sub_cent_prices() {
        let error = Catalog::from_toml_str(
            r#"
[[categories]]
id = "a"
display_name = "A"
[[categories.items]]
id = "lamp"
name = "Spot"
unit_price = "10.005"
"#,
        )
        .expect_err("three decimal places should fail");

        assert!(matches!(error, CatalogError::InvalidPrice { .. }));
    }

    #[test]
    fn rejects_prices_above_the_cap() {
        let error = Catalog::from_toml_str(
            r#"
[[categories]]
id = "a"
display_name = "A"
[[categories.items]]
id = "lamp"
name = "Spot"
unit_price = "79228162514264337593543950335"
"#,
        )
        .expect_err("oversized price should fail");

        assert!(matches!(error, CatalogError::InvalidPrice { .. }));
    }
}
