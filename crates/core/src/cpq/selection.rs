use rust_decimal::Decimal;

use crate::cpq::catalog::Catalog;
use crate::cpq::pricing::{self, PricingSummary};
use crate::domain::catalog::ItemId;
use crate::domain::quote::SelectedItem;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    Selected,
    Deselected,
}

/// The client's in-progress pick list, in the order items were chosen.
///
/// Holds at most one entry per item id and never an entry with quantity zero.
#[derive(Clone, Debug)]
pub struct Selection<'c> {
    catalog: &'c Catalog,
    items: Vec<SelectedItem>,
}

impl<'c> Selection<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog, items: Vec::new() }
    }

    pub fn toggle(&mut self, item_id: &ItemId) -> Result<ToggleOutcome, DomainError> {
        let item = self
            .catalog
            .find(item_id)
            .ok_or_else(|| DomainError::UnknownItem { item_id: item_id.clone() })?;

        if let Some(position) = self.position(item_id) {
            self.items.remove(position);
            return Ok(ToggleOutcome::Deselected);
        }

        self.items.push(SelectedItem::new(item.clone(), 1));
        Ok(ToggleOutcome::Selected)
    }

    /// Clamps to a minimum of one. Returns `false` when the item is not selected.
    pub fn set_quantity(&mut self, item_id: &ItemId, requested: i64) -> bool {
        let Some(position) = self.position(item_id) else {
            return false;
        };

        let quantity = u32::try_from(requested.max(1)).unwrap_or(u32::MAX);
        self.items[position].quantity = quantity;
        true
    }

    pub fn total(&self) -> Decimal {
        pricing::items_total(&self.items)
    }

    pub fn pricing(&self) -> PricingSummary {
        pricing::summarize(&self.items)
    }

    pub fn items(&self) -> &[SelectedItem] {
        &self.items
    }

    pub fn quantity_of(&self, item_id: &ItemId) -> Option<u32> {
        self.position(item_id).map(|position| self.items[position].quantity)
    }

    pub fn is_selected(&self, item_id: &ItemId) -> bool {
        self.position(item_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn into_items(self) -> Vec<SelectedItem> {
        self.items
    }

    fn position(&self, item_id: &ItemId) -> Option<usize> {
        self.items.iter().position(|selected| selected.id() == item_id)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::cpq::catalog::Catalog;
    use crate::domain::catalog::{CatalogItem, Category, CategoryId, ItemId};
    use crate::errors::DomainError;

    use super::{Selection, ToggleOutcome};

    fn catalog() -> Catalog {
        let category = CategoryId("stand".to_string());
        let item = |id: &str, price: Decimal| CatalogItem {
            id: ItemId(id.to_string()),
            name: format!("Item {id}"),
            unit_price: price,
            unit_cost: None,
            category_id: category.clone(),
        };

        Catalog::new(vec![Category {
            id: category.clone(),
            display_name: "Stand".to_string(),
            icon: "frame".to_string(),
            items: vec![
                item("A", Decimal::new(10_000, 2)),
                item("B", Decimal::new(25_050, 2)),
                item("C", Decimal::new(1, 1)),
            ],
        }])
        .expect("catalog")
    }

    #[test]
    fn scenario_total_matches_hand_computed_value() {
        let catalog = catalog();
        let mut selection = Selection::new(&catalog);
        let a = ItemId::from("A");
        let b = ItemId::from("B");

        selection.toggle(&a).expect("select A");
        selection.toggle(&b).expect("select B");
        assert!(selection.set_quantity(&b, 2));
        assert_eq!(selection.total(), Decimal::new(60_100, 2));

        assert_eq!(selection.toggle(&a).expect("deselect A"), ToggleOutcome::Deselected);
        assert_eq!(selection.toggle(&a).expect("reselect A"), ToggleOutcome::Selected);
        assert_eq!(selection.quantity_of(&a), Some(1));
        assert_eq!(selection.total(), Decimal::new(60_100, 2));
    }

    #[test]
    fn deselect_then_reselect_resets_quantity_to_one() {
        let catalog = catalog();
        let mut selection = Selection::new(&catalog);
        let b = ItemId::from("B");

        selection.toggle(&b).expect("select");
        selection.set_quantity(&b, 7);
        selection.toggle(&b).expect("deselect");
        selection.toggle(&b).expect("reselect");

        assert_eq!(selection.quantity_of(&b), Some(1));
        assert_eq!(selection.total(), Decimal::new(25_050, 2));
    }

    #[test]
    fn toggle_twice_restores_prior_state() {
        let catalog = catalog();
        let mut selection = Selection::new(&catalog);
        selection.toggle(&ItemId::from("A")).expect("select A");
        let before = selection.items().to_vec();

        selection.toggle(&ItemId::from("C")).expect("select C");
        selection.toggle(&ItemId::from("C")).expect("deselect C");

        assert_eq!(selection.items(), before.as_slice());
    }

    #[test]
    fn non_positive_quantities_clamp_to_one() {
        let catalog = catalog();
        let mut selection = Selection::new(&catalog);
        let a = ItemId::from("A");
        selection.toggle(&a).expect("select");

        for requested in [0, -1, -500, i64::MIN] {
            selection.set_quantity(&a, 3);
            assert!(selection.set_quantity(&a, requested));
            assert_eq!(selection.quantity_of(&a), Some(1), "requested {requested}");
        }
    }

    #[test]
    fn set_quantity_ignores_unselected_items() {
        let catalog = catalog();
        let mut selection = Selection::new(&catalog);

        assert!(!selection.set_quantity(&ItemId::from("A"), 4));
        assert!(selection.is_empty());
    }

    #[test]
    fn unknown_items_are_rejected() {
        let catalog = catalog();
        let mut selection = Selection::new(&catalog);

        let error = selection.toggle(&ItemId::from("Z")).expect_err("unknown item");
        assert_eq!(error, DomainError::UnknownItem { item_id: ItemId::from("Z") });
    }

    #[test]
    fn empty_selection_totals_zero() {
        let catalog = catalog();
        assert_eq!(Selection::new(&catalog).total(), Decimal::ZERO);
    }

    #[test]
    fn repeated_small_prices_do_not_drift() {
        let catalog = catalog();
        let mut selection = Selection::new(&catalog);
        let c = ItemId::from("C");
        selection.toggle(&c).expect("select");
        selection.set_quantity(&c, 3);

        assert_eq!(selection.total(), Decimal::new(3, 1));
    }

    #[test]
    fn selection_order_is_pick_order() {
        let catalog = catalog();
        let mut selection = Selection::new(&catalog);
        for id in ["C", "A", "B"] {
            selection.toggle(&ItemId::from(id)).expect("select");
        }

        let order: Vec<_> = selection.items().iter().map(|item| item.id().0.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }
}
