use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::quote::SelectedItem;

/// Currency minor-unit precision.
pub const MONEY_SCALE: u32 = 2;

/// Largest accepted unit price or cost. Keeps quantity products far from the
/// `Decimal` range.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSummary {
    pub total: Decimal,
    /// Revenue from items whose internal cost is known.
    pub costed_revenue: Decimal,
    pub cost_total: Decimal,
}

impl PricingSummary {
    /// Gross margin over costed items as a percentage, `None` when no item carries a cost.
    pub fn margin_pct(&self) -> Option<Decimal> {
        margin_pct(self.costed_revenue, self.cost_total)
    }
}

/// Checks a unit price and optional cost against the money rules shared by
/// the catalog and stored quotes.
pub fn check_unit_amounts(
    unit_price: Decimal,
    unit_cost: Option<Decimal>,
) -> Result<(), &'static str> {
    if unit_price.is_sign_negative() {
        return Err("unit_price must not be negative");
    }
    if unit_price > MAX_UNIT_PRICE {
        return Err("unit_price exceeds the maximum unit price");
    }
    if unit_price.normalize().scale() > MONEY_SCALE {
        return Err("unit_price has more than two decimal places");
    }
    if let Some(cost) = unit_cost {
        if cost.is_sign_negative() {
            return Err("unit_cost must not be negative");
        }
        if cost.normalize().scale() > MONEY_SCALE {
            return Err("unit_cost has more than two decimal places");
        }
        if cost > unit_price {
            return Err("unit_cost must not exceed unit_price");
        }
    }
    Ok(())
}

/// Saturates at the `Decimal` bounds instead of panicking.
pub fn line_total(unit_price: &Decimal, quantity: u32) -> Decimal {
    unit_price.saturating_mul(Decimal::from(quantity))
}

pub fn items_total(items: &[SelectedItem]) -> Decimal {
    sum_money(items.iter().map(SelectedItem::line_total))
}

/// Saturating sum of money values.
pub fn sum_money(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values.into_iter().fold(Decimal::ZERO, |total, value| total.saturating_add(value))
}

pub fn summarize(items: &[SelectedItem]) -> PricingSummary {
    items.iter().fold(PricingSummary::default(), |mut summary, selected| {
        let revenue = selected.line_total();
        summary.total = summary.total.saturating_add(revenue);
        if let Some(cost) = selected.item.unit_cost {
            summary.costed_revenue = summary.costed_revenue.saturating_add(revenue);
            summary.cost_total =
                summary.cost_total.saturating_add(line_total(&cost, selected.quantity));
        }
        summary
    })
}

/// `None` for zero revenue or when the ratio leaves the `Decimal` range.
pub fn margin_pct(revenue: Decimal, cost: Decimal) -> Option<Decimal> {
    if revenue.is_zero() {
        return None;
    }
    let ratio = revenue.checked_sub(cost)?.checked_div(revenue)?;
    ratio.checked_mul(Decimal::ONE_HUNDRED).map(round_money)
}

/// Display rounding: half away from zero at two places.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
