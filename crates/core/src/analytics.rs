//! Read-side aggregation over a snapshot of quotes.
//!
//! Every function here is pure: the same slice yields the same output, and
//! the only time source is each quote's own `created_at`.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::Datelike;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};

use crate::cpq::pricing::{self, round_money};
use crate::domain::catalog::ItemId;
use crate::domain::quote::{Quote, QuoteId, QuoteStage, QuoteStatus};

const MONTH_ABBREVIATIONS: [&str; 12] =
    ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub hot: usize,
    pub warm: usize,
    pub cold: usize,
}

impl StatusCounts {
    pub fn get(&self, status: QuoteStatus) -> usize {
        match status {
            QuoteStatus::Hot => self.hot,
            QuoteStatus::Warm => self.warm,
            QuoteStatus::Cold => self.cold,
        }
    }

    pub fn total(&self) -> usize {
        self.hot + self.warm + self.cold
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusShare {
    pub status: QuoteStatus,
    pub label: &'static str,
    pub count: usize,
    /// Percentage of all quotes, one decimal place.
    pub percent: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CityCount {
    pub city: String,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemCount {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u64,
}

/// Calendar month of a quote's creation; orders chronologically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
}

impl MonthBucket {
    pub fn of(quote: &Quote) -> Self {
        Self { year: quote.created_at.year(), month: quote.created_at.month() }
    }
}

impl fmt::Display for MonthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index = self.month.saturating_sub(1) as usize;
        let name = MONTH_ABBREVIATIONS.get(index).copied().unwrap_or("???");
        write!(f, "{}-{}", self.year, name)
    }
}

impl Serialize for MonthBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuoteCard {
    pub id: QuoteId,
    pub client_name: String,
    pub event_name: String,
    pub status: QuoteStatus,
    pub total: Decimal,
}

impl From<&Quote> for QuoteCard {
    fn from(quote: &Quote) -> Self {
        Self {
            id: quote.id.clone(),
            client_name: quote.client.full_name(),
            event_name: quote.client.event_name.clone(),
            status: quote.status,
            total: quote.total,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PipelineColumn {
    pub stage: QuoteStage,
    pub label: &'static str,
    pub cards: Vec<QuoteCard>,
    pub total_value: Decimal,
}

/// Kanban view: one column per stage, in pipeline order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PipelineBoard {
    pub columns: Vec<PipelineColumn>,
}

impl PipelineBoard {
    pub fn column(&self, stage: QuoteStage) -> Option<&PipelineColumn> {
        self.columns.iter().find(|column| column.stage == stage)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnalyticsSummary {
    pub quote_count: usize,
    pub total_value: Decimal,
    pub average_value: Decimal,
    pub status_counts: StatusCounts,
    pub status_shares: Vec<StatusShare>,
    pub stage_counts: BTreeMap<QuoteStage, usize>,
    pub conversion_rate: Decimal,
    pub margin_pct: Option<Decimal>,
    pub top_cities: Vec<CityCount>,
    pub top_items: Vec<ItemCount>,
    pub monthly_counts: BTreeMap<MonthBucket, usize>,
    pub recent: Vec<QuoteCard>,
}

pub fn count_by_status(quotes: &[Quote]) -> StatusCounts {
    quotes.iter().fold(StatusCounts::default(), |mut counts, quote| {
        match quote.status {
            QuoteStatus::Hot => counts.hot += 1,
            QuoteStatus::Warm => counts.warm += 1,
            QuoteStatus::Cold => counts.cold += 1,
        }
        counts
    })
}

/// Per-status counts with their share of the whole; all zero when empty.
pub fn status_shares(quotes: &[Quote]) -> Vec<StatusShare> {
    let counts = count_by_status(quotes);
    [QuoteStatus::Hot, QuoteStatus::Warm, QuoteStatus::Cold]
        .into_iter()
        .map(|status| {
            let count = counts.get(status);
            StatusShare {
                status,
                label: status.label(),
                count,
                percent: percent(count, counts.total()),
            }
        })
        .collect()
}

pub fn count_by_stage(quotes: &[Quote]) -> BTreeMap<QuoteStage, usize> {
    let mut counts: BTreeMap<_, _> = QuoteStage::ALL.into_iter().map(|stage| (stage, 0)).collect();
    for quote in quotes {
        *counts.entry(quote.stage).or_insert(0) += 1;
    }
    counts
}

/// Count descending, then city name ascending. Blank cities are skipped.
pub fn top_cities(quotes: &[Quote], n: usize) -> Vec<CityCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for quote in quotes {
        let city = quote.client.city.trim();
        if !city.is_empty() {
            *counts.entry(city).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|(city_a, count_a), (city_b, count_b)| {
        count_b.cmp(count_a).then_with(|| city_a.cmp(city_b))
    });
    ranked
        .into_iter()
        .take(n)
        .map(|(city, count)| CityCount { city: city.to_string(), count })
        .collect()
}

pub fn monthly_counts(quotes: &[Quote]) -> BTreeMap<MonthBucket, usize> {
    let mut counts = BTreeMap::new();
    for quote in quotes {
        *counts.entry(MonthBucket::of(quote)).or_insert(0) += 1;
    }
    counts
}

/// Saturates at the `Decimal` bounds.
pub fn total_value(quotes: &[Quote]) -> Decimal {
    pricing::sum_money(quotes.iter().map(|quote| quote.total))
}

/// Mean quote total rounded to cents; zero for an empty collection.
pub fn average_value(quotes: &[Quote]) -> Decimal {
    if quotes.is_empty() {
        return Decimal::ZERO;
    }
    round_money(total_value(quotes) / Decimal::from(quotes.len()))
}

/// Share of quotes in the closed stage, as a percentage.
pub fn conversion_rate(quotes: &[Quote]) -> Decimal {
    let closed = quotes.iter().filter(|quote| quote.stage == QuoteStage::Closed).count();
    percent(closed, quotes.len())
}

/// Gross margin over every item with a known cost.
pub fn margin_pct(quotes: &[Quote]) -> Option<Decimal> {
    let (revenue, cost) = quotes.iter().fold((Decimal::ZERO, Decimal::ZERO), |acc, quote| {
        let summary = pricing::summarize(&quote.items);
        (acc.0.saturating_add(summary.costed_revenue), acc.1.saturating_add(summary.cost_total))
    });
    pricing::margin_pct(revenue, cost)
}

/// Most requested items by total quantity, ties by name.
pub fn top_items(quotes: &[Quote], n: usize) -> Vec<ItemCount> {
    let mut totals: HashMap<&ItemId, (&str, u64)> = HashMap::new();
    for selected in quotes.iter().flat_map(|quote| quote.items.iter()) {
        let entry = totals.entry(selected.id()).or_insert((selected.item.name.as_str(), 0));
        entry.1 += u64::from(selected.quantity);
    }

    let mut ranked: Vec<_> = totals.into_iter().collect();
    ranked.sort_by(|(id_a, (name_a, qty_a)), (id_b, (name_b, qty_b))| {
        qty_b.cmp(qty_a).then_with(|| name_a.cmp(name_b)).then_with(|| id_a.0.cmp(&id_b.0))
    });
    ranked
        .into_iter()
        .take(n)
        .map(|(item_id, (name, quantity))| ItemCount {
            item_id: item_id.clone(),
            name: name.to_string(),
            quantity,
        })
        .collect()
}

/// Newest first; equal timestamps fall back to id, newest id first.
pub fn recent(quotes: &[Quote], n: usize) -> Vec<&Quote> {
    let mut sorted: Vec<_> = quotes.iter().collect();
    sorted.sort_by_key(|quote| Reverse((quote.created_at, quote.id.clone())));
    sorted.truncate(n);
    sorted
}

/// Buckets each quote by its stored `stage`. Card order follows the input.
pub fn pipeline_board(quotes: &[Quote]) -> PipelineBoard {
    let columns = QuoteStage::ALL
        .into_iter()
        .map(|stage| {
            let in_stage: Vec<_> = quotes.iter().filter(|quote| quote.stage == stage).collect();
            PipelineColumn {
                stage,
                label: stage.label(),
                total_value: pricing::sum_money(in_stage.iter().map(|quote| quote.total)),
                cards: in_stage.into_iter().map(QuoteCard::from).collect(),
            }
        })
        .collect();
    PipelineBoard { columns }
}

pub fn summarize(quotes: &[Quote], top_n: usize) -> AnalyticsSummary {
    AnalyticsSummary {
        quote_count: quotes.len(),
        total_value: total_value(quotes),
        average_value: average_value(quotes),
        status_counts: count_by_status(quotes),
        status_shares: status_shares(quotes),
        stage_counts: count_by_stage(quotes),
        conversion_rate: conversion_rate(quotes),
        margin_pct: margin_pct(quotes),
        top_cities: top_cities(quotes, top_n),
        top_items: top_items(quotes, top_n),
        monthly_counts: monthly_counts(quotes),
        recent: recent(quotes, top_n).into_iter().map(QuoteCard::from).collect(),
    }
}

fn percent(part: usize, whole: usize) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}
