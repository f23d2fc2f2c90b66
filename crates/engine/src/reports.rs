//! Report assembly.
//!
//! The assemblers are pure: they take already merged partial aggregates and
//! shape them into the rows returned to clients.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    BudgetLimit, CategoryAmount, CategorySpend, MoneyCents, MonthFlow, Period, Totals,
    aggregation::merge_month_flows,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SummaryReport {
    /// First day of the window.
    pub from: NaiveDate,
    /// Last day of the window (inclusive).
    pub to: NaiveDate,
    pub totals: Totals,
    pub by_category: Vec<CategoryAmount>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CashflowMonth {
    /// `YYYY-MM`
    pub month: String,
    pub income: MoneyCents,
    pub expenses: MoneyCents,
    pub net: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CashflowReport {
    pub year: i32,
    /// Always twelve rows, January first.
    pub months: Vec<CashflowMonth>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BudgetRow {
    pub category_id: Uuid,
    pub category: String,
    pub limit: MoneyCents,
    pub spent: MoneyCents,
    pub remaining: MoneyCents,
    pub over: MoneyCents,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BudgetTotals {
    pub limit: MoneyCents,
    pub spent: MoneyCents,
    pub remaining: MoneyCents,
    pub over: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BudgetReport {
    /// First day of the reported month.
    pub month: NaiveDate,
    pub items: Vec<BudgetRow>,
    pub totals: BudgetTotals,
}

impl BudgetReport {
    /// `YYYY-MM`
    pub fn month_label(&self) -> String {
        self.month.format("%Y-%m").to_string()
    }
}

pub fn assemble_summary(
    period: Period,
    totals: Totals,
    by_category: Vec<CategoryAmount>,
) -> SummaryReport {
    SummaryReport {
        from: period.start(),
        to: period.last_day().unwrap_or(period.start()),
        totals,
        by_category,
    }
}

/// Twelve zeroed months overlaid with the flows that had activity.
///
/// Flows whose month lies outside `1..=12` are dropped.
pub fn assemble_cashflow(year: i32, flows: impl IntoIterator<Item = MonthFlow>) -> CashflowReport {
    let mut months: Vec<CashflowMonth> = (1..=12)
        .map(|month| CashflowMonth {
            month: format!("{year:04}-{month:02}"),
            income: MoneyCents::ZERO,
            expenses: MoneyCents::ZERO,
            net: MoneyCents::ZERO,
        })
        .collect();

    for flow in merge_month_flows(flows).into_values() {
        let Some(slot) = (flow.month as usize)
            .checked_sub(1)
            .and_then(|idx| months.get_mut(idx))
        else {
            continue;
        };
        slot.income = flow.income;
        slot.expenses = flow.expenses;
        slot.net = flow.net();
    }

    CashflowReport { year, months }
}

/// Joins limits and spend on category id.
///
/// A category present on only one side gets zero for the other. The name
/// comes from the budget side when there is one. `remaining` and `over` are
/// clamped per row and the totals sum the clamped values, so a deficit in one
/// category is never hidden by slack in another.
pub fn assemble_budget(
    month: NaiveDate,
    limits: Vec<BudgetLimit>,
    spend: Vec<CategorySpend>,
) -> BudgetReport {
    let mut rows: HashMap<Uuid, BudgetRow> = HashMap::new();

    for limit in limits {
        rows.entry(limit.category_id)
            .and_modify(|row| row.limit += limit.limit)
            .or_insert(BudgetRow {
                category_id: limit.category_id,
                category: limit.category_name,
                limit: limit.limit,
                spent: MoneyCents::ZERO,
                remaining: MoneyCents::ZERO,
                over: MoneyCents::ZERO,
            });
    }
    for spend in spend {
        rows.entry(spend.category_id)
            .and_modify(|row| row.spent += spend.spent)
            .or_insert(BudgetRow {
                category_id: spend.category_id,
                category: spend.category_name,
                limit: MoneyCents::ZERO,
                spent: spend.spent,
                remaining: MoneyCents::ZERO,
                over: MoneyCents::ZERO,
            });
    }

    let mut items: Vec<BudgetRow> = rows.into_values().collect();
    items.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.category_id.cmp(&b.category_id))
    });

    let mut totals = BudgetTotals::default();
    for row in &mut items {
        row.remaining = (row.limit - row.spent).non_negative();
        row.over = (row.spent - row.limit).non_negative();

        totals.limit += row.limit;
        totals.spent += row.spent;
        totals.remaining += row.remaining;
        totals.over += row.over;
    }

    BudgetReport {
        month,
        items,
        totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(id: Uuid, name: &str, cents: i64) -> BudgetLimit {
        BudgetLimit {
            category_id: id,
            category_name: name.to_string(),
            limit: MoneyCents::new(cents),
        }
    }

    fn spend(id: Uuid, name: &str, cents: i64) -> CategorySpend {
        CategorySpend {
            category_id: id,
            category_name: name.to_string(),
            spent: MoneyCents::new(cents),
        }
    }

    fn march() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn cashflow_has_twelve_ordered_months() {
        let report = assemble_cashflow(
            2024,
            vec![MonthFlow {
                month: 3,
                income: MoneyCents::new(500),
                expenses: MoneyCents::ZERO,
            }],
        );

        assert_eq!(report.months.len(), 12);
        let labels: Vec<&str> = report.months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(labels[0], "2024-01");
        assert_eq!(labels[11], "2024-12");
        assert!(labels.windows(2).all(|w| w[0] < w[1]));

        assert_eq!(
            report.months[2],
            CashflowMonth {
                month: "2024-03".to_string(),
                income: MoneyCents::new(500),
                expenses: MoneyCents::ZERO,
                net: MoneyCents::new(500),
            }
        );
        for (idx, month) in report.months.iter().enumerate() {
            if idx != 2 {
                assert_eq!(month.income, MoneyCents::ZERO);
                assert_eq!(month.expenses, MoneyCents::ZERO);
                assert_eq!(month.net, MoneyCents::ZERO);
            }
        }
    }

    #[test]
    fn cashflow_ignores_input_order_and_bad_months() {
        let flow = |month, income| MonthFlow {
            month,
            income: MoneyCents::new(income),
            expenses: MoneyCents::new(-10),
        };
        let report = assemble_cashflow(1999, vec![flow(12, 7), flow(0, 1), flow(13, 1), flow(1, 3)]);
        assert_eq!(report.months.len(), 12);
        assert_eq!(report.months[0].net, MoneyCents::new(-7));
        assert_eq!(report.months[11].net, MoneyCents::new(-3));
        assert_eq!(report.months[0].month, "1999-01");
    }

    #[test]
    fn budget_joins_both_sides() {
        let food = Uuid::new_v4();
        let rent = Uuid::new_v4();
        let fun = Uuid::new_v4();
        let report = assemble_budget(
            march(),
            vec![limit(food, "Food", 10_000), limit(rent, "Rent", 50_000)],
            vec![spend(food, "food", 12_500), spend(fun, "Fun", 2_000)],
        );

        let rows: Vec<(&str, i64, i64, i64, i64)> = report
            .items
            .iter()
            .map(|r| {
                (
                    r.category.as_str(),
                    r.limit.cents(),
                    r.spent.cents(),
                    r.remaining.cents(),
                    r.over.cents(),
                )
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Food", 10_000, 12_500, 0, 2_500),
                ("Fun", 0, 2_000, 0, 2_000),
                ("Rent", 50_000, 0, 50_000, 0),
            ]
        );
        assert_eq!(report.month_label(), "2024-03");
    }

    #[test]
    fn budget_totals_sum_clamped_rows() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let report = assemble_budget(
            march(),
            vec![limit(a, "A", 100), limit(b, "B", 100)],
            vec![spend(a, "A", 300), spend(b, "B", 20)],
        );
        assert_eq!(report.totals.limit, MoneyCents::new(200));
        assert_eq!(report.totals.spent, MoneyCents::new(320));
        // Not max(0, 200 - 320): B's slack does not hide A's deficit.
        assert_eq!(report.totals.remaining, MoneyCents::new(80));
        assert_eq!(report.totals.over, MoneyCents::new(200));
    }

    #[test]
    fn budget_rows_obey_clamp_law() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let report = assemble_budget(
            march(),
            vec![
                limit(ids[0], "a", 100),
                limit(ids[1], "b", 100),
                limit(ids[2], "c", 0),
            ],
            vec![
                spend(ids[0], "a", 100),
                spend(ids[1], "b", 150),
                spend(ids[2], "c", 0),
                spend(ids[3], "d", 40),
            ],
        );
        for row in &report.items {
            assert!(row.remaining >= MoneyCents::ZERO);
            assert!(row.over >= MoneyCents::ZERO);
            assert_eq!(row.remaining.min(row.over), MoneyCents::ZERO);
        }
    }

    #[test]
    fn budget_with_no_data_is_empty() {
        let report = assemble_budget(march(), vec![], vec![]);
        assert!(report.items.is_empty());
        assert_eq!(report.totals, BudgetTotals::default());
    }
}
