//! Day-by-day sales series for charting.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use store::{DailySales, Metric, ProductSales};

/// One product's values, aligned with [`SalesSeries::labels`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSeries {
    pub title: String,
    pub data: Vec<Decimal>,
}

impl ProductSeries {
    /// Returns the sum of every value in the series.
    pub fn total(&self) -> Decimal {
        self.data.iter().copied().sum()
    }
}

/// Sales of the leading products per calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesSeries {
    /// Distinct days with at least one sale, ascending.
    pub labels: Vec<NaiveDate>,
    /// One entry per leading product, in ranking order.
    pub series: Vec<ProductSeries>,
}

impl SalesSeries {
    /// Pivots per-day rows into aligned, zero-filled columns.
    ///
    /// `leaders` fixes which titles appear and in what order. Rows for other
    /// titles are ignored and do not contribute labels.
    pub fn pivot(leaders: &[ProductSales], rows: &[DailySales], metric: Metric) -> Self {
        let positions: HashMap<&str, usize> = leaders
            .iter()
            .enumerate()
            .map(|(i, p)| (p.title.as_str(), i))
            .collect();

        let labels: Vec<NaiveDate> = rows
            .iter()
            .filter(|r| positions.contains_key(r.title.as_str()))
            .map(|r| r.day)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let columns: HashMap<NaiveDate, usize> =
            labels.iter().enumerate().map(|(i, day)| (*day, i)).collect();

        let mut series: Vec<ProductSeries> = leaders
            .iter()
            .map(|p| ProductSeries {
                title: p.title.clone(),
                data: vec![Decimal::ZERO; labels.len()],
            })
            .collect();

        for row in rows {
            let (Some(&product), Some(&column)) =
                (positions.get(row.title.as_str()), columns.get(&row.day))
            else {
                continue;
            };
            series[product].data[column] += row.value(metric);
        }

        Self { labels, series }
    }

    /// Returns true if there is nothing to chart.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn leader(title: &str, quantity: i64) -> ProductSales {
        ProductSales {
            title: title.to_string(),
            quantity,
            revenue: Decimal::from(quantity * 10),
        }
    }

    fn row(d: u32, title: &str, quantity: i64) -> DailySales {
        DailySales {
            day: day(d),
            title: title.to_string(),
            quantity,
            revenue: Decimal::from(quantity * 10),
        }
    }

    #[test]
    fn zero_fills_missing_days() {
        let leaders = vec![leader("A", 5), leader("B", 1)];
        let rows = vec![row(1, "A", 2), row(2, "B", 1), row(3, "A", 3)];

        let series = SalesSeries::pivot(&leaders, &rows, Metric::Quantity);

        assert_eq!(series.labels, vec![day(1), day(2), day(3)]);
        assert_eq!(series.series[0].title, "A");
        assert_eq!(
            series.series[0].data,
            vec![Decimal::from(2), Decimal::ZERO, Decimal::from(3)]
        );
        assert_eq!(
            series.series[1].data,
            vec![Decimal::ZERO, Decimal::ONE, Decimal::ZERO]
        );
    }

    #[test]
    fn keeps_leader_order_and_ignores_other_titles() {
        let leaders = vec![leader("B", 9), leader("A", 4)];
        let rows = vec![row(1, "A", 4), row(2, "C", 7), row(3, "B", 9)];

        let series = SalesSeries::pivot(&leaders, &rows, Metric::Revenue);

        let titles: Vec<_> = series.series.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["B", "A"]);
        assert_eq!(series.labels, vec![day(1), day(3)]);
        assert_eq!(series.series[0].total(), Decimal::from(90));
        assert_eq!(series.series[1].total(), Decimal::from(40));
    }

    #[test]
    fn no_leaders_gives_empty_series() {
        let series = SalesSeries::pivot(&[], &[row(1, "A", 1)], Metric::Quantity);
        assert!(series.is_empty());
        assert!(series.labels.is_empty());
    }
}
