//! Analytics service answering the dashboard queries.

use store::{Metric, ProductSales, SalesQuery, SalesSummary, Store};

use crate::Result;
use crate::series::SalesSeries;
use crate::window::Window;

/// Rows returned by [`AnalyticsService::top_products`] when no limit is given.
pub const DEFAULT_TOP_LIMIT: usize = 6;
const MAX_TOP_LIMIT: usize = 100;

/// Products charted by [`AnalyticsService::daily_series`] when no count is given.
pub const DEFAULT_SERIES_TOP: usize = 5;
const MAX_SERIES_TOP: usize = 50;

/// Read-only queries over the order store.
///
/// Each query is a single aggregation, so it may run concurrently with
/// ingestion and sees either the state before or after any given order.
pub struct AnalyticsService<S: Store> {
    store: S,
}

impl<S: Store> AnalyticsService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Ranks products sold in the window by `metric`, descending.
    ///
    /// Ties are broken by ascending title. `limit` is clamped to `1..=100`.
    #[tracing::instrument(skip(self))]
    pub async fn top_products(
        &self,
        window: Window,
        metric: Metric,
        limit: usize,
    ) -> Result<Vec<ProductSales>> {
        metrics::counter!("analytics_queries_total", "query" => "top").increment(1);

        let query = SalesQuery::since(window.start())
            .metric(metric)
            .limit(limit.clamp(1, MAX_TOP_LIMIT));
        Ok(self.store.top_products(&query).await?)
    }

    /// Charts the `top` leading products of the window day by day.
    ///
    /// `top` is clamped to `1..=50`.
    #[tracing::instrument(skip(self))]
    pub async fn daily_series(
        &self,
        window: Window,
        metric: Metric,
        top: usize,
    ) -> Result<SalesSeries> {
        metrics::counter!("analytics_queries_total", "query" => "series").increment(1);

        let since = window.start();
        let leaders = self
            .store
            .top_products(
                &SalesQuery::since(since)
                    .metric(metric)
                    .limit(top.clamp(1, MAX_SERIES_TOP)),
            )
            .await?;
        if leaders.is_empty() {
            return Ok(SalesSeries::default());
        }

        let titles = leaders.iter().map(|p| p.title.clone()).collect();
        let rows = self
            .store
            .daily_sales(&SalesQuery::since(since).metric(metric).titles(titles))
            .await?;

        let series = SalesSeries::pivot(&leaders, &rows, metric);
        tracing::debug!(
            days = series.labels.len(),
            products = series.series.len(),
            "sales series built"
        );
        Ok(series)
    }

    /// Totals orders, units and revenue in the window.
    #[tracing::instrument(skip(self))]
    pub async fn summary(&self, window: Window) -> Result<SalesSummary> {
        metrics::counter!("analytics_queries_total", "query" => "summary").increment(1);
        Ok(self.store.summary(window.start()).await?)
    }
}
