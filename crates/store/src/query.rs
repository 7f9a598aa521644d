use chrono::{DateTime, Utc};

use crate::Metric;

/// Builder for sales aggregation queries.
///
/// Every query is scoped to orders created at or after `since`; the other
/// fields narrow or order the result.
#[derive(Debug, Clone)]
pub struct SalesQuery {
    /// Inclusive lower bound on the order creation time.
    pub since: DateTime<Utc>,

    /// Metric used for ranking.
    pub metric: Metric,

    /// Maximum number of rows to return.
    pub limit: Option<usize>,

    /// Restrict the aggregation to these exact product titles.
    pub titles: Option<Vec<String>>,
}

impl SalesQuery {
    /// Creates a query over every order created at or after `since`.
    pub fn since(since: DateTime<Utc>) -> Self {
        Self {
            since,
            metric: Metric::default(),
            limit: None,
            titles: None,
        }
    }

    /// Ranks by the given metric.
    pub fn metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Limits the number of rows returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Restricts the query to a set of titles.
    pub fn titles(mut self, titles: Vec<String>) -> Self {
        self.titles = Some(titles);
        self
    }

    /// Returns true if the title filter is present and matches nothing.
    pub fn matches_nothing(&self) -> bool {
        self.titles.as_ref().is_some_and(Vec::is_empty)
    }

    /// Returns true if the given title passes the title filter.
    pub fn includes_title(&self, title: &str) -> bool {
        self.titles
            .as_ref()
            .is_none_or(|titles| titles.iter().any(|t| t == title))
    }
}
