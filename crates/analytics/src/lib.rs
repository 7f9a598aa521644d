//! Read side of the order capture service.
//!
//! This crate answers the dashboard queries:
//! - [`AnalyticsService::top_products`] ranking products by units or revenue
//! - [`AnalyticsService::daily_series`] charting the leaders day by day
//! - [`AnalyticsService::summary`] totalling a window
//!
//! Every query runs over a trailing [`Window`] of days.

pub mod error;
pub mod series;
pub mod service;
pub mod window;

pub use error::{AnalyticsError, Result};
pub use series::{ProductSeries, SalesSeries};
pub use service::{AnalyticsService, DEFAULT_SERIES_TOP, DEFAULT_TOP_LIMIT};
pub use window::Window;
