//! Integration tests: orders written to the store → analytics queries.

use analytics::{AnalyticsService, DEFAULT_SERIES_TOP, DEFAULT_TOP_LIMIT, Window};
use chrono::{Duration, Utc};
use common::ProductId;
use rust_decimal::Decimal;
use store::{InMemoryStore, Metric, NewOrder, NewOrderLine, NewProduct, Store};

/// Helper to set up a store with a small catalog.
///
/// Returns (store, service, [leggings, top, jogger]).
async fn setup() -> (InMemoryStore, AnalyticsService<InMemoryStore>, Vec<ProductId>) {
    let store = InMemoryStore::new();
    let mut ids = Vec::new();
    for (title, price) in [
        ("Leggings Pro", 120_000),
        ("Top Compresión", 90_000),
        ("Jogger Fit", 135_000),
    ] {
        let product = store
            .create_product(NewProduct::new(title, Decimal::from(price)))
            .await
            .unwrap();
        ids.push(product.id);
    }
    (store.clone(), AnalyticsService::new(store), ids)
}

/// Writes one order with the given (product, quantity, unit price) lines.
async fn place(store: &InMemoryStore, days_ago: i64, lines: &[(ProductId, u32, i64)]) {
    let created_at = Utc::now() - Duration::days(days_ago) - Duration::minutes(1);
    let mut tx = store.begin().await.unwrap();
    let order = tx
        .insert_order(NewOrder {
            customer_name: "Ana".to_string(),
            customer_email: "ana@mail.com".to_string(),
            created_at,
        })
        .await
        .unwrap();
    for &(product_id, quantity, price) in lines {
        tx.insert_order_line(NewOrderLine {
            order_id: order.id,
            product_id,
            quantity,
            unit_price: Decimal::from(price),
        })
        .await
        .unwrap();
    }
    tx.commit().await.unwrap();
}

mod top_products {
    use super::*;

    #[tokio::test]
    async fn quantity_and_revenue_rankings_can_differ() {
        let (store, service, ids) = setup().await;
        place(&store, 1, &[(ids[1], 5, 90_000)]).await;
        place(&store, 2, &[(ids[2], 4, 135_000)]).await;

        let by_quantity = service
            .top_products(Window::default(), Metric::Quantity, DEFAULT_TOP_LIMIT)
            .await
            .unwrap();
        let by_revenue = service
            .top_products(Window::default(), Metric::Revenue, DEFAULT_TOP_LIMIT)
            .await
            .unwrap();

        assert_eq!(by_quantity[0].title, "Top Compresión");
        assert_eq!(by_revenue[0].title, "Jogger Fit");
        assert_eq!(by_revenue[0].revenue, Decimal::from(540_000));
    }

    #[tokio::test]
    async fn leggings_order_leads_revenue() {
        let (store, service, ids) = setup().await;
        place(&store, 0, &[(ids[0], 2, 120_000)]).await;

        let top = service
            .top_products(Window::days(7), Metric::Revenue, 1)
            .await
            .unwrap();

        assert_eq!(top.len(), 1);
        assert_eq!(top[0].title, "Leggings Pro");
        assert!(top[0].revenue >= Decimal::from(240_000));
    }

    #[tokio::test]
    async fn equal_values_rank_by_title() {
        let (store, service, ids) = setup().await;
        place(&store, 1, &[(ids[1], 2, 1), (ids[2], 2, 1), (ids[0], 2, 1)]).await;

        let top = service
            .top_products(Window::default(), Metric::Quantity, 10)
            .await
            .unwrap();

        let titles: Vec<_> = top.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Jogger Fit", "Leggings Pro", "Top Compresión"]);
    }

    #[tokio::test]
    async fn limit_is_clamped_to_at_least_one() {
        let (store, service, ids) = setup().await;
        place(&store, 1, &[(ids[0], 1, 1), (ids[1], 1, 1)]).await;

        let top = service
            .top_products(Window::default(), Metric::Quantity, 0)
            .await
            .unwrap();

        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn quantities_never_exceed_window_total() {
        let (store, service, ids) = setup().await;
        place(&store, 1, &[(ids[0], 3, 120_000), (ids[1], 1, 90_000)]).await;
        place(&store, 3, &[(ids[0], 2, 120_000)]).await;
        place(&store, 45, &[(ids[0], 50, 120_000)]).await;

        let window = Window::days(30);
        let top = service
            .top_products(window, Metric::Quantity, DEFAULT_TOP_LIMIT)
            .await
            .unwrap();
        let summary = service.summary(window).await.unwrap();

        let total: i64 = top.iter().map(|p| p.quantity).sum();
        assert!(total <= summary.items);
        assert_eq!(top[0].quantity, 5);
    }

    #[tokio::test]
    async fn older_orders_fall_outside_the_window() {
        let (store, service, ids) = setup().await;
        place(&store, 40, &[(ids[2], 1, 135_000)]).await;

        let recent = service
            .top_products(Window::days(30), Metric::Quantity, DEFAULT_TOP_LIMIT)
            .await
            .unwrap();
        let wider = service
            .top_products(Window::days(60), Metric::Quantity, DEFAULT_TOP_LIMIT)
            .await
            .unwrap();

        assert!(recent.is_empty());
        assert_eq!(wider[0].title, "Jogger Fit");
    }
}

mod series {
    use super::*;

    #[tokio::test]
    async fn labels_are_sorted_and_arrays_aligned() {
        let (store, service, ids) = setup().await;
        place(&store, 5, &[(ids[0], 1, 120_000)]).await;
        place(&store, 2, &[(ids[1], 2, 90_000), (ids[0], 1, 120_000)]).await;
        place(&store, 2, &[(ids[2], 1, 135_000)]).await;
        place(&store, 9, &[(ids[2], 4, 135_000)]).await;

        let series = service
            .daily_series(Window::days(30), Metric::Quantity, DEFAULT_SERIES_TOP)
            .await
            .unwrap();

        assert!(series.labels.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(series.series.len(), 3);
        for product in &series.series {
            assert_eq!(product.data.len(), series.labels.len());
        }
    }

    #[tokio::test]
    async fn series_totals_match_the_ranking() {
        let (store, service, ids) = setup().await;
        place(&store, 1, &[(ids[0], 2, 120_000), (ids[1], 1, 80_000)]).await;
        place(&store, 4, &[(ids[0], 1, 100_000)]).await;
        place(&store, 6, &[(ids[2], 3, 135_000)]).await;

        for metric in [Metric::Quantity, Metric::Revenue] {
            let window = Window::days(14);
            let top = service.top_products(window, metric, 2).await.unwrap();
            let series = service.daily_series(window, metric, 2).await.unwrap();

            assert_eq!(series.series.len(), top.len());
            for (ranked, charted) in top.iter().zip(&series.series) {
                assert_eq!(ranked.title, charted.title);
                assert_eq!(charted.total(), ranked.value(metric));
            }
        }
    }

    #[tokio::test]
    async fn empty_window_gives_empty_series() {
        let (store, service, ids) = setup().await;
        place(&store, 100, &[(ids[0], 1, 120_000)]).await;

        let series = service
            .daily_series(Window::days(30), Metric::Revenue, DEFAULT_SERIES_TOP)
            .await
            .unwrap();

        assert!(series.labels.is_empty());
        assert!(series.series.is_empty());
    }
}

mod summary {
    use super::*;

    #[tokio::test]
    async fn revenue_uses_price_at_sale() {
        let (store, service, ids) = setup().await;
        place(&store, 1, &[(ids[0], 2, 120_000), (ids[1], 1, 85_000)]).await;
        place(&store, 2, &[(ids[0], 1, 110_000)]).await;

        store.set_product_price(ids[0], Decimal::from(1)).await;
        let summary = service.summary(Window::default()).await.unwrap();

        assert_eq!(summary.orders, 2);
        assert_eq!(summary.items, 4);
        assert_eq!(summary.revenue, Decimal::from(240_000 + 85_000 + 110_000));
    }

    #[tokio::test]
    async fn empty_store_sums_to_zero() {
        let (_, service, _) = setup().await;

        let summary = service.summary(Window::days(1)).await.unwrap();

        assert_eq!(summary.orders, 0);
        assert_eq!(summary.items, 0);
        assert_eq!(summary.revenue, Decimal::ZERO);
    }

    #[tokio::test]
    async fn backdated_orders_leave_the_window() {
        let (store, service, ids) = setup().await;
        place(&store, 0, &[(ids[0], 1, 120_000)]).await;
        let order_id = common::OrderId::new(1);

        assert_eq!(service.summary(Window::days(7)).await.unwrap().orders, 1);

        store
            .backdate_order(order_id, Utc::now() - Duration::days(8))
            .await;
        assert_eq!(service.summary(Window::days(7)).await.unwrap().orders, 0);
    }
}
