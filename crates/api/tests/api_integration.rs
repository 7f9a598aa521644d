//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use futures_util::StreamExt;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use store::{InMemoryStore, Store};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    setup_with_state().0
}

fn setup_with_state() -> (axum::Router, Arc<api::AppState<InMemoryStore>>, InMemoryStore) {
    let store = InMemoryStore::new();
    let state = api::create_default_state(store.clone(), Duration::from_secs(60));
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state, store)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Creates the demo catalog through the products endpoint.
async fn create_catalog(app: &axum::Router) {
    for (title, price) in domain::DEMO_CATALOG {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/productos",
                json!({ "titulo": title, "precio": price }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = app.oneshot(get("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
}

#[tokio::test]
async fn test_create_and_list_products() {
    let app = setup();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/productos",
            json!({ "titulo": "  Jogger Fit ", "precio": "135000" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["titulo"], "Jogger Fit");
    assert_eq!(created["precio"], 135000.0);

    let response = app.oneshot(get("/api/productos")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["id"], created["id"]);
}

#[tokio::test]
async fn test_create_product_validation() {
    let app = setup();

    for body in [
        json!({ "titulo": "   ", "precio": 10 }),
        json!({ "titulo": "Jogger Fit", "precio": "cheap" }),
        json!({ "titulo": "Jogger Fit", "precio": -5 }),
        json!({ "titulo": "Jogger Fit", "precio": "10000000000000000000000000000" }),
        json!({ "precio": 10 }),
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/api/productos", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].is_string());
    }

    let response = app.oneshot(get("/api/productos")).await.unwrap();
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_order_then_top_by_revenue() {
    let (app, _, store) = setup_with_state();
    create_catalog(&app).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/pedidos",
            json!({
                "nombre": "Ana",
                "correo": "ana@mail.com",
                "items": [{ "titulo": "Leggings Pro", "qty": 2 }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    assert!(json["pedido_id"].as_i64().unwrap() > 0);
    assert_eq!(store.count_order_lines().await.unwrap(), 1);

    let response = app
        .oneshot(get("/api/ventas-top?metric=ingreso&limit=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["titulo"], "Leggings Pro");
    assert_eq!(json[0]["cantidad"], 2);
    assert!(json[0]["ingreso"].as_f64().unwrap() >= 240000.0);
}

#[tokio::test]
async fn test_order_with_unseen_title_creates_product() {
    let app = setup();
    create_catalog(&app).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/pedidos",
            json!({
                "nombre": "Luis",
                "correo": "luis@mail.com",
                "items": [{ "titulo": "Medias Running", "precio": 50000 }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/productos")).await.unwrap();
    let json = body_json(response).await;
    let products = json.as_array().unwrap();
    assert_eq!(products.len(), 6);
    assert_eq!(products[5]["titulo"], "Medias Running");
    assert_eq!(products[5]["precio"], 50000.0);
}

#[tokio::test]
async fn test_oversized_price_is_ignored_and_analytics_keep_working() {
    let app = setup();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/pedidos",
            json!({
                "items": [
                    { "titulo": "Big", "qty": 10, "precio": "10000000000000000000000000000" },
                    { "titulo": "Media Tobillera", "qty": 2, "precio": "10.005" }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/api/productos")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json[0]["titulo"], "Big");
    assert_eq!(json[0]["precio"], 0.0);
    assert_eq!(json[1]["precio"], 10.01);

    let response = app
        .clone()
        .oneshot(get("/api/ventas-top?metric=ingreso"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json[0]["titulo"], "Media Tobillera");
    assert_eq!(json[0]["ingreso"], 20.02);
    assert_eq!(json[1]["ingreso"], 0.0);

    let response = app
        .clone()
        .oneshot(get("/api/ventas-serie?metric=ingreso"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["series"].as_array().unwrap().len(), 2);

    let response = app.oneshot(get("/api/ventas-resumen")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["pedidos"], 1);
    assert_eq!(json["items"], 12);
    assert_eq!(json["ingreso"], 20.02);
}

#[tokio::test]
async fn test_order_validation_errors() {
    let (app, _, store) = setup_with_state();

    for body in [
        json!({ "nombre": "Ana", "correo": "ana@mail.com", "items": [] }),
        json!({ "nombre": "Ana", "correo": "ana@mail.com" }),
        json!({ "nombre": "", "correo": "ana@mail.com", "items": [{ "titulo": "X" }] }),
        json!({ "nombre": "Ana", "items": [{ "titulo": "X" }] }),
        json!({ "nombre": "Ana", "correo": "ana@mail.com", "items": [{ "titulo": "X", "qty": "abc" }] }),
        json!({ "nombre": "Ana", "correo": "ana@mail.com", "items": [{ "qty": 1 }] }),
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/api/pedidos", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    assert_eq!(store.count_orders().await.unwrap(), 0);
    assert!(store.list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/pedidos")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_store_failure_is_generic_500() {
    let (app, _, store) = setup_with_state();
    store.set_fail_after_lines(Some(0));

    let response = app
        .oneshot(post_json(
            "/api/pedidos",
            json!({
                "nombre": "Ana",
                "correo": "ana@mail.com",
                "items": [{ "titulo": "Jogger Fit" }]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "internal server error");
    assert_eq!(store.count_orders().await.unwrap(), 0);
}

#[tokio::test]
async fn test_series_and_summary() {
    let app = setup();
    create_catalog(&app).await;

    for items in [
        json!([{ "titulo": "Leggings Pro", "qty": 2 }, { "titulo": "Jogger Fit" }]),
        json!([{ "titulo": "Top Compresión", "qty": "3" }]),
    ] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/pedidos",
                json!({ "nombre": "Ana", "correo": "ana@mail.com", "items": items }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(get("/api/ventas-serie?days=7&metric=cantidad&top=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let labels = json["labels"].as_array().unwrap();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].as_str().unwrap().len(), "YYYY-MM-DD".len());
    let series = json["series"].as_array().unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0]["titulo"], "Top Compresión");
    assert_eq!(series[0]["data"], json!([3.0]));
    assert_eq!(series[1]["titulo"], "Leggings Pro");

    let response = app
        .oneshot(get("/api/ventas-resumen?days=7"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["pedidos"], 2);
    assert_eq!(json["items"], 6);
    assert_eq!(json["ingreso"], 240000.0 + 135000.0 + 270000.0);
}

#[tokio::test]
async fn test_analytics_tolerate_bad_parameters() {
    let app = setup();

    let response = app
        .clone()
        .oneshot(get("/api/ventas-top?days=abc&metric=margin&limit=-1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));

    let response = app
        .clone()
        .oneshot(get("/api/ventas-serie?top=zzz"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "labels": [], "series": [] })
    );

    let response = app
        .oneshot(get("/api/ventas-resumen?days="))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json, json!({ "pedidos": 0, "items": 0, "ingreso": 0.0 }));
}

#[tokio::test]
async fn test_seed_endpoint() {
    let (app, _, store) = setup_with_state();

    let response = app.clone().oneshot(post_json("/api/seed", json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    assert!(json["msg"].as_str().unwrap().contains("12 orders"));

    let response = app.oneshot(get("/api/seed")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(store.list_products().await.unwrap().len(), 5);
    assert_eq!(store.count_orders().await.unwrap(), 24);
}

#[tokio::test]
async fn test_sales_stream_emits_on_connect_and_on_order() {
    let (app, state, _) = setup_with_state();

    let response = app.clone().oneshot(get("/api/ventas-sse")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );
    assert_eq!(state.notifier.subscriber_count(), 1);

    let mut frames = response.into_body().into_data_stream();
    let first = tokio::time::timeout(Duration::from_secs(5), frames.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let first = String::from_utf8(first.to_vec()).unwrap();
    assert!(first.starts_with("data: "));
    let stamp: i64 = first.trim_start_matches("data: ").trim().parse().unwrap();
    assert!(stamp > 0);

    let response = app
        .oneshot(post_json(
            "/api/pedidos",
            json!({
                "nombre": "Ana",
                "correo": "ana@mail.com",
                "items": [{ "titulo": "Jogger Fit", "precio": 135000 }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let next = tokio::time::timeout(Duration::from_secs(5), frames.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(String::from_utf8(next.to_vec()).unwrap().starts_with("data: "));

    drop(frames);
    assert_eq!(state.notifier.subscriber_count(), 0);
}

#[tokio::test]
async fn test_event_aliases() {
    let app = setup();

    for uri in ["/events", "/api/events"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/event-stream")
        );
    }
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/pedidos",
            json!({
                "nombre": "Ana",
                "correo": "ana@mail.com",
                "items": [{ "titulo": "Camiseta Dry", "precio": 70000 }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("orders_created_total"));
}
