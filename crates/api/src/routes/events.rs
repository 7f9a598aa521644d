//! Live sales updates over server-sent events.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use chrono::Utc;
use domain::Wake;
use futures_util::Stream;
use futures_util::stream;
use store::Store;

use crate::AppState;

/// Keeps the connected-subscriber gauge in step with open streams.
struct ConnectedGauge;

impl ConnectedGauge {
    fn connect() -> Self {
        metrics::gauge!("sse_subscribers_connected").increment(1.0);
        Self
    }
}

impl Drop for ConnectedGauge {
    fn drop(&mut self) {
        metrics::gauge!("sse_subscribers_connected").decrement(1.0);
    }
}

fn timestamp_event() -> Event {
    Event::default().data(Utc::now().timestamp().to_string())
}

/// GET /api/ventas-sse: one event on connect, then one per change or
/// heartbeat. Each event's data is the current unix time in seconds.
///
/// Clients re-query the dashboards when an event arrives. Disconnecting
/// drops the stream together with its subscription.
pub async fn stream<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.notifier.subscribe();
    let heartbeat = state.heartbeat;
    tracing::debug!(
        subscribers = state.notifier.subscriber_count(),
        "sales stream opened"
    );

    let events = stream::unfold(
        (subscription, ConnectedGauge::connect(), true),
        move |(mut subscription, gauge, first)| async move {
            if !first && subscription.await_change(heartbeat).await == Wake::Closed {
                return None;
            }
            Some((Ok(timestamp_event()), (subscription, gauge, false)))
        },
    );

    Sse::new(events).keep_alive(KeepAlive::default())
}
