use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::orders::OrderWithItems,
    models::Order,
    services::order_service::{attach_items, fetch_items_for},
};

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// One non-empty poll tick: every order created since the previous tick,
/// with its lines attached, in creation order.
pub type OrderBatch = Arc<Vec<OrderWithItems>>;

/// Push channel for newly created orders. A single background task keeps a
/// per-process watermark (highest order id already delivered) and broadcasts
/// one batch per tick with new data; subscribers are plain broadcast
/// receivers, so dropping one deregisters it and dropping twice is a no-op.
///
/// Delivery is best-effort: a lagged subscriber loses batches and nothing is
/// replayed on reconnect. The store stays the source of truth.
#[derive(Debug, Clone)]
pub struct OrderNotifier {
    tx: broadcast::Sender<OrderBatch>,
    poll_task: Arc<JoinHandle<()>>,
}

impl OrderNotifier {
    /// Reads the initial watermark and starts the poll loop.
    pub async fn spawn(pool: DbPool, interval: Duration) -> anyhow::Result<Self> {
        let initial: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) FROM orders")
            .fetch_one(&pool)
            .await?;

        let (tx, _) = broadcast::channel(64);
        let task_tx = tx.clone();

        let poll_task = tokio::spawn(async move {
            let mut cursor = initial;
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match poll_new_orders(&pool, cursor).await {
                    Ok(Some((batch, next_cursor))) => {
                        cursor = next_cursor;
                        // No receivers is fine; the batch is simply dropped.
                        let _ = task_tx.send(Arc::new(batch));
                    }
                    Ok(None) => {}
                    Err(err) => {
                        // Skip this tick; the next one retries from the same cursor.
                        tracing::warn!(error = %err, "order poll tick failed");
                    }
                }
            }
        });

        Ok(Self {
            tx,
            poll_task: Arc::new(poll_task),
        })
    }

    /// Registers a subscriber and hands it an identifier for the initial
    /// acknowledgement event.
    pub fn subscribe(&self) -> (Uuid, broadcast::Receiver<OrderBatch>) {
        (Uuid::new_v4(), self.tx.subscribe())
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Stops the poll loop. Called once at process shutdown.
    pub fn shutdown(&self) {
        self.poll_task.abort();
    }
}

/// Fetches everything past the watermark in creation order and attaches the
/// line items with one batched lookup. Returns the new watermark alongside.
pub async fn poll_new_orders(
    pool: &DbPool,
    cursor: i64,
) -> anyhow::Result<Option<(Vec<OrderWithItems>, i64)>> {
    let orders: Vec<Order> = sqlx::query_as("SELECT * FROM orders WHERE id > $1 ORDER BY id")
        .bind(cursor)
        .fetch_all(pool)
        .await?;

    let Some(last) = orders.last() else {
        return Ok(None);
    };
    let next_cursor = last.id;

    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let items = fetch_items_for(pool, &ids).await?;

    Ok(Some((attach_items(orders, items), next_cursor)))
}
