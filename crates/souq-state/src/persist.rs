//! # Cart Persistence
//!
//! Saves the cart after every change without blocking the dispatcher.
//!
//! ```text
//! cart.dispatch(..) ──► changed ──► listener(&snapshot)
//!                                        │
//!                                        ▼
//!                              watch::Sender::send_replace   ← never blocks
//!                                        │
//!                                        ▼
//!                     ┌─────────── CartWriter::run ───────────┐
//!                     │  rx.changed() ──► save latest cart     │
//!                     │  shutdown     ──► save unseen, exit    │
//!                     └────────────────────────────────────────┘
//!                                        │
//!                              ┌─────────┴─────────┐
//!                              ▼                   ▼
//!                             Ok               Err(e) ──► warn!, dropped
//! ```
//!
//! One task does every write, so saves land in dispatch order. The watch
//! channel keeps only the newest snapshot: a burst of changes made while a
//! save is running collapses into a single follow-up save.
//!
//! There is no retry: the next change writes the whole cart again anyway.

use std::sync::Arc;

use souq_core::Cart;
use souq_db::CartRepository;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cart::CartStore;
use crate::store::SubscriptionId;

// =============================================================================
// Writer Task
// =============================================================================

/// Background task that writes cart snapshots in order.
struct CartWriter {
    repo: CartRepository,
    cart_id: String,
    carts: watch::Receiver<Cart>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl CartWriter {
    async fn run(mut self) {
        debug!(cart_id = %self.cart_id, "Cart writer starting");

        loop {
            tokio::select! {
                changed = self.carts.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.save_latest().await;
                }

                _ = self.shutdown_rx.recv() => {
                    // A change may have arrived together with the shutdown
                    if matches!(self.carts.has_changed(), Ok(true)) {
                        self.save_latest().await;
                    }
                    break;
                }
            }
        }

        debug!(cart_id = %self.cart_id, "Cart writer stopped");
    }

    async fn save_latest(&mut self) {
        let cart = self.carts.borrow_and_update().clone();
        if let Err(e) = self.repo.save(&self.cart_id, &cart).await {
            warn!(cart_id = %self.cart_id, error = %e, "Cart save failed");
        }
    }
}

// =============================================================================
// Persistence Handle
// =============================================================================

/// Keeps a cart row in step with a [`CartStore`].
///
/// ## Lifecycle
/// ```text
/// start() ──► subscribe + spawn writer
///    ...      every change is queued, latest wins
/// stop()  ──► unsubscribe, signal writer, await final save
/// ```
pub struct CartPersistence {
    subscription: SubscriptionId,
    // Held so the writer's receiver stays open until `stop`
    _carts: Arc<watch::Sender<Cart>>,
    shutdown_tx: mpsc::Sender<()>,
    writer: JoinHandle<()>,
}

impl CartPersistence {
    /// Saves the cart under `cart_id` after every change to `store`.
    ///
    /// The state at the time of the call counts as already saved.
    pub fn start(
        store: &CartStore,
        handle: &Handle,
        repo: CartRepository,
        cart_id: impl Into<String>,
    ) -> Self {
        let cart_id = cart_id.into();
        let (tx, rx) = watch::channel(store.get_snapshot());
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let carts = Arc::new(tx);

        let writer = handle.spawn(
            CartWriter {
                repo,
                cart_id: cart_id.clone(),
                carts: rx,
                shutdown_rx,
            }
            .run(),
        );

        let sender = Arc::clone(&carts);
        let source = store.clone();
        let subscription = store.subscribe(move |_: &Cart| {
            // Listeners of concurrent dispatches may run out of order;
            // re-reading the store means the last one to run still
            // publishes the newest cart.
            let latest = source.get_snapshot();
            sender.send_if_modified(|current| {
                if *current == latest {
                    return false;
                }
                *current = latest;
                true
            });
        });

        info!(cart_id = %cart_id, "Cart persistence started");

        CartPersistence {
            subscription,
            _carts: carts,
            shutdown_tx,
            writer,
        }
    }

    /// Stops listening to `store` and waits until the last change is
    /// written.
    pub async fn stop(self, store: &CartStore) {
        store.unsubscribe(self.subscription);

        // Fails only if the writer is gone; the join reports why
        let _ = self.shutdown_tx.send(()).await;

        if let Err(e) = self.writer.await {
            warn!(error = %e, "Cart writer ended abnormally");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartAction;
    use souq_core::{CartItem, Money, Product};
    use souq_db::{Database, DbConfig};

    fn item(stock: i64, qty: i64) -> CartItem {
        let product = Product {
            id: "p1".to_string(),
            name: "Dates 1kg".to_string(),
            slug: "dates-1kg".to_string(),
            category: "Food".to_string(),
            images: vec![],
            price: Money::from_minor(4_500),
            count_in_stock: stock,
            colors: vec![],
            sizes: vec![],
            is_published: true,
        };
        CartItem::from_product(&product, qty, None, None)
    }

    #[tokio::test]
    async fn test_stop_writes_latest_cart() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = CartStore::new(Cart::new());
        let persistence = CartPersistence::start(&store, &Handle::current(), db.carts(), "local");

        store.dispatch(CartAction::Add(item(5, 1))).unwrap();
        persistence.stop(&store).await;

        assert_eq!(db.carts().load("local").await.unwrap(), Some(store.get_snapshot()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_rapid_changes_save_final_snapshot() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = CartStore::new(Cart::new());
        let persistence = CartPersistence::start(&store, &Handle::current(), db.carts(), "local");

        let line = item(500, 1);
        let client_id = line.client_id.clone();
        store.dispatch(CartAction::Add(line)).unwrap();
        for _ in 0..150 {
            assert!(store
                .dispatch(CartAction::Increment(client_id.clone()))
                .unwrap());
        }

        persistence.stop(&store).await;

        let saved = db.carts().load("local").await.unwrap().unwrap();
        assert_eq!(saved.total_items(), 151);
        assert_eq!(saved, store.get_snapshot());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_dispatchers_save_final_snapshot() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = CartStore::new(Cart::new());
        let persistence = CartPersistence::start(&store, &Handle::current(), db.carts(), "local");

        let line = item(1_000, 1);
        let client_id = line.client_id.clone();
        store.dispatch(CartAction::Add(line)).unwrap();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                let client_id = client_id.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store
                            .dispatch(CartAction::Increment(client_id.clone()))
                            .unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        persistence.stop(&store).await;

        let saved = db.carts().load("local").await.unwrap().unwrap();
        assert_eq!(saved.total_items(), 201);
        assert_eq!(saved, store.get_snapshot());
    }

    #[tokio::test]
    async fn test_changes_after_stop_are_not_saved() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = CartStore::new(Cart::new());
        let persistence = CartPersistence::start(&store, &Handle::current(), db.carts(), "local");

        persistence.stop(&store).await;
        store.dispatch(CartAction::Add(item(5, 1))).unwrap();

        assert_eq!(db.carts().load("local").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_save_is_swallowed() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = CartStore::new(Cart::new());
        let persistence = CartPersistence::start(&store, &Handle::current(), db.carts(), "local");
        db.close().await;

        // Logged and dropped: the writer still shuts down cleanly
        store.dispatch(CartAction::Add(item(5, 2))).unwrap();
        persistence.stop(&store).await;
        assert!(!db.health_check().await);
    }
}
