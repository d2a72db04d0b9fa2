//! # Cart Repository
//!
//! Persists carts as JSON documents keyed by cart id.
//!
//! ```text
//! CartStore.dispatch(..) ──► changed? ──► tokio::spawn(save(id, snapshot))
//!                                               │
//!                                               ▼
//!                                    carts(id, document, updated_at)
//! ```
//!
//! The stored `itemsPrice` is informational only: decoding a cart
//! recomputes it from the lines.

use chrono::Utc;
use souq_core::Cart;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for cart documents.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Loads a cart, or `None` if nothing was saved under `cart_id`.
    pub async fn load(&self, cart_id: &str) -> DbResult<Option<Cart>> {
        let document: Option<String> =
            sqlx::query_scalar("SELECT document FROM carts WHERE id = ?1")
                .bind(cart_id)
                .fetch_optional(&self.pool)
                .await?;

        document
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(Into::into)
    }

    /// Replaces the stored cart with `cart`.
    pub async fn save(&self, cart_id: &str, cart: &Cart) -> DbResult<()> {
        let json = serde_json::to_string(cart)?;

        sqlx::query(
            r#"
            INSERT INTO carts (id, document, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                document = excluded.document,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(cart_id)
        .bind(&json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(
            cart_id = %cart_id,
            lines = cart.line_count(),
            items_price = cart.items_price().minor(),
            "Cart saved"
        );
        Ok(())
    }

    /// Deletes a stored cart. Returns whether a row existed.
    pub async fn delete(&self, cart_id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM carts WHERE id = ?1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use souq_core::{Cart, CartItem, Money, Product};

    fn product(id: &str, price: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            slug: format!("product-{id}"),
            category: "Abayas".to_string(),
            images: vec![format!("/images/{id}.jpg")],
            price: Money::from_minor(price),
            count_in_stock: stock,
            colors: vec![],
            sizes: vec![],
            is_published: true,
        }
    }

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(CartItem::from_product(&product("p1", 10_000, 5), 2, None, None))
            .unwrap();
        cart.add_item(CartItem::from_product(&product("p2", 5_000, 5), 1, None, None))
            .unwrap();
        cart
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.carts();

        assert!(repo.load("local").await.unwrap().is_none());

        let cart = sample_cart();
        repo.save("local", &cart).await.unwrap();

        let loaded = repo.load("local").await.unwrap().unwrap();
        assert_eq!(loaded, cart);
        assert_eq!(loaded.items_price().minor(), 25_000);
    }

    #[tokio::test]
    async fn test_load_recomputes_items_price() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.carts();
        repo.save("local", &sample_cart()).await.unwrap();

        sqlx::query("UPDATE carts SET document = json_set(document, '$.itemsPrice', 1) WHERE id = 'local'")
            .execute(db.pool())
            .await
            .unwrap();

        let loaded = repo.load("local").await.unwrap().unwrap();
        assert_eq!(loaded.items_price().minor(), 25_000);
    }

    #[tokio::test]
    async fn test_save_overwrites_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.carts();

        repo.save("local", &sample_cart()).await.unwrap();
        repo.save("local", &Cart::new()).await.unwrap();
        assert!(repo.load("local").await.unwrap().unwrap().is_empty());

        assert!(repo.delete("local").await.unwrap());
        assert!(!repo.delete("local").await.unwrap());
        assert!(repo.load("local").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_cart_id_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.carts().save("", &Cart::new()).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));
    }
}
