//! PostgreSQL 订单存储实现

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use storefront_adapter_postgres::{
    IsolationLevel, TransactionManager, TransactionOptions, is_foreign_key_violation,
    map_sqlx_error,
};
use storefront_errors::{AppError, AppResult};

use super::order_store::OrderStore;
use super::rows::{OrderItemRow, OrderRecord, OrderRow};

pub struct PostgresOrderStore {
    pool: PgPool,
    /// 创建订单使用的读写事务
    write_tx: TransactionManager,
    /// find_all 使用的只读快照事务，保证订单与明细读取一致
    snapshot_tx: TransactionManager,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        let snapshot = TransactionOptions::new()
            .with_isolation_level(IsolationLevel::RepeatableRead)
            .read_only();

        Self {
            write_tx: TransactionManager::new(pool.clone()),
            snapshot_tx: TransactionManager::new(pool.clone()).with_options(snapshot),
            pool,
        }
    }

    async fn insert_order_with_items(
        tx: &mut Transaction<'static, Postgres>,
        order: &OrderRow,
        items: &[OrderItemRow],
    ) -> AppResult<()> {
        sqlx::query("INSERT INTO orders (id, customer_id, total) VALUES ($1, $2, $3)")
            .bind(&order.id)
            .bind(&order.customer_id)
            .bind(order.total)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("Failed to insert order", e))?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, name, price, product_id, order_id, quantity)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(&item.id)
            .bind(&item.name)
            .bind(item.price)
            .bind(&item.product_id)
            .bind(&order.id)
            .bind(item.quantity)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("Failed to insert order item", e))?;
        }

        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn create_with_items(&self, order: &OrderRow, items: &[OrderItemRow]) -> AppResult<()> {
        let mut tx = self.write_tx.begin().await?;
        let result = Self::insert_order_with_items(&mut tx, order, items).await;
        TransactionManager::finish(tx, result).await
    }

    async fn update_order(&self, order: &OrderRow) -> AppResult<bool> {
        let result = sqlx::query("UPDATE orders SET customer_id = $2, total = $3 WHERE id = $1")
            .bind(&order.id)
            .bind(&order.customer_id)
            .bind(order.total)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to update order", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_or_create_item(&self, item: &OrderItemRow) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO order_items (id, name, price, product_id, order_id, quantity)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.price)
        .bind(&item.product_id)
        .bind(&item.order_id)
        .bind(item.quantity)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::not_found(format!("Order {} not found", item.order_id))
            } else {
                map_sqlx_error("Failed to find or create order item", e)
            }
        })?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_item(&self, item: &OrderItemRow) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE order_items
            SET name = $2, price = $3, product_id = $4, quantity = $5
            WHERE id = $1
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.price)
        .bind(&item.product_id)
        .bind(item.quantity)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to update order item", e))?;

        Ok(())
    }

    async fn remove_items_except(&self, order_id: &str, keep: &[String]) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM order_items WHERE order_id = $1 AND id <> ALL($2)")
            .bind(order_id)
            .bind(keep)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to remove stale order items", e))?;

        Ok(result.rows_affected())
    }

    async fn find_by_pk(&self, id: &str) -> AppResult<Option<OrderRecord>> {
        let order = sqlx::query_as::<_, OrderRow>(
            "SELECT id, customer_id, total FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find order", e))?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT id, name, price, product_id, order_id, quantity
            FROM order_items
            WHERE order_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find order items", e))?;

        Ok(Some(OrderRecord { order, items }))
    }

    async fn find_all(&self) -> AppResult<Vec<OrderRecord>> {
        let mut tx = self.snapshot_tx.begin().await?;
        let result = load_all(&mut tx).await;
        TransactionManager::finish(tx, result).await
    }
}

async fn load_all(tx: &mut Transaction<'static, Postgres>) -> AppResult<Vec<OrderRecord>> {
    let orders = sqlx::query_as::<_, OrderRow>("SELECT id, customer_id, total FROM orders")
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to list orders", e))?;

    let items = sqlx::query_as::<_, OrderItemRow>(
        "SELECT id, name, price, product_id, order_id, quantity FROM order_items",
    )
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("Failed to list order items", e))?;

    let mut items_by_order: HashMap<String, Vec<OrderItemRow>> = HashMap::new();
    for item in items {
        items_by_order
            .entry(item.order_id.clone())
            .or_default()
            .push(item);
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            OrderRecord { order, items }
        })
        .collect())
}
