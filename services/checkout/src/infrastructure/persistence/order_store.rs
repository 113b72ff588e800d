//! 订单持久化端口
//!
//! 订单 Repository 适配器只依赖这组行级操作，不依赖具体数据库。

use std::sync::Arc;

use async_trait::async_trait;
use storefront_errors::AppResult;

use super::rows::{OrderItemRow, OrderRecord, OrderRow};

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// 在同一个原子单元内写入订单行及全部订单行明细
    async fn create_with_items(&self, order: &OrderRow, items: &[OrderItemRow]) -> AppResult<()>;

    /// 按 id 覆盖 `customer_id` 与 `total`，返回是否命中了已存在的订单
    async fn update_order(&self, order: &OrderRow) -> AppResult<bool>;

    /// 订单行明细不存在时插入，返回 `true` 表示本次新建
    async fn find_or_create_item(&self, item: &OrderItemRow) -> AppResult<bool>;

    /// 按 id 覆盖 name / price / product_id / quantity，不改写 `order_id`
    async fn update_item(&self, item: &OrderItemRow) -> AppResult<()>;

    /// 删除该订单下 id 不在 `keep` 中的订单行明细，返回删除行数
    async fn remove_items_except(&self, order_id: &str, keep: &[String]) -> AppResult<u64>;

    async fn find_by_pk(&self, id: &str) -> AppResult<Option<OrderRecord>>;

    async fn find_all(&self) -> AppResult<Vec<OrderRecord>>;
}

#[async_trait]
impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    async fn create_with_items(&self, order: &OrderRow, items: &[OrderItemRow]) -> AppResult<()> {
        (**self).create_with_items(order, items).await
    }

    async fn update_order(&self, order: &OrderRow) -> AppResult<bool> {
        (**self).update_order(order).await
    }

    async fn find_or_create_item(&self, item: &OrderItemRow) -> AppResult<bool> {
        (**self).find_or_create_item(item).await
    }

    async fn update_item(&self, item: &OrderItemRow) -> AppResult<()> {
        (**self).update_item(item).await
    }

    async fn remove_items_except(&self, order_id: &str, keep: &[String]) -> AppResult<u64> {
        (**self).remove_items_except(order_id, keep).await
    }

    async fn find_by_pk(&self, id: &str) -> AppResult<Option<OrderRecord>> {
        (**self).find_by_pk(id).await
    }

    async fn find_all(&self) -> AppResult<Vec<OrderRecord>> {
        (**self).find_all().await
    }
}
