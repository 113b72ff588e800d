//! Repository trait 定义

use async_trait::async_trait;
use storefront_errors::AppResult;

/// 聚合 Repository trait
///
/// 每个存储后端（PostgreSQL、内存等）都实现同一组签名。
#[async_trait]
pub trait Repository<T, ID>: Send + Sync
where
    T: Send + Sync,
    ID: Send + Sync + ?Sized,
{
    /// 创建聚合（连同其子实体）
    async fn create(&self, entity: &T) -> AppResult<()>;

    /// 更新已存在的聚合
    async fn update(&self, entity: &T) -> AppResult<()>;

    /// 根据 ID 查找，不存在时返回 `AppError::NotFound`
    async fn find(&self, id: &ID) -> AppResult<T>;

    /// 查询所有
    async fn find_all(&self) -> AppResult<Vec<T>>;
}
