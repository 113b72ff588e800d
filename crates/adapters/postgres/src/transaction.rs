//! PostgreSQL 事务管理模块
//!
//! 提供显式的 begin / commit / rollback 边界

use sqlx::{PgPool, Postgres, Transaction};
use storefront_errors::{AppError, AppResult};
use tracing::{debug, warn};

/// 事务隔离级别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IsolationLevel {
    /// 读已提交（PostgreSQL 默认）
    #[default]
    ReadCommitted,
    /// 可重复读
    RepeatableRead,
    /// 可串行化
    Serializable,
}

impl IsolationLevel {
    /// 转换为 SQL 字符串
    pub fn as_sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

/// 事务访问模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessMode {
    /// 读写
    #[default]
    ReadWrite,
    /// 只读
    ReadOnly,
}

impl AccessMode {
    /// 转换为 SQL 字符串
    pub fn as_sql(&self) -> &'static str {
        match self {
            AccessMode::ReadWrite => "READ WRITE",
            AccessMode::ReadOnly => "READ ONLY",
        }
    }
}

/// 事务选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionOptions {
    /// 隔离级别
    pub isolation_level: IsolationLevel,
    /// 访问模式
    pub access_mode: AccessMode,
}

impl TransactionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置隔离级别
    pub fn with_isolation_level(mut self, level: IsolationLevel) -> Self {
        self.isolation_level = level;
        self
    }

    /// 设置为只读
    pub fn read_only(mut self) -> Self {
        self.access_mode = AccessMode::ReadOnly;
        self
    }

    /// 是否与 PostgreSQL 默认事务设置一致
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// 生成 SET TRANSACTION 语句
    pub fn to_sql(&self) -> String {
        format!(
            "SET TRANSACTION ISOLATION LEVEL {}, {}",
            self.isolation_level.as_sql(),
            self.access_mode.as_sql()
        )
    }
}

/// 事务管理器
#[derive(Clone)]
pub struct TransactionManager {
    pool: PgPool,
    options: TransactionOptions,
}

impl TransactionManager {
    /// 创建新的事务管理器（默认事务选项）
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            options: TransactionOptions::default(),
        }
    }

    /// 指定每个事务使用的选项
    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }

    /// 开始事务
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {}", e)))?;

        if !self.options.is_default() {
            sqlx::query(&self.options.to_sql())
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::database(format!("Failed to set transaction options: {}", e))
                })?;
        }

        debug!("Transaction started");
        Ok(tx)
    }

    /// 提交事务
    pub async fn commit(tx: Transaction<'static, Postgres>) -> AppResult<()> {
        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {}", e)))?;

        debug!("Transaction committed");
        Ok(())
    }

    /// 回滚事务
    pub async fn rollback(tx: Transaction<'static, Postgres>) -> AppResult<()> {
        tx.rollback()
            .await
            .map_err(|e| AppError::database(format!("Failed to rollback transaction: {}", e)))?;

        warn!("Transaction rolled back");
        Ok(())
    }

    /// 根据操作结果提交或回滚
    ///
    /// 操作失败时回滚并返回原始错误；回滚本身失败只记录日志。
    pub async fn finish<T>(
        tx: Transaction<'static, Postgres>,
        result: AppResult<T>,
    ) -> AppResult<T> {
        match result {
            Ok(value) => {
                Self::commit(tx).await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = Self::rollback(tx).await {
                    warn!(error = %rollback_err, "Rollback after failed operation also failed");
                }
                Err(e)
            }
        }
    }
}
