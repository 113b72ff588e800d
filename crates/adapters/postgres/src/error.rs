//! sqlx 错误到 AppError 的映射

use storefront_errors::AppError;

/// PostgreSQL unique_violation
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// 将 sqlx 错误转换为 AppError，`context` 描述失败的操作
///
/// 唯一键冲突映射为 `Conflict`，其余错误（包括外键冲突）保留驱动信息映射为 `Database`。
pub fn map_sqlx_error(context: &str, error: sqlx::Error) -> AppError {
    match constraint_code(&error).as_deref() {
        Some(UNIQUE_VIOLATION) => AppError::conflict(format!("{}: {}", context, error)),
        _ => AppError::database(format!("{}: {}", context, error)),
    }
}

/// 是否为外键约束冲突
pub fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    constraint_code(error).as_deref() == Some(FOREIGN_KEY_VIOLATION)
}

fn constraint_code(error: &sqlx::Error) -> Option<String> {
    match error {
        sqlx::Error::Database(db_err) => db_err.code().map(|code| code.into_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_error_maps_to_database() {
        let err = map_sqlx_error("Failed to find order", sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Database(_)));
        assert!(err.to_string().contains("Failed to find order"));
    }

    #[test]
    fn test_pool_timeout_is_not_fk_violation() {
        assert!(!is_foreign_key_violation(&sqlx::Error::PoolTimedOut));
    }
}
