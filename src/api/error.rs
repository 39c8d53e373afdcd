// ==========================================
// 供应链碳足迹计算器 - API层错误类型
// ==========================================
// 职责: 定义会话/API 层错误类型,把仓储层技术错误转换为用户可读的错误
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入校验错误
    // ==========================================
    /// 向导步骤校验失败（带逐字段原因）
    #[error("步骤校验失败: step={step}, violations={}", violations.len())]
    ValidationFailed {
        step: String,
        violations: Vec<ValidationViolation>,
    },

    #[error("条目未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("快照序列化失败: {0}")]
    SerializationError(String),

    // ==========================================
    // 导出错误
    // ==========================================
    #[error("报表导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, key } => {
                ApiError::NotFound(format!("{}(key={})不存在", entity, key))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::SerializationError(msg) => ApiError::SerializationError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 校验违规详情
// ==========================================

/// 校验违规详情
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationViolation {
    /// 违规代码（如 MATERIAL_WEIGHT_REQUIRED）
    pub code: String,
    /// 字段路径（如 materials.farmerCotton.farmArea / logistics.entries[0].vehicleType）
    pub field: String,
    /// 本地化后的原因描述
    pub message: String,
}

impl ValidationViolation {
    pub fn new(code: &str, field: impl Into<String>, message: String) -> Self {
        Self {
            code: code.to_string(),
            field: field.into(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "Snapshot".to_string(),
            key: "folkcharm_calc_state_v3".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Snapshot"));
                assert!(msg.contains("folkcharm_calc_state_v3"));
            }
            _ => panic!("Expected NotFound"),
        }

        let api_err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(api_err, ApiError::DatabaseConnectionError(msg) if msg.contains("poisoned")));

        let api_err: ApiError = RepositoryError::SerializationError("eof".to_string()).into();
        assert!(matches!(api_err, ApiError::SerializationError(msg) if msg == "eof"));

        let api_err: ApiError =
            RepositoryError::UniqueConstraintViolation("state_kv.key".to_string()).into();
        assert!(matches!(api_err, ApiError::DatabaseError(msg) if msg.contains("state_kv.key")));
    }

    #[test]
    fn test_validation_failed_display_counts_violations() {
        let err = ApiError::ValidationFailed {
            step: "materials".to_string(),
            violations: vec![
                ValidationViolation::new("A", "x", "a".to_string()),
                ValidationViolation::new("B", "y", "b".to_string()),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("materials"));
        assert!(text.contains("violations=2"));
    }
}
