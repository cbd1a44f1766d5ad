// ==========================================
// 实验室设备导入 - API 层错误类型
// ==========================================
// 职责: 将导入层错误转换为面向用户的错误消息
// 面向用户的文本经 i18n 输出
// ==========================================

use crate::i18n::{t, t_with_args};
use crate::importer::error::ImportError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 导入错误（文本已本地化）
    // ==========================================
    /// 文件无法解码或为空，流程回到文件选择
    #[error("{0}")]
    DecodeError(String),

    /// 所有行均未通过校验，未发起网络请求
    #[error("{0}")]
    NoValidRows(String),

    /// 网络或协作方错误
    #[error("{0}")]
    SubmissionError(String),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 配置与数据访问错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 是否应让用户重新选择文件
    pub fn resets_flow(&self) -> bool {
        matches!(self, ApiError::DecodeError(_))
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            // 文件获取
            ImportError::FileNotFound(path) => {
                ApiError::NotFound(t_with_args("import.file_not_found", &[("path", &path)]))
            }
            ImportError::UnsupportedFormat(value) => ApiError::InvalidInput(t_with_args(
                "import.unsupported_format",
                &[("value", &value)],
            )),
            ImportError::FileTooLarge { size, limit } => ApiError::InvalidInput(t_with_args(
                "import.file_too_large",
                &[("size", &size.to_string()), ("limit", &limit.to_string())],
            )),
            ImportError::FileReadError(msg) => ApiError::ImportError(msg),

            // 解码
            ImportError::EmptyFile => ApiError::DecodeError(t("import.empty_file")),
            ImportError::TooManyRows { rows, limit } => ApiError::DecodeError(t_with_args(
                "import.too_many_rows",
                &[("rows", &rows.to_string()), ("limit", &limit.to_string())],
            )),
            err @ (ImportError::ExcelParseError(_) | ImportError::CsvParseError(_)) => {
                ApiError::DecodeError(err.to_string())
            }

            // 导入
            ImportError::NoValidRows => ApiError::NoValidRows(t("import.no_valid_rows")),
            ImportError::SubmissionError(msg) => ApiError::SubmissionError(msg),
            err @ ImportError::InvalidTransition { .. } => ApiError::InternalError(err.to_string()),

            // 配置
            err @ (ImportError::ConfigReadError { .. } | ImportError::ConfigValueError { .. }) => {
                ApiError::ConfigError(err.to_string())
            }
            ImportError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),

            // 通用
            ImportError::TemplateError(msg) => ApiError::ImportError(msg),
            ImportError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_message() {
        let err: ApiError = ImportError::EmptyFile.into();
        assert!(err.resets_flow());
        assert_eq!(err.to_string(), "The file appears to be empty");
    }

    #[test]
    fn test_submission_message_surfaced_verbatim() {
        let err: ApiError = ImportError::SubmissionError("Token expired".to_string()).into();
        assert!(!err.resets_flow());
        assert_eq!(err.to_string(), "Token expired");
    }

    #[test]
    fn test_decode_errors_reset_flow() {
        let err: ApiError = ImportError::CsvParseError("bad quote".to_string()).into();
        assert!(err.resets_flow());
        let err: ApiError = ImportError::TooManyRows { rows: 1001, limit: 1000 }.into();
        assert!(err.resets_flow());
        assert!(err.to_string().contains("1001"));
    }

    #[test]
    fn test_no_valid_rows_message() {
        let err: ApiError = ImportError::NoValidRows.into();
        assert_eq!(err.to_string(), "No valid rows to import");
    }
}
