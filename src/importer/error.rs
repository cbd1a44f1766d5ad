// ==========================================
// 实验室设备导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 文件获取 / 解码 / 无有效行 / 提交失败 / 流程 / 配置
// 行级校验错误不在此处，累积在 ValidationOutcome 中
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件获取 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("文件过大: {size} 字节，上限 {limit} 字节")]
    FileTooLarge { size: u64, limit: u64 },

    // ===== 解码 (DecodeError) =====
    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("文件内容为空")]
    EmptyFile,

    #[error("数据行过多: {rows} 行，上限 {limit} 行")]
    TooManyRows { rows: usize, limit: usize },

    // ===== 导入 =====
    #[error("没有可导入的有效行")]
    NoValidRows,

    #[error("批量导入提交失败: {0}")]
    SubmissionError(String),

    #[error("导入流程状态错误: 期望 {expected}，实际 {actual}")]
    InvalidTransition {
        expected: &'static str,
        actual: &'static str,
    },

    // ===== 配置 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    // ===== 模板 =====
    #[error("模板生成失败: {0}")]
    TemplateError(String),

    // ===== 通用 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ImportError {
    /// 是否为解码阶段错误（流程应回到文件选择）
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            ImportError::ExcelParseError(_)
                | ImportError::CsvParseError(_)
                | ImportError::EmptyFile
                | ImportError::TooManyRows { .. }
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ImportError::FileNotFound(err.to_string()),
            _ => ImportError::FileReadError(err.to_string()),
        }
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::DatabaseQueryError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<calamine::XlsError>
impl From<calamine::XlsError> for ImportError {
    fn from(err: calamine::XlsError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<reqwest::Error>
impl From<reqwest::Error> for ImportError {
    fn from(err: reqwest::Error) -> Self {
        ImportError::SubmissionError(err.to_string())
    }
}

// 实现 From<rust_xlsxwriter::XlsxError>
impl From<rust_xlsxwriter::XlsxError> for ImportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ImportError::TemplateError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
