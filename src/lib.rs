// ==========================================
// 实验室设备导入 - 核心库
// ==========================================
// 系统定位: 电子表格设备台账 → 批量创建接口
// 流程: 文件获取 → 表格解码 → 行转换 → 行校验 → 批量提交 → 报告
// 技术栈: Rust + calamine/csv + SQLite 配置 + reqwest
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 解码 / 转换 / 校验 / 提交
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 命令行调用的业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Category, ConditionStatus, EquipmentStatus};

// 领域实体
pub use domain::{
    CellValue, EquipmentCandidate, EquipmentPayload, ImportBatchResult, ImportReport,
    ImportSummary, Lab, RawRow, ValidationOutcome,
};

// 导入器
pub use importer::{
    AcquiredFile, EquipmentImporter, EquipmentImporterImpl, HttpBulkImportClient, ImportError,
    ImportResult, ImportStep,
};

// API
pub use api::{ApiError, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
