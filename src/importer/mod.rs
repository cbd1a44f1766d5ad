// ==========================================
// 实验室设备导入 - 导入层
// ==========================================
// 职责: 电子表格 → 候选设备 → 校验 → 批量创建
// 支持: Excel (.xlsx/.xls), CSV
// ==========================================

// 模块声明
pub mod bulk_import_client;
pub mod data_cleaner;
pub mod defaults;
pub mod dq_validator;
pub mod equipment_importer_impl;
pub mod equipment_importer_trait;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod import_flow;
pub mod template;

// 重导出核心类型
pub use bulk_import_client::HttpBulkImportClient;
pub use data_cleaner::DataCleaner;
pub use defaults::{DefaultRule, DefaultTrigger, ImportDefaults};
pub use dq_validator::DqValidator;
pub use equipment_importer_impl::EquipmentImporterImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{FieldMapper, RowShape};
pub use file_parser::{AcquiredFile, CsvParser, ExcelParser, SpreadsheetFormat, UniversalFileParser};
pub use import_flow::{ImportPreview, ImportStep, PreparedBatch};
pub use template::TemplateExporter;

// 重导出 Trait 接口
pub use equipment_importer_trait::{
    BulkImportClient, EquipmentImporter, EquipmentValidator, FileParser, RowTransformer,
    TransformContext,
};
