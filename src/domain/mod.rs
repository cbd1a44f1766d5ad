// ==========================================
// 实验室设备导入 - 领域模型层
// ==========================================
// 职责: 定义导入管道的领域实体与枚举
// 红线: 不含文件解析逻辑，不含网络逻辑
// ==========================================

pub mod equipment;
pub mod import;
pub mod types;

// 重导出核心类型
pub use equipment::{CellValue, EquipmentCandidate, EquipmentPayload, Lab, RawRow};
pub use import::{ImportBatchResult, ImportReport, ImportSummary, ValidationOutcome};
pub use types::{Category, ConditionStatus, EquipmentStatus, UnknownVariant};
