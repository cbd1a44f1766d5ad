// ==========================================
// 实验室设备导入 - 导入流程状态
// ==========================================
// 职责: 显式的有限状态值，替代散落的界面状态
// 状态: Uploading → PreviewValidating → Importing
// 每次转移消费当前状态，返回下一状态及其载荷
// ==========================================

use crate::domain::{EquipmentPayload, ImportSummary, Lab, ValidationOutcome};
use serde::Serialize;

/// 完成百分比
pub const PROGRESS_DONE: u8 = 100;

// ==========================================
// ImportPreview - 预览载荷
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportPreview {
    pub batch_id: String,
    pub file_name: String,
    pub outcomes: Vec<ValidationOutcome>,
    pub summary: ImportSummary,
    #[serde(skip)]
    pub labs: Vec<Lab>,
}

impl ImportPreview {
    pub fn new(
        batch_id: String,
        file_name: String,
        outcomes: Vec<ValidationOutcome>,
        labs: Vec<Lab>,
    ) -> Self {
        let summary = ImportSummary::from_outcomes(&outcomes);
        Self {
            batch_id,
            file_name,
            outcomes,
            summary,
            labs,
        }
    }

    pub fn valid_outcomes(&self) -> impl Iterator<Item = &ValidationOutcome> {
        self.outcomes.iter().filter(|o| o.is_valid())
    }

    pub fn invalid_outcomes(&self) -> impl Iterator<Item = &ValidationOutcome> {
        self.outcomes.iter().filter(|o| !o.is_valid())
    }
}

// ==========================================
// PreparedBatch - 待提交批次
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedBatch {
    pub batch_id: String,
    pub summary: ImportSummary,
    pub payloads: Vec<EquipmentPayload>,
}

// ==========================================
// ImportStep - 流程状态
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ImportStep {
    #[default]
    Uploading,
    PreviewValidating(ImportPreview),
    Importing(PreparedBatch),
}

impl ImportStep {
    pub fn name(&self) -> &'static str {
        match self {
            ImportStep::Uploading => "uploading",
            ImportStep::PreviewValidating(_) => "preview_validating",
            ImportStep::Importing(_) => "importing",
        }
    }

    /// 界面进度百分比
    pub fn progress(&self) -> u8 {
        match self {
            ImportStep::Uploading => 0,
            ImportStep::PreviewValidating(_) => 50,
            ImportStep::Importing(_) => 75,
        }
    }

    /// 放弃当前载荷，回到文件选择
    pub fn reset(self) -> Self {
        ImportStep::Uploading
    }
}
