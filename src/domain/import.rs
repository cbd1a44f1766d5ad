// ==========================================
// 实验室设备导入 - 导入结果模型
// ==========================================
// 职责: 行级校验结果 / 批量提交结果 / 面向用户的导入报告
// ==========================================

use crate::domain::equipment::EquipmentCandidate;
use serde::{Deserialize, Serialize};

// ==========================================
// ValidationOutcome - 行级校验结果
// ==========================================
// errors 阻断导入，warnings 不阻断
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub row_number: usize, // 1-based，与输入顺序一致
    pub candidate: EquipmentCandidate,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationOutcome {
    pub fn new(
        row_number: usize,
        candidate: EquipmentCandidate,
        errors: Vec<String>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            row_number,
            candidate,
            errors,
            warnings,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// ==========================================
// ImportSummary - 预览统计
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub warning_rows: usize, // 有警告的行（含有效行与无效行）
}

impl ImportSummary {
    pub fn from_outcomes(outcomes: &[ValidationOutcome]) -> Self {
        let valid_rows = outcomes.iter().filter(|o| o.is_valid()).count();
        Self {
            total_rows: outcomes.len(),
            valid_rows,
            invalid_rows: outcomes.len() - valid_rows,
            warning_rows: outcomes.iter().filter(|o| !o.warnings.is_empty()).count(),
        }
    }
}

// ==========================================
// ImportBatchResult - 批量创建接口返回
// ==========================================
// 由外部协作方产出，原样透出
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportBatchResult {
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

// ==========================================
// ImportReport - 导入报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub summary: ImportSummary,
    pub submitted: usize,
    pub result: ImportBatchResult,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}
