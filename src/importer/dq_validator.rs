// ==========================================
// 实验室设备导入 - 数据质量校验器
// ==========================================
// 职责: 行级校验，所有规则独立执行（不短路）
// - ERROR: 阻断该行导入
// - WARNING: 仅提示，不阻断
// ==========================================

use crate::domain::{
    Category, ConditionStatus, EquipmentCandidate, EquipmentStatus, Lab, ValidationOutcome,
};
use crate::i18n::{t, t_with_args};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::equipment_importer_trait::EquipmentValidator;

pub struct DqValidator {
    cleaner: DataCleaner,
}

impl Default for DqValidator {
    fn default() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }
}

impl DqValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 阻断级规则
    fn collect_errors(&self, c: &EquipmentCandidate, labs: &[Lab]) -> Vec<String> {
        let mut errors = Vec::new();

        // 必填
        if c.name.trim().is_empty() {
            errors.push(t("validation.name_required"));
        }

        // 类别
        let category = c.category.trim();
        if category.is_empty() {
            errors.push(t("validation.category_required"));
        } else if category.parse::<Category>().is_err() {
            errors.push(t_with_args("validation.invalid_category", &[("value", category)]));
        }

        // 实验室引用（仅当引用列表非空）
        let lab_id = c.lab_id.trim();
        if !lab_id.is_empty() && !labs.is_empty() {
            let exists = self
                .cleaner
                .parse_lab_id(lab_id)
                .map(|id| labs.iter().any(|lab| lab.id == id))
                .unwrap_or(false);
            if !exists {
                errors.push(t_with_args("validation.lab_not_found", &[("value", lab_id)]));
            }
        }

        // 枚举
        let status = c.status.trim();
        if !status.is_empty() && status.parse::<EquipmentStatus>().is_err() {
            errors.push(t_with_args("validation.invalid_status", &[("value", status)]));
        }

        let condition = c.condition_status.trim();
        if !condition.is_empty() && condition.parse::<ConditionStatus>().is_err() {
            errors.push(t_with_args(
                "validation.invalid_condition",
                &[("value", condition)],
            ));
        }

        // 日期
        if let Some(date) = c.purchase_date.as_deref().filter(|d| !d.trim().is_empty()) {
            if self.cleaner.parse_calendar_date(date).is_none() {
                errors.push(t_with_args(
                    "validation.invalid_purchase_date",
                    &[("value", date)],
                ));
            }
        }

        if let Some(date) = c.warranty_expiry.as_deref().filter(|d| !d.trim().is_empty()) {
            if self.cleaner.parse_calendar_date(date).is_none() {
                errors.push(t_with_args(
                    "validation.invalid_warranty_expiry",
                    &[("value", date)],
                ));
            }
        }

        // 金额非负
        if c.purchase_price.as_ref().and_then(|v| v.as_f64()).is_some_and(|v| v < 0.0) {
            errors.push(t("validation.negative_purchase_price"));
        }
        if c.current_value.as_ref().and_then(|v| v.as_f64()).is_some_and(|v| v < 0.0) {
            errors.push(t("validation.negative_current_value"));
        }

        errors
    }

    /// 提示级规则
    fn collect_warnings(&self, c: &EquipmentCandidate) -> Vec<String> {
        let mut warnings = Vec::new();

        if c.serial_number.trim().is_empty() {
            warnings.push(t("validation.serial_missing"));
        }
        if c.lab_id.trim().is_empty() {
            warnings.push(t("validation.lab_missing"));
        }
        if c.manufacturer.trim().is_empty() {
            warnings.push(t("validation.manufacturer_missing"));
        }
        if c.model.trim().is_empty() {
            warnings.push(t("validation.model_missing"));
        }
        if c.description.as_deref().map_or(true, |d| d.trim().is_empty()) {
            warnings.push(t("validation.description_missing"));
        }
        if let Some(price) = c.purchase_price.as_ref().filter(|v| !v.is_blank()) {
            if price.as_f64().is_none() {
                warnings.push(t_with_args(
                    "validation.price_not_numeric",
                    &[("value", &price.as_text())],
                ));
            }
        }

        warnings
    }
}

impl EquipmentValidator for DqValidator {
    fn validate_candidate(
        &self,
        row_number: usize,
        candidate: EquipmentCandidate,
        labs: &[Lab],
    ) -> ValidationOutcome {
        let errors = self.collect_errors(&candidate, labs);
        let warnings = self.collect_warnings(&candidate);
        ValidationOutcome::new(row_number, candidate, errors, warnings)
    }
}
