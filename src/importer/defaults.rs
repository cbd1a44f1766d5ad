// ==========================================
// 实验室设备导入 - 字段默认值表
// ==========================================
// 职责: 字段 → 默认值 → 触发条件 的唯一来源
// 使用方: 行转换器（填充候选记录）、导入器（类型收敛）
// ==========================================

use crate::config::ImportSettings;
use crate::domain::{Category, ConditionStatus, EquipmentStatus, Lab};
use serde::Serialize;
use std::fmt;

// ==========================================
// DefaultTrigger - 默认值触发条件
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultTrigger {
    Blank,        // 源值缺失或空白
    NotPositive,  // 缺失、无法解析或 <= 0
    NotNumeric,   // 缺失或无法解析为数值
    NoLabs,       // 实验室列表为空
    LegacyRow,    // 旧版台账行（源格式无此列）
}

impl fmt::Display for DefaultTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DefaultTrigger::Blank => "blank",
            DefaultTrigger::NotPositive => "missing or not positive",
            DefaultTrigger::NotNumeric => "missing or not numeric",
            DefaultTrigger::NoLabs => "labs list empty",
            DefaultTrigger::LegacyRow => "legacy row",
        };
        f.write_str(text)
    }
}

// ==========================================
// DefaultRule - 默认值规则（用于展示）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultRule {
    pub field: &'static str,
    pub value: String,
    pub trigger: DefaultTrigger,
}

// ==========================================
// ImportDefaults - 默认值集合
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDefaults {
    pub name: String,
    pub serial_prefix: String,
    pub category: Category,
    pub status: EquipmentStatus,
    pub condition: ConditionStatus,
    pub quantity: u32,
    pub fallback_lab_id: i64,
    pub depreciation_rate: f64,
    pub legacy_make: String,
}

impl Default for ImportDefaults {
    fn default() -> Self {
        Self {
            name: "Unknown Equipment".to_string(),
            serial_prefix: "AUTO".to_string(),
            category: Category::LabEquipment,
            status: EquipmentStatus::Available,
            condition: ConditionStatus::Good,
            quantity: 1,
            fallback_lab_id: 1,
            depreciation_rate: 0.8,
            legacy_make: "GENERIC".to_string(),
        }
    }
}

impl ImportDefaults {
    /// 按配置快照构建（回退实验室 / 折旧率可配置）
    pub fn from_settings(settings: &ImportSettings) -> Self {
        Self {
            fallback_lab_id: settings.fallback_lab_id,
            depreciation_rate: settings.depreciation_rate,
            ..Self::default()
        }
    }

    /// 默认实验室：列表首项，否则回退配置值
    pub fn default_lab_id(&self, labs: &[Lab]) -> i64 {
        labs.first().map(|l| l.id).unwrap_or(self.fallback_lab_id)
    }

    /// 自动序列号：AUTO-{行号}
    pub fn auto_serial(&self, row_number: usize) -> String {
        format!("{}-{}", self.serial_prefix, row_number)
    }

    /// 默认值规则表
    pub fn rules(&self) -> Vec<DefaultRule> {
        vec![
            DefaultRule {
                field: "name",
                value: self.name.clone(),
                trigger: DefaultTrigger::Blank,
            },
            DefaultRule {
                field: "serial_number",
                value: format!("{}-{{row}}", self.serial_prefix),
                trigger: DefaultTrigger::Blank,
            },
            DefaultRule {
                field: "serial_number",
                value: format!("{{MAKE|{}}}-{{S.No:03}}-{{year}}", self.legacy_make),
                trigger: DefaultTrigger::LegacyRow,
            },
            DefaultRule {
                field: "category",
                value: self.category.to_string(),
                trigger: DefaultTrigger::Blank,
            },
            DefaultRule {
                field: "status",
                value: self.status.to_string(),
                trigger: DefaultTrigger::Blank,
            },
            DefaultRule {
                field: "condition_status",
                value: self.condition.to_string(),
                trigger: DefaultTrigger::Blank,
            },
            DefaultRule {
                field: "quantity",
                value: self.quantity.to_string(),
                trigger: DefaultTrigger::NotPositive,
            },
            DefaultRule {
                field: "lab_id",
                value: "first lab".to_string(),
                trigger: DefaultTrigger::Blank,
            },
            DefaultRule {
                field: "lab_id",
                value: self.fallback_lab_id.to_string(),
                trigger: DefaultTrigger::NoLabs,
            },
            DefaultRule {
                field: "purchase_price",
                value: "0".to_string(),
                trigger: DefaultTrigger::NotNumeric,
            },
            DefaultRule {
                field: "current_value",
                value: format!("purchase_price x {}", self.depreciation_rate),
                trigger: DefaultTrigger::LegacyRow,
            },
        ]
    }
}
