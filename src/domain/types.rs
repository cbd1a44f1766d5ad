// ==========================================
// 实验室设备导入 - 领域类型定义
// ==========================================
// 职责: 设备类别 / 设备状态 / 设备成色 三个固定枚举
// 序列化格式: snake_case (与设备库字段值一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 枚举解析失败（携带原始文本）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant: {}", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

// ==========================================
// 设备类别 (Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Computer,
    Projector,
    Printer,
    NetworkEquipment,
    Microscope,
    LabEquipment,
    Furniture,
    Software,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Computer,
        Category::Projector,
        Category::Printer,
        Category::NetworkEquipment,
        Category::Microscope,
        Category::LabEquipment,
        Category::Furniture,
        Category::Software,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Computer => "computer",
            Category::Projector => "projector",
            Category::Printer => "printer",
            Category::NetworkEquipment => "network_equipment",
            Category::Microscope => "microscope",
            Category::LabEquipment => "lab_equipment",
            Category::Furniture => "furniture",
            Category::Software => "software",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

// ==========================================
// 设备状态 (Equipment Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    Available,   // 可用
    InUse,       // 使用中
    Maintenance, // 维护中
    Retired,     // 已报废
}

impl EquipmentStatus {
    pub const ALL: [EquipmentStatus; 4] = [
        EquipmentStatus::Available,
        EquipmentStatus::InUse,
        EquipmentStatus::Maintenance,
        EquipmentStatus::Retired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Available => "available",
            EquipmentStatus::InUse => "in_use",
            EquipmentStatus::Maintenance => "maintenance",
            EquipmentStatus::Retired => "retired",
        }
    }
}

impl fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EquipmentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EquipmentStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s.trim())
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

// ==========================================
// 设备成色 (Condition Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionStatus {
    Excellent,
    Good,
    Fair,
    Poor,
    Damaged,
}

impl ConditionStatus {
    pub const ALL: [ConditionStatus; 5] = [
        ConditionStatus::Excellent,
        ConditionStatus::Good,
        ConditionStatus::Fair,
        ConditionStatus::Poor,
        ConditionStatus::Damaged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionStatus::Excellent => "excellent",
            ConditionStatus::Good => "good",
            ConditionStatus::Fair => "fair",
            ConditionStatus::Poor => "poor",
            ConditionStatus::Damaged => "damaged",
        }
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConditionStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s.trim())
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}
