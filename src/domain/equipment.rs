// ==========================================
// 实验室设备导入 - 设备领域模型
// ==========================================
// 职责: 原始行 (RawRow) → 候选设备 (EquipmentCandidate) → 提交载荷 (EquipmentPayload)
// 生命周期: 仅在一次导入流程内存在
// ==========================================

use crate::domain::types::{Category, ConditionStatus, EquipmentStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CellValue - 单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// 空单元格或纯空白文本
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// 文本化（整数值的浮点数不带小数部分）
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => format_number(*n),
        }
    }

    /// 数值解释：数字单元格直接返回，文本单元格尝试解析
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            CellValue::Empty => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Empty => serde_json::Value::Null,
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
            CellValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// ==========================================
// RawRow - 原始行记录
// ==========================================
// 列名 → 单元格值，保持表头顺序
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, value: CellValue) {
        self.cells.push((label.into(), value));
    }

    pub fn with(mut self, label: impl Into<String>, value: CellValue) -> Self {
        self.push(label, value);
        self
    }

    pub fn get(&self, label: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v)
    }

    /// 取非空文本值（已 TRIM）
    pub fn text(&self, label: &str) -> Option<String> {
        self.get(label)
            .filter(|v| !v.is_blank())
            .map(|v| v.as_text())
    }

    pub fn has_column(&self, label: &str) -> bool {
        self.cells.iter().any(|(l, _)| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(l, v)| (l.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 所有单元格均为空
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.is_blank())
    }
}

// ==========================================
// Lab - 实验室引用（由调用方提供）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lab {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Lab {
    pub fn new(id: i64) -> Self {
        Self { id, name: None }
    }
}

// ==========================================
// EquipmentCandidate - 候选设备记录
// ==========================================
// 行转换器产出，之后只读
// 校验器需要判定的字段保留转换后的原始文本，由导入器统一做类型收敛
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentCandidate {
    pub name: String,
    pub description: Option<String>,
    pub serial_number: String,
    pub model: String,
    pub manufacturer: String,
    pub category: String,
    pub lab_id: String,
    pub location_details: String,
    pub status: String,
    pub condition_status: String,
    pub purchase_price: Option<CellValue>,
    pub current_value: Option<CellValue>,
    pub purchase_date: Option<String>,
    pub warranty_expiry: Option<String>,
    pub quantity: u32,
    pub stock_register_page: Option<String>,

    // 未识别的附加列，原样保留
    #[serde(default)]
    pub extra: Vec<(String, CellValue)>,
}

impl Default for EquipmentCandidate {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            serial_number: String::new(),
            model: String::new(),
            manufacturer: String::new(),
            category: String::new(),
            lab_id: String::new(),
            location_details: String::new(),
            status: String::new(),
            condition_status: String::new(),
            purchase_price: None,
            current_value: None,
            purchase_date: None,
            warranty_expiry: None,
            quantity: 1,
            stock_register_page: None,
            extra: Vec::new(),
        }
    }
}

// ==========================================
// EquipmentPayload - 批量创建接口载荷
// ==========================================
// 仅由通过校验的候选记录收敛得到
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub serial_number: String,
    pub model: String,
    pub manufacturer: String,
    pub category: Category,
    pub lab_id: i64,
    pub location_details: String,
    pub status: EquipmentStatus,
    pub condition_status: ConditionStatus,
    pub purchase_price: f64,
    pub current_value: f64,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_register_page: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
