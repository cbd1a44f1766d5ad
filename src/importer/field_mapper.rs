// ==========================================
// 实验室设备导入 - 字段映射器（行转换器）
// ==========================================
// 职责: 原始行 → 候选设备记录
// 两种源格式:
// - 旧版台账 (S.No / Equipments / Make ...): 推断类别、解析金额与日期、生成序列号
// - 标准格式 (列名即字段名): 透传 + 缺省值，未知列原样保留
// ==========================================

use crate::domain::{CellValue, EquipmentCandidate, RawRow};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::equipment_importer_trait::{RowTransformer, TransformContext};

/// 旧版台账列名
pub mod legacy_columns {
    pub const S_NO: &str = "S.No";
    pub const EQUIPMENTS: &str = "Equipments";
    pub const MAKE: &str = "Make";
    pub const DESCRIPTION: &str = "System Description";
    pub const QTY: &str = "Qty";
    pub const COST: &str = "Cost in Rs";
    pub const PURCHASE_DATE: &str = "Date of Purchase";
    pub const STOCK_REGISTER_PAGE: &str = "Stock Register Page No";

    /// 模板表头顺序
    pub const ALL: [&str; 8] = [
        S_NO,
        EQUIPMENTS,
        MAKE,
        DESCRIPTION,
        QTY,
        COST,
        PURCHASE_DATE,
        STOCK_REGISTER_PAGE,
    ];

    /// 旧版格式识别签名
    pub const SIGNATURE: [&str; 3] = [S_NO, EQUIPMENTS, MAKE];
}

/// 标准格式字段名（其余列视为附加列）
pub const CANONICAL_FIELDS: [&str; 16] = [
    "name",
    "description",
    "serial_number",
    "model",
    "manufacturer",
    "category",
    "lab_id",
    "location_details",
    "status",
    "condition_status",
    "purchase_price",
    "current_value",
    "purchase_date",
    "warranty_expiry",
    "quantity",
    "stock_register_page",
];

// ==========================================
// RowShape - 行格式（每行判定一次）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowShape {
    Legacy,
    Canonical,
}

impl RowShape {
    pub fn detect(row: &RawRow) -> Self {
        if legacy_columns::SIGNATURE
            .iter()
            .all(|col| row.has_column(col))
        {
            RowShape::Legacy
        } else {
            RowShape::Canonical
        }
    }
}

pub struct FieldMapper {
    cleaner: DataCleaner,
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }
}

impl RowTransformer for FieldMapper {
    fn map_to_candidate(
        &self,
        row: &RawRow,
        row_number: usize,
        ctx: &TransformContext<'_>,
    ) -> EquipmentCandidate {
        match RowShape::detect(row) {
            RowShape::Legacy => self.map_legacy(row, row_number, ctx),
            RowShape::Canonical => self.map_canonical(row, row_number, ctx),
        }
    }
}

impl FieldMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// 批量转换（行号 1-based）
    pub fn map_rows(&self, rows: &[RawRow], ctx: &TransformContext<'_>) -> Vec<EquipmentCandidate> {
        rows.iter()
            .enumerate()
            .map(|(idx, row)| self.map_to_candidate(row, idx + 1, ctx))
            .collect()
    }

    /// 旧版台账行
    fn map_legacy(
        &self,
        row: &RawRow,
        row_number: usize,
        ctx: &TransformContext<'_>,
    ) -> EquipmentCandidate {
        use legacy_columns::*;

        let defaults = ctx.defaults;
        let name = row.text(EQUIPMENTS).unwrap_or_default();
        let make = row.text(MAKE);

        let quantity = self
            .cleaner
            .parse_positive_int(row.get(QTY))
            .unwrap_or(defaults.quantity);

        let cost = self.cleaner.parse_legacy_cost(row.get(COST));
        let purchase_price = (cost / quantity as f64).floor();
        let current_value = (purchase_price * defaults.depreciation_rate).floor();

        let sequence = row
            .get(S_NO)
            .and_then(|v| self.cleaner.parse_positive_int(Some(v)))
            .map(|n| n as usize)
            .unwrap_or(row_number);
        let serial_number = format!(
            "{}-{:03}-{}",
            self.cleaner
                .serial_make_token(make.as_deref(), &defaults.legacy_make),
            sequence,
            ctx.year
        );

        EquipmentCandidate {
            category: self.cleaner.infer_category(&name).to_string(),
            name,
            description: row.text(DESCRIPTION),
            serial_number,
            model: String::new(),
            manufacturer: make.unwrap_or_default(),
            lab_id: defaults.default_lab_id(ctx.labs).to_string(),
            location_details: String::new(),
            status: defaults.status.to_string(),
            condition_status: defaults.condition.to_string(),
            purchase_price: Some(CellValue::Number(purchase_price)),
            current_value: Some(CellValue::Number(current_value)),
            purchase_date: row
                .text(PURCHASE_DATE)
                .and_then(|d| self.cleaner.parse_legacy_date(&d)),
            warranty_expiry: None,
            quantity,
            stock_register_page: row.text(STOCK_REGISTER_PAGE),
            extra: Vec::new(),
        }
    }

    /// 标准格式行
    fn map_canonical(
        &self,
        row: &RawRow,
        row_number: usize,
        ctx: &TransformContext<'_>,
    ) -> EquipmentCandidate {
        let defaults = ctx.defaults;
        let non_blank = |key: &str| row.get(key).filter(|v| !v.is_blank()).cloned();

        let extra = row
            .iter()
            .filter(|(label, _)| !CANONICAL_FIELDS.contains(label))
            .map(|(label, value)| (label.to_string(), value.clone()))
            .collect();

        EquipmentCandidate {
            name: row.text("name").unwrap_or_else(|| defaults.name.clone()),
            description: row.text("description"),
            serial_number: row
                .text("serial_number")
                .unwrap_or_else(|| defaults.auto_serial(row_number)),
            model: row.text("model").unwrap_or_default(),
            manufacturer: row.text("manufacturer").unwrap_or_default(),
            category: row
                .text("category")
                .unwrap_or_else(|| defaults.category.to_string()),
            lab_id: row.text("lab_id").unwrap_or_default(),
            location_details: row.text("location_details").unwrap_or_default(),
            status: row
                .text("status")
                .unwrap_or_else(|| defaults.status.to_string()),
            condition_status: row
                .text("condition_status")
                .unwrap_or_else(|| defaults.condition.to_string()),
            purchase_price: non_blank("purchase_price"),
            current_value: non_blank("current_value"),
            purchase_date: row.text("purchase_date"),
            warranty_expiry: row.text("warranty_expiry"),
            quantity: self
                .cleaner
                .parse_positive_int(row.get("quantity"))
                .unwrap_or(defaults.quantity),
            stock_register_page: row.text("stock_register_page"),
            extra,
        }
    }
}
