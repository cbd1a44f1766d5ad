// ==========================================
// 实验室设备导入 - 导入模板导出
// ==========================================
// 职责: 生成旧版台账列布局的示例文件，仅作为输入格式说明
// 格式: .xlsx（rust_xlsxwriter）/ .csv
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::legacy_columns;
use crate::importer::file_parser::SpreadsheetFormat;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use tracing::info;

/// 模板示例行
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateRow {
    pub s_no: u32,
    pub equipment: &'static str,
    pub make: &'static str,
    pub description: &'static str,
    pub qty: u32,
    pub cost: &'static str,
    pub purchase_date: &'static str,
    pub stock_register_page: &'static str,
}

pub const SAMPLE_ROWS: [TemplateRow; 5] = [
    TemplateRow {
        s_no: 1,
        equipment: "Desktop System",
        make: "HP",
        description: "Intel i5, 8GB RAM, 500GB HDD",
        qty: 2,
        cost: "63,998 (2*31,999)",
        purchase_date: "08.11.2011",
        stock_register_page: "12",
    },
    TemplateRow {
        s_no: 2,
        equipment: "Projector",
        make: "Epson",
        description: "EB-X41 3LCD, 3600 lumens",
        qty: 1,
        cost: "45,500",
        purchase_date: "15.03.2012",
        stock_register_page: "14",
    },
    TemplateRow {
        s_no: 3,
        equipment: "Laser Printer",
        make: "Canon",
        description: "LBP2900B monochrome",
        qty: 1,
        cost: "8,999",
        purchase_date: "21.06.2013",
        stock_register_page: "15",
    },
    TemplateRow {
        s_no: 4,
        equipment: "Network Switch",
        make: "Cisco",
        description: "24-port managed gigabit switch",
        qty: 1,
        cost: "25,000",
        purchase_date: "02.01.2014",
        stock_register_page: "18",
    },
    TemplateRow {
        s_no: 5,
        equipment: "Compound Microscope",
        make: "Olympus",
        description: "CX23 binocular, LED illumination",
        qty: 3,
        cost: "1,35,000 (3*45,000)",
        purchase_date: "10.07.2015",
        stock_register_page: "21",
    },
];

const COLUMN_WIDTHS: [f64; 8] = [8.0, 24.0, 12.0, 36.0, 6.0, 22.0, 16.0, 22.0];

// ==========================================
// TemplateExporter
// ==========================================
#[derive(Debug, Default)]
pub struct TemplateExporter;

impl TemplateExporter {
    pub fn new() -> Self {
        Self
    }

    /// 生成 .xlsx 字节
    pub fn to_xlsx_bytes(&self) -> ImportResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Equipment")?;

        for (col, header) in legacy_columns::ALL.iter().enumerate() {
            let col = col as u16;
            sheet.write_string_with_format(0, col, *header, &header_format)?;
            sheet.set_column_width(col, COLUMN_WIDTHS[col as usize])?;
        }

        for (idx, row) in SAMPLE_ROWS.iter().enumerate() {
            let r = idx as u32 + 1;
            sheet.write_number(r, 0, row.s_no as f64)?;
            sheet.write_string(r, 1, row.equipment)?;
            sheet.write_string(r, 2, row.make)?;
            sheet.write_string(r, 3, row.description)?;
            sheet.write_number(r, 4, row.qty as f64)?;
            sheet.write_string(r, 5, row.cost)?;
            sheet.write_string(r, 6, row.purchase_date)?;
            sheet.write_string(r, 7, row.stock_register_page)?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    /// 生成 .csv 字节
    pub fn to_csv_bytes(&self) -> ImportResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(legacy_columns::ALL)?;

        for row in SAMPLE_ROWS.iter() {
            writer.write_record([
                row.s_no.to_string().as_str(),
                row.equipment,
                row.make,
                row.description,
                row.qty.to_string().as_str(),
                row.cost,
                row.purchase_date,
                row.stock_register_page,
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| ImportError::TemplateError(e.to_string()))
    }

    /// 按扩展名写出模板文件
    pub async fn export_to_path(&self, path: &Path) -> ImportResult<SpreadsheetFormat> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let format = match SpreadsheetFormat::from_extension(ext) {
            Some(SpreadsheetFormat::Xlsx) => SpreadsheetFormat::Xlsx,
            Some(SpreadsheetFormat::Csv) => SpreadsheetFormat::Csv,
            _ => return Err(ImportError::UnsupportedFormat(ext.to_string())),
        };

        let bytes = match format {
            SpreadsheetFormat::Csv => self.to_csv_bytes()?,
            _ => self.to_xlsx_bytes()?,
        };
        tokio::fs::write(path, &bytes).await?;

        info!(path = %path.display(), bytes = bytes.len(), "导入模板已生成");
        Ok(format)
    }
}
