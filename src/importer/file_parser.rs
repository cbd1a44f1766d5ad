// ==========================================
// 实验室设备导入 - 文件获取与表格解码
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 规则: 仅第一个工作表，首行为表头，全空白行跳过
// ==========================================

use crate::domain::{CellValue, RawRow};
use crate::importer::equipment_importer_trait::FileParser;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{Data, Reader, Xls, Xlsx};
use chrono::{Days, NaiveDate};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, warn};

// ==========================================
// SpreadsheetFormat - 接受的文件格式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadsheetFormat {
    Xlsx,
    Xls,
    Csv,
}

impl SpreadsheetFormat {
    /// 按声明的 MIME 类型识别（忽略 ;charset 等参数）
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Some(SpreadsheetFormat::Xlsx)
            }
            "application/vnd.ms-excel" => Some(SpreadsheetFormat::Xls),
            "text/csv" | "application/csv" => Some(SpreadsheetFormat::Csv),
            _ => None,
        }
    }

    /// 按扩展名识别
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" => Some(SpreadsheetFormat::Xlsx),
            "xls" => Some(SpreadsheetFormat::Xls),
            "csv" => Some(SpreadsheetFormat::Csv),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            SpreadsheetFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            SpreadsheetFormat::Xls => "application/vnd.ms-excel",
            SpreadsheetFormat::Csv => "text/csv",
        }
    }
}

// ==========================================
// AcquiredFile - 已读入内存的上传文件
// ==========================================
#[derive(Debug, Clone)]
pub struct AcquiredFile {
    pub file_name: String,
    pub format: SpreadsheetFormat,
    pub bytes: Vec<u8>,
}

impl AcquiredFile {
    /// 按声明的 MIME 类型接收文件
    ///
    /// # 错误
    /// - UnsupportedFormat: MIME 类型不在白名单
    /// - FileTooLarge: 超过大小上限
    pub fn from_bytes(
        file_name: impl Into<String>,
        content_type: &str,
        bytes: Vec<u8>,
        max_bytes: u64,
    ) -> ImportResult<Self> {
        let format = SpreadsheetFormat::from_content_type(content_type)
            .ok_or_else(|| ImportError::UnsupportedFormat(content_type.to_string()))?;

        let size = bytes.len() as u64;
        if size > max_bytes {
            return Err(ImportError::FileTooLarge {
                size,
                limit: max_bytes,
            });
        }

        Ok(Self {
            file_name: file_name.into(),
            format,
            bytes,
        })
    }

    /// 从本地路径读取（MIME 类型由扩展名推断）
    pub async fn read_from_path(path: &Path, max_bytes: u64) -> ImportResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string();
        let format = SpreadsheetFormat::from_extension(&ext)
            .ok_or_else(|| ImportError::UnsupportedFormat(ext.clone()))?;

        let metadata = tokio::fs::metadata(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ImportError::FileNotFound(path.display().to_string()),
            _ => ImportError::FileReadError(e.to_string()),
        })?;
        if metadata.len() > max_bytes {
            return Err(ImportError::FileTooLarge {
                size: metadata.len(),
                limit: max_bytes,
            });
        }

        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Self::from_bytes(file_name, format.content_type(), bytes, max_bytes)
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_rows(&self, file: &AcquiredFile) -> ImportResult<Vec<RawRow>> {
        if file.format != SpreadsheetFormat::Csv {
            return Err(ImportError::UnsupportedFormat(
                file.format.content_type().to_string(),
            ));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file.bytes.as_slice());

        // 读取表头（去掉 UTF-8 BOM）
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(idx, h)| {
                let h = if idx == 0 { h.trim_start_matches('\u{feff}') } else { h };
                h.trim().to_string()
            })
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::EmptyFile);
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row = RawRow::new();

            for (col_idx, header) in headers.iter().enumerate() {
                if header.is_empty() {
                    continue;
                }
                let value = match record.get(col_idx).map(str::trim) {
                    Some(v) if !v.is_empty() => CellValue::Text(v.to_string()),
                    _ => CellValue::Empty,
                };
                row.push(header.clone(), value);
            }

            // 跳过完全空白的行
            if row.is_blank() {
                continue;
            }

            rows.push(row);
        }

        Ok(rows)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_rows(&self, file: &AcquiredFile) -> ImportResult<Vec<RawRow>> {
        let cursor = Cursor::new(file.bytes.as_slice());
        match file.format {
            SpreadsheetFormat::Xlsx => {
                let workbook: Xlsx<_> = Xlsx::new(cursor)?;
                read_first_sheet(workbook)
            }
            SpreadsheetFormat::Xls => {
                let workbook: Xls<_> = Xls::new(cursor)?;
                read_first_sheet(workbook)
            }
            SpreadsheetFormat::Csv => Err(ImportError::UnsupportedFormat(
                file.format.content_type().to_string(),
            )),
        }
    }
}

/// 读取第一个工作表为原始行
fn read_first_sheet<RS, R>(mut workbook: R) -> ImportResult<Vec<RawRow>>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

    // 提取表头（第一行）
    let mut sheet_rows = range.rows();
    let header_row = match sheet_rows.next() {
        Some(r) => r,
        None => return Err(ImportError::EmptyFile),
    };

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell_value(cell).as_text())
        .collect();

    let mut rows = Vec::new();
    for data_row in sheet_rows {
        let mut row = RawRow::new();

        for (col_idx, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let value = data_row
                .get(col_idx)
                .map(cell_value)
                .unwrap_or(CellValue::Empty);
            row.push(header.clone(), value);
        }

        if row.is_blank() {
            continue;
        }

        rows.push(row);
    }

    debug!(sheet = %sheet_name, rows = rows.len(), "工作表读取完成");
    Ok(rows)
}

/// calamine 单元格 → CellValue
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.trim().to_string()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
            Some(date) => CellValue::Text(date.format("%Y-%m-%d").to_string()),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::Error(e) => {
            warn!(error = ?e, "单元格包含错误值，按空值处理");
            CellValue::Empty
        }
        other => CellValue::Text(other.to_string()),
    }
}

/// Excel 可表示的最大日期 9999-12-31 对应的序列号
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

/// Excel 序列日期（1900 体系）→ 日期
///
/// 超出 Excel 日期范围返回 None，由调用方按数值保留
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=EXCEL_MAX_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

// ==========================================
// 通用文件解析器（根据格式自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_raw_rows(&self, file: &AcquiredFile) -> ImportResult<Vec<RawRow>> {
        let rows = match file.format {
            SpreadsheetFormat::Csv => CsvParser.parse_to_raw_rows(file)?,
            SpreadsheetFormat::Xlsx | SpreadsheetFormat::Xls => {
                ExcelParser.parse_to_raw_rows(file)?
            }
        };

        if rows.is_empty() {
            return Err(ImportError::EmptyFile);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{Format, Workbook};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MAX_BYTES: u64 = 10 * 1024 * 1024;

    fn csv_file(content: &str) -> AcquiredFile {
        AcquiredFile::from_bytes("test.csv", "text/csv", content.as_bytes().to_vec(), MAX_BYTES)
            .unwrap()
    }

    #[test]
    fn test_content_type_whitelist() {
        assert_eq!(
            SpreadsheetFormat::from_content_type("text/csv; charset=utf-8"),
            Some(SpreadsheetFormat::Csv)
        );
        assert_eq!(
            SpreadsheetFormat::from_content_type("application/vnd.ms-excel"),
            Some(SpreadsheetFormat::Xls)
        );
        assert_eq!(SpreadsheetFormat::from_content_type("application/pdf"), None);

        let result = AcquiredFile::from_bytes("a.pdf", "application/pdf", vec![1, 2], MAX_BYTES);
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_file_size_limit() {
        let result = AcquiredFile::from_bytes("big.csv", "text/csv", vec![b'a'; 11], 10);
        assert!(matches!(
            result,
            Err(ImportError::FileTooLarge { size: 11, limit: 10 })
        ));
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let file = csv_file("S.No,Equipments,Make\n1,Projector,Epson\n2,Desktop System,HP\n");
        let rows = CsvParser.parse_to_raw_rows(&file).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text("Equipments"), Some("Projector".to_string()));
        assert_eq!(rows[1].text("Make"), Some("HP".to_string()));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows_and_bom() {
        let file = csv_file("\u{feff}name,category\nScope,microscope\n,\nBench,furniture\n");
        let rows = CsvParser.parse_to_raw_rows(&file).unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].has_column("name"));
    }

    #[test]
    fn test_csv_short_row_keeps_all_columns() {
        let file = csv_file("S.No,Equipments,Make\n1,Projector\n");
        let rows = CsvParser.parse_to_raw_rows(&file).unwrap();

        assert!(rows[0].has_column("Make"));
        assert_eq!(rows[0].get("Make"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_universal_parser_empty_sheet() {
        let file = csv_file("name,category\n");
        let result = UniversalFileParser.parse_to_raw_rows(&file);
        assert!(matches!(result, Err(ImportError::EmptyFile)));
    }

    #[test]
    fn test_excel_parser_garbage_payload() {
        let file = AcquiredFile::from_bytes(
            "broken.xlsx",
            SpreadsheetFormat::Xlsx.content_type(),
            b"definitely not a zip archive".to_vec(),
            MAX_BYTES,
        )
        .unwrap();

        let err = UniversalFileParser.parse_to_raw_rows(&file).unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn test_excel_parser_first_sheet_only() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "S.No").unwrap();
        sheet.write_string(0, 1, "Equipments").unwrap();
        sheet.write_string(0, 2, "Qty").unwrap();
        sheet.write_number(1, 0, 1.0).unwrap();
        sheet.write_string(1, 1, "Projector").unwrap();
        sheet.write_number(1, 2, 2.0).unwrap();

        let other = workbook.add_worksheet();
        other.write_string(0, 0, "ignored").unwrap();
        other.write_string(1, 0, "row").unwrap();

        let bytes = workbook.save_to_buffer().unwrap();
        let file = AcquiredFile::from_bytes(
            "inventory.xlsx",
            SpreadsheetFormat::Xlsx.content_type(),
            bytes,
            MAX_BYTES,
        )
        .unwrap();

        let rows = UniversalFileParser.parse_to_raw_rows(&file).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("S.No"), Some(&CellValue::Number(1.0)));
        assert_eq!(rows[0].text("Equipments"), Some("Projector".to_string()));
        assert!(!rows[0].has_column("ignored"));
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(
            excel_serial_to_date(40855.0),
            NaiveDate::from_ymd_opt(2011, 11, 8)
        );
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(
            excel_serial_to_date(EXCEL_MAX_SERIAL),
            NaiveDate::from_ymd_opt(9999, 12, 31)
        );
        assert_eq!(excel_serial_to_date(EXCEL_MAX_SERIAL + 1.0), None);
        assert_eq!(excel_serial_to_date(1e300), None);
    }

    #[test]
    fn test_excel_date_cells_out_of_range_kept_as_number() {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("dd.mm.yyyy");
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "name").unwrap();
        sheet.write_string(0, 1, "purchase_date").unwrap();
        sheet.write_string(1, 0, "Centrifuge").unwrap();
        sheet.write_number_with_format(1, 1, 1e300, &date_format).unwrap();
        sheet.write_string(2, 0, "Balance").unwrap();
        sheet.write_number_with_format(2, 1, 40855.0, &date_format).unwrap();

        let bytes = workbook.save_to_buffer().unwrap();
        let file = AcquiredFile::from_bytes(
            "dates.xlsx",
            SpreadsheetFormat::Xlsx.content_type(),
            bytes,
            MAX_BYTES,
        )
        .unwrap();

        let rows = UniversalFileParser.parse_to_raw_rows(&file).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("purchase_date"), Some(&CellValue::Number(1e300)));
        assert_eq!(rows[1].text("purchase_date"), Some("2011-11-08".to_string()));
    }

    #[tokio::test]
    async fn test_read_from_path() {
        let mut temp_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "name,category").unwrap();
        writeln!(temp_file, "Centrifuge,lab_equipment").unwrap();

        let file = AcquiredFile::read_from_path(temp_file.path(), MAX_BYTES)
            .await
            .unwrap();
        assert_eq!(file.format, SpreadsheetFormat::Csv);

        let rows = UniversalFileParser.parse_to_raw_rows(&file).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_read_from_path_unsupported_extension() {
        let temp_file = NamedTempFile::new().unwrap();
        let result = AcquiredFile::read_from_path(temp_file.path(), MAX_BYTES).await;
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
