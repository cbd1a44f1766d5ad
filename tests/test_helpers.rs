// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的配置数据库、xlsx/csv 测试文件、批量接口替身
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use lab_equipment_import::config::ConfigManager;
use lab_equipment_import::domain::{EquipmentPayload, ImportBatchResult};
use lab_equipment_import::importer::{BulkImportClient, ImportError, ImportResult};
use rust_xlsxwriter::{Format, Workbook};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 旧版台账表头
pub const LEGACY_HEADERS: [&str; 8] = [
    "S.No",
    "Equipments",
    "Make",
    "System Description",
    "Qty",
    "Cost in Rs",
    "Date of Purchase",
    "Stock Register Page No",
];

/// 5 行旧版台账，第 3 行缺少 Equipments
pub const LEGACY_ROWS_WITH_BLANK_NAME: [[&str; 8]; 5] = [
    ["1", "Desktop System", "HP", "Intel i5, 8GB RAM", "2", "63,998 (2*31,999)", "08.11.2011", "12"],
    ["2", "Projector", "Epson", "EB-X41 3LCD", "1", "45,500", "15.03.2012", "14"],
    ["3", "", "Canon", "LBP2900B", "1", "8,999", "21.06.2013", "15"],
    ["4", "Network Switch", "Cisco", "24-port managed", "1", "25,000", "02.01.2014", "18"],
    ["5", "Compound Microscope", "Olympus", "CX23 binocular", "3", "1,35,000 (3*45,000)", "10.07.2015", "21"],
];

/// 创建临时配置数据库
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - Arc<ConfigManager>: 已建表的配置管理器
pub fn create_test_config() -> Result<(NamedTempFile, Arc<ConfigManager>), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();
    let manager = ConfigManager::new(&db_path)?;
    Ok((temp_file, Arc::new(manager)))
}

/// 写出旧版台账 xlsx（S.No / Qty 为数字单元格，空字符串留空）
pub fn write_legacy_xlsx(
    dir: &Path,
    file_name: &str,
    rows: &[[&str; 8]],
) -> Result<PathBuf, Box<dyn Error>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    for (col, header) in LEGACY_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let r = idx as u32 + 1;
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let col = col as u16;
            match (col, value.parse::<f64>()) {
                (0 | 4, Ok(n)) => sheet.write_number(r, col, n)?,
                _ => sheet.write_string(r, col, *value)?,
            };
        }
    }

    let path = dir.join(file_name);
    workbook.save(&path)?;
    Ok(path)
}

/// 写出文本文件（csv 等）
pub fn write_text_file(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.join(file_name);
    std::fs::write(&path, content)?;
    Ok(path)
}

// ==========================================
// MockBulkClient - 批量接口替身
// ==========================================
pub struct MockState {
    pub calls: AtomicUsize,
    pub submitted: Mutex<Vec<EquipmentPayload>>,
    response: Result<ImportBatchResult, String>,
}

#[derive(Clone)]
pub struct MockBulkClient {
    pub state: Arc<MockState>,
}

impl MockBulkClient {
    pub fn responding(response: Result<ImportBatchResult, String>) -> Self {
        Self {
            state: Arc::new(MockState {
                calls: AtomicUsize::new(0),
                submitted: Mutex::new(Vec::new()),
                response,
            }),
        }
    }

    /// 全部接受
    pub fn accepting_all(count: usize) -> Self {
        Self::responding(Ok(ImportBatchResult {
            succeeded: count,
            failed: 0,
            errors: vec![],
        }))
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<EquipmentPayload> {
        self.state.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl BulkImportClient for MockBulkClient {
    async fn bulk_create(&self, batch: &[EquipmentPayload]) -> ImportResult<ImportBatchResult> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        self.state.submitted.lock().unwrap().extend_from_slice(batch);
        self.state
            .response
            .clone()
            .map_err(ImportError::SubmissionError)
    }
}
