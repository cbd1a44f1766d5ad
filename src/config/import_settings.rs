// ==========================================
// 实验室设备导入 - 导入配置快照
// ==========================================
// 职责: 一次导入开始时读取全部配置，流程内不再回读
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::importer::error::ImportResult;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FALLBACK_LAB_ID: i64 = 1;
pub const DEFAULT_DEPRECIATION_RATE: f64 = 0.8;
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MAX_ROWS: usize = 1000;
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub fallback_lab_id: i64,
    pub depreciation_rate: f64,
    pub max_file_bytes: u64,
    pub max_rows: usize,
    pub api_base_url: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            fallback_lab_id: DEFAULT_FALLBACK_LAB_ID,
            depreciation_rate: DEFAULT_DEPRECIATION_RATE,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_rows: DEFAULT_MAX_ROWS,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl ImportSettings {
    /// 从配置读取器加载快照
    pub async fn load<C>(reader: &C) -> ImportResult<Self>
    where
        C: ImportConfigReader + ?Sized,
    {
        Ok(Self {
            fallback_lab_id: reader.get_fallback_lab_id().await?,
            depreciation_rate: reader.get_depreciation_rate().await?,
            max_file_bytes: reader.get_max_file_bytes().await?,
            max_rows: reader.get_max_rows().await?,
            api_base_url: reader.get_api_base_url().await?,
        })
    }
}
