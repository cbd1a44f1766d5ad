// ==========================================
// 实验室设备导入 - 导入 API
// ==========================================
// 职责: 封装导入相关功能（预览 / 导入 / 模板 / 默认值表）
// 调用方: 命令行入口
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportSettings};
use crate::domain::{ImportReport, Lab};
use crate::importer::{
    AcquiredFile, BulkImportClient, DefaultRule, EquipmentImporter, EquipmentImporterImpl,
    HttpBulkImportClient, ImportDefaults, ImportPreview, SpreadsheetFormat, TemplateExporter,
};

/// 模板导出响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateExportResponse {
    pub path: String,
    pub format: SpreadsheetFormat,
}

/// 导入API
pub struct ImportApi {
    config_manager: Arc<ConfigManager>,
    year: Option<i32>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self {
            config_manager,
            year: None,
        }
    }

    /// 固定序列号年份
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// 读取本次导入的配置快照
    pub async fn load_settings(&self) -> ApiResult<ImportSettings> {
        Ok(ImportSettings::load(self.config_manager.as_ref()).await?)
    }

    /// 预览：解码 + 转换 + 校验，不发起网络请求
    pub async fn preview(&self, file_path: &Path, labs: &[Lab]) -> ApiResult<ImportPreview> {
        let settings = self.load_settings().await?;
        let file = AcquiredFile::read_from_path(file_path, settings.max_file_bytes).await?;

        // 预览阶段不会调用批量接口
        let client = HttpBulkImportClient::new(settings.api_base_url.clone(), String::new());
        let importer = self.build_importer(settings, client);
        Ok(importer.preview_file(file, labs).await?)
    }

    /// 完整导入
    ///
    /// # 参数
    /// - token: Bearer 凭证（由调用方提供）
    /// - api_url: 覆写配置中的接口地址
    pub async fn import(
        &self,
        file_path: &Path,
        labs: &[Lab],
        token: &str,
        api_url: Option<&str>,
    ) -> ApiResult<ImportReport> {
        if token.trim().is_empty() {
            return Err(ApiError::InvalidInput("Bearer 凭证不能为空".to_string()));
        }

        let settings = self.load_settings().await?;
        let base_url = api_url
            .map(str::to_string)
            .unwrap_or_else(|| settings.api_base_url.clone());
        let client = HttpBulkImportClient::new(base_url, token.trim());

        self.import_with_settings(settings, file_path, labs, client).await
    }

    /// 使用指定的批量接口客户端导入
    pub async fn import_with_client<C>(
        &self,
        file_path: &Path,
        labs: &[Lab],
        client: C,
    ) -> ApiResult<ImportReport>
    where
        C: BulkImportClient,
    {
        let settings = self.load_settings().await?;
        self.import_with_settings(settings, file_path, labs, client).await
    }

    /// 以已读取的配置快照执行导入（不再读取配置）
    async fn import_with_settings<C>(
        &self,
        settings: ImportSettings,
        file_path: &Path,
        labs: &[Lab],
        client: C,
    ) -> ApiResult<ImportReport>
    where
        C: BulkImportClient,
    {
        let file = AcquiredFile::read_from_path(file_path, settings.max_file_bytes).await?;

        let importer = self.build_importer(settings, client);
        let report = importer.import_file(file, labs).await?;
        info!(
            batch_id = %report.batch_id,
            succeeded = report.result.succeeded,
            failed = report.result.failed,
            "导入完成"
        );
        Ok(report)
    }

    /// 导出导入模板（.xlsx / .csv）
    pub async fn export_template(&self, out_path: &Path) -> ApiResult<TemplateExportResponse> {
        let format = TemplateExporter::new().export_to_path(out_path).await?;
        Ok(TemplateExportResponse {
            path: out_path.display().to_string(),
            format,
        })
    }

    /// 默认值表（字段 → 默认值 → 触发条件）
    pub async fn defaults_table(&self) -> ApiResult<Vec<DefaultRule>> {
        let settings = self.load_settings().await?;
        Ok(ImportDefaults::from_settings(&settings).rules())
    }

    fn build_importer<C>(&self, settings: ImportSettings, client: C) -> EquipmentImporterImpl<C>
    where
        C: BulkImportClient,
    {
        let importer = EquipmentImporterImpl::new(settings, client);
        match self.year {
            Some(year) => importer.with_year(year),
            None => importer,
        }
    }
}

/// 读取实验室列表（JSON 数组: [{"id": 1, "name": "..."}]）
pub async fn load_labs(path: &Path) -> ApiResult<Vec<Lab>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ApiError::NotFound(format!("{}: {}", path.display(), e)))?;
    parse_labs(&content)
}

/// 解析实验室列表
pub fn parse_labs(content: &str) -> ApiResult<Vec<Lab>> {
    serde_json::from_str::<Vec<Lab>>(content)
        .map_err(|e| ApiError::InvalidInput(format!("实验室列表格式错误: {}", e)))
}
