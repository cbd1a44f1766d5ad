// ==========================================
// 实验室设备导入 - 批量创建接口客户端
// ==========================================
// 接口: POST {base_url}/api/equipment/bulk-import
// 认证: Authorization: Bearer <token>（由调用方提供）
// 约束: 单次请求，不重试，不设置流程级超时
// ==========================================

use crate::domain::{EquipmentPayload, ImportBatchResult};
use crate::i18n::t;
use crate::importer::equipment_importer_trait::BulkImportClient;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

pub const BULK_IMPORT_PATH: &str = "/api/equipment/bulk-import";

/// 请求体
#[derive(Debug, Serialize)]
struct BulkImportRequest<'a> {
    equipment: &'a [EquipmentPayload],
}

/// 接口返回的计数块
#[derive(Debug, Default, Deserialize)]
struct BatchCounts {
    #[serde(default, alias = "succeeded")]
    success: usize,
    #[serde(default)]
    failed: usize,
    #[serde(default)]
    errors: Vec<Value>,
}

impl From<BatchCounts> for ImportBatchResult {
    fn from(counts: BatchCounts) -> Self {
        ImportBatchResult {
            succeeded: counts.success,
            failed: counts.failed,
            errors: counts.errors.iter().map(error_entry_text).collect(),
        }
    }
}

// ==========================================
// HttpBulkImportClient
// ==========================================
pub struct HttpBulkImportClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpBulkImportClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, BULK_IMPORT_PATH)
    }
}

#[async_trait]
impl BulkImportClient for HttpBulkImportClient {
    async fn bulk_create(&self, batch: &[EquipmentPayload]) -> ImportResult<ImportBatchResult> {
        let url = self.endpoint();
        info!(url = %url, items = batch.len(), "提交批量导入请求");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .json(&BulkImportRequest { equipment: batch })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, body_len = body.len(), "批量导入接口已响应");

        if !status.is_success() {
            let message = extract_error_message(&body).unwrap_or_else(|| t("import.submission_failed"));
            error!(status = %status, message = %message, "批量导入接口返回错误");
            return Err(ImportError::SubmissionError(message));
        }

        parse_success_body(&body)
    }
}

/// 解析 2xx 响应体
///
/// 支持两种形态:
/// - `{"success": true, "results": {"success": n, "failed": n, "errors": [...]}}`
/// - `{"success": n, "failed": n, "errors": [...]}`
///
/// 其他形态返回 SubmissionError
pub fn parse_success_body(body: &str) -> ImportResult<ImportBatchResult> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        error!(error = %e, "批量导入响应不是合法 JSON");
        ImportError::SubmissionError(t("import.submission_failed"))
    })?;

    if let Some(results) = value.get("results").filter(|r| r.is_object()) {
        let counts: BatchCounts = serde_json::from_value(results.clone())
            .map_err(|e| ImportError::SubmissionError(e.to_string()))?;
        return Ok(counts.into());
    }

    match value.get("success") {
        Some(Value::Number(_)) => {
            let counts: BatchCounts = serde_json::from_value(value.clone())
                .map_err(|e| ImportError::SubmissionError(e.to_string()))?;
            Ok(counts.into())
        }
        // success:false 或缺少计数块，均视为提交失败
        _ => {
            error!(body_len = body.len(), "批量导入响应缺少计数结果");
            Err(ImportError::SubmissionError(
                message_field(&value).unwrap_or_else(|| t("import.submission_failed")),
            ))
        }
    }
}

/// 从错误响应体中提取协作方消息（message 优先，其次 error）
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    message_field(&value)
}

fn message_field(value: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn error_entry_text(entry: &Value) -> String {
    match entry {
        Value::String(s) => s.clone(),
        Value::Object(_) => {
            let message = message_field(entry).unwrap_or_else(|| entry.to_string());
            match entry.get("serial_number").and_then(Value::as_str) {
                Some(serial) => format!("{}: {}", serial, message),
                None => message,
            }
        }
        other => other.to_string(),
    }
}
