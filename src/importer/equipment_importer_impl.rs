// ==========================================
// 实验室设备导入 - 导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到批量创建接口
// 流程: 解码 → 行转换 → 行校验 → 预览 → 确认 → 提交 → 报告
// 状态: 每一步消费 ImportStep，返回下一 ImportStep
// ==========================================

use crate::config::ImportSettings;
use crate::domain::{
    Category, ConditionStatus, EquipmentCandidate, EquipmentPayload, EquipmentStatus,
    ImportBatchResult, ImportReport, Lab,
};
use crate::i18n::t_with_args;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::defaults::ImportDefaults;
use crate::importer::dq_validator::DqValidator;
use crate::importer::equipment_importer_trait::{
    BulkImportClient, EquipmentImporter, EquipmentValidator, FileParser, RowTransformer,
    TransformContext,
};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{AcquiredFile, UniversalFileParser};
use crate::importer::import_flow::{ImportPreview, ImportStep, PreparedBatch};
use async_trait::async_trait;
use chrono::{Datelike, Local};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// EquipmentImporterImpl - 设备导入器实现
// ==========================================
pub struct EquipmentImporterImpl<C>
where
    C: BulkImportClient,
{
    // 配置快照
    settings: ImportSettings,
    defaults: ImportDefaults,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    row_transformer: Box<dyn RowTransformer>,
    validator: Box<dyn EquipmentValidator>,
    cleaner: DataCleaner,

    // 批量创建接口
    client: C,

    // 序列号中的年份
    year: i32,
}

impl<C> EquipmentImporterImpl<C>
where
    C: BulkImportClient,
{
    /// 使用默认组件创建导入器
    pub fn new(settings: ImportSettings, client: C) -> Self {
        Self::with_components(
            settings,
            client,
            Box::new(UniversalFileParser),
            Box::new(FieldMapper::new()),
            Box::new(DqValidator::new()),
        )
    }

    /// 注入全部组件
    pub fn with_components(
        settings: ImportSettings,
        client: C,
        file_parser: Box<dyn FileParser>,
        row_transformer: Box<dyn RowTransformer>,
        validator: Box<dyn EquipmentValidator>,
    ) -> Self {
        let defaults = ImportDefaults::from_settings(&settings);
        Self {
            settings,
            defaults,
            file_parser,
            row_transformer,
            validator,
            cleaner: DataCleaner,
            client,
            year: Local::now().year(),
        }
    }

    /// 固定序列号年份（保证多次转换结果一致）
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    pub fn defaults(&self) -> &ImportDefaults {
        &self.defaults
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    // ==========================================
    // Uploading → PreviewValidating
    // ==========================================
    /// 解码、转换、校验；失败时调用方回到 Uploading
    #[instrument(skip(self, step, file, labs), fields(file_name = %file.file_name))]
    pub fn load_file(
        &self,
        step: ImportStep,
        file: AcquiredFile,
        labs: &[Lab],
    ) -> ImportResult<ImportStep> {
        if !matches!(step, ImportStep::Uploading) {
            return Err(ImportError::InvalidTransition {
                expected: "uploading",
                actual: step.name(),
            });
        }

        let size = file.bytes.len() as u64;
        if size > self.settings.max_file_bytes {
            return Err(ImportError::FileTooLarge {
                size,
                limit: self.settings.max_file_bytes,
            });
        }

        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, format = ?file.format, size, "开始解析导入文件");

        // === 步骤 1: 解码 ===
        debug!("步骤 1: 解码");
        let rows = self.file_parser.parse_to_raw_rows(&file).map_err(|e| {
            error!(error = %e, "文件解码失败");
            e
        })?;
        if rows.is_empty() {
            return Err(ImportError::EmptyFile);
        }
        if rows.len() > self.settings.max_rows {
            return Err(ImportError::TooManyRows {
                rows: rows.len(),
                limit: self.settings.max_rows,
            });
        }
        info!(total_rows = rows.len(), "文件解码完成");

        // === 步骤 2: 行转换 ===
        debug!("步骤 2: 行转换");
        let ctx = TransformContext {
            labs,
            year: self.year,
            defaults: &self.defaults,
        };
        let candidates: Vec<EquipmentCandidate> = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| self.row_transformer.map_to_candidate(row, idx + 1, &ctx))
            .collect();

        // === 步骤 3: 行校验 ===
        debug!("步骤 3: 行校验");
        let outcomes = self.validator.validate_batch(candidates, labs);
        for outcome in outcomes.iter().filter(|o| !o.is_valid()) {
            debug!(row_number = outcome.row_number, errors = ?outcome.errors, "行校验未通过");
        }

        let preview = ImportPreview::new(batch_id, file.file_name, outcomes, labs.to_vec());
        info!(
            valid = preview.summary.valid_rows,
            invalid = preview.summary.invalid_rows,
            warnings = preview.summary.warning_rows,
            "校验完成"
        );

        Ok(ImportStep::PreviewValidating(preview))
    }

    // ==========================================
    // PreviewValidating → Importing
    // ==========================================
    /// 取有效行并收敛为强类型载荷；无有效行时不进入提交
    pub fn confirm(&self, step: ImportStep) -> ImportResult<ImportStep> {
        let preview = match step {
            ImportStep::PreviewValidating(preview) => preview,
            other => {
                return Err(ImportError::InvalidTransition {
                    expected: "preview_validating",
                    actual: other.name(),
                })
            }
        };

        let payloads: Vec<EquipmentPayload> = preview
            .valid_outcomes()
            .map(|o| self.to_payload(o.row_number, &o.candidate, &preview.labs))
            .collect();

        if payloads.is_empty() {
            warn!(batch_id = %preview.batch_id, "没有可导入的有效行");
            return Err(ImportError::NoValidRows);
        }

        Ok(ImportStep::Importing(PreparedBatch {
            batch_id: preview.batch_id,
            summary: preview.summary,
            payloads,
        }))
    }

    // ==========================================
    // Importing → 报告
    // ==========================================
    /// 单次提交整批；部分成功属于正常结果
    #[instrument(skip(self, step), fields(step = step.name()))]
    pub async fn submit(&self, step: ImportStep) -> ImportResult<ImportReport> {
        let batch = match step {
            ImportStep::Importing(batch) => batch,
            other => {
                return Err(ImportError::InvalidTransition {
                    expected: "importing",
                    actual: other.name(),
                })
            }
        };

        info!(batch_id = %batch.batch_id, items = batch.payloads.len(), "提交批量导入");
        let result = self.client.bulk_create(&batch.payloads).await.map_err(|e| {
            error!(batch_id = %batch.batch_id, error = %e, "批量导入提交失败");
            e
        })?;
        info!(
            batch_id = %batch.batch_id,
            succeeded = result.succeeded,
            failed = result.failed,
            "批量导入完成"
        );

        Ok(build_report(
            batch.batch_id,
            batch.summary,
            batch.payloads.len(),
            result,
        ))
    }

    /// 候选记录 → 接口载荷
    ///
    /// 仅用于通过校验的行；枚举解析失败时回退默认值表
    fn to_payload(
        &self,
        row_number: usize,
        c: &EquipmentCandidate,
        labs: &[Lab],
    ) -> EquipmentPayload {
        let lab_id = match self.cleaner.parse_lab_id(&c.lab_id) {
            Some(id) => id,
            None => {
                let fallback = self.defaults.default_lab_id(labs);
                if !c.lab_id.trim().is_empty() {
                    warn!(row_number, lab_id = %c.lab_id, fallback, "实验室 ID 无法解析，使用默认实验室");
                }
                fallback
            }
        };

        let price = |value: &Option<crate::domain::CellValue>| {
            value.as_ref().and_then(|v| v.as_f64()).unwrap_or(0.0)
        };
        let date = |value: &Option<String>| {
            value
                .as_deref()
                .and_then(|d| self.cleaner.parse_calendar_date(d))
        };

        EquipmentPayload {
            name: c.name.trim().to_string(),
            description: c.description.clone(),
            serial_number: if c.serial_number.trim().is_empty() {
                self.defaults.auto_serial(row_number)
            } else {
                c.serial_number.clone()
            },
            model: c.model.clone(),
            manufacturer: c.manufacturer.clone(),
            category: c
                .category
                .parse::<Category>()
                .unwrap_or(self.defaults.category),
            lab_id,
            location_details: c.location_details.clone(),
            status: c
                .status
                .parse::<EquipmentStatus>()
                .unwrap_or(self.defaults.status),
            condition_status: c
                .condition_status
                .parse::<ConditionStatus>()
                .unwrap_or(self.defaults.condition),
            purchase_price: price(&c.purchase_price),
            current_value: price(&c.current_value),
            purchase_date: date(&c.purchase_date),
            warranty_expiry: date(&c.warranty_expiry),
            quantity: c.quantity.max(1),
            stock_register_page: c.stock_register_page.clone(),
            extra: c
                .extra
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        }
    }
}

/// 生成面向用户的导入报告
fn build_report(
    batch_id: String,
    summary: crate::domain::ImportSummary,
    submitted: usize,
    result: ImportBatchResult,
) -> ImportReport {
    let success_message = (result.succeeded > 0).then(|| {
        t_with_args(
            "report.success",
            &[("count", &result.succeeded.to_string())],
        )
    });

    let error_message = (result.failed > 0).then(|| {
        let head = t_with_args("report.failed", &[("count", &result.failed.to_string())]);
        if result.errors.is_empty() {
            head
        } else {
            format!("{} {}", head, result.errors.join("; "))
        }
    });

    ImportReport {
        batch_id,
        summary,
        submitted,
        result,
        success_message,
        error_message,
    }
}

#[async_trait]
impl<C> EquipmentImporter for EquipmentImporterImpl<C>
where
    C: BulkImportClient,
{
    async fn preview_file(&self, file: AcquiredFile, labs: &[Lab]) -> ImportResult<ImportPreview> {
        match self.load_file(ImportStep::Uploading, file, labs)? {
            ImportStep::PreviewValidating(preview) => Ok(preview),
            other => Err(ImportError::InternalError(format!(
                "预览阶段返回了意外状态: {}",
                other.name()
            ))),
        }
    }

    async fn import_file(&self, file: AcquiredFile, labs: &[Lab]) -> ImportResult<ImportReport> {
        let step = self.load_file(ImportStep::Uploading, file, labs)?;
        let step = self.confirm(step)?;
        self.submit(step).await
    }
}
