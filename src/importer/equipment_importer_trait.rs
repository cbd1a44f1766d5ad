// ==========================================
// 实验室设备导入 - 导入管道 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 阶段: 文件解码 → 行转换 → 行校验 → 批量提交
// ==========================================

use crate::domain::{
    EquipmentCandidate, EquipmentPayload, ImportBatchResult, ImportReport, Lab, RawRow,
    ValidationOutcome,
};
use crate::importer::defaults::ImportDefaults;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::AcquiredFile;
use crate::importer::import_flow::ImportPreview;
use async_trait::async_trait;

// ==========================================
// EquipmentImporter Trait
// ==========================================
// 用途: 设备导入主接口
// 实现者: EquipmentImporterImpl
#[async_trait]
pub trait EquipmentImporter: Send + Sync {
    /// 预览：解码 + 转换 + 校验，不发起网络请求
    ///
    /// # 返回
    /// - Ok(ImportPreview): 每行校验结果与汇总
    /// - Err: 解码失败 / 文件为空 / 行数超限
    async fn preview_file(&self, file: AcquiredFile, labs: &[Lab]) -> ImportResult<ImportPreview>;

    /// 完整导入：预览 → 确认 → 批量提交
    ///
    /// # 返回
    /// - Ok(ImportReport): 外部接口返回的批量结果（部分成功属于正常结果）
    /// - Err: 解码失败 / 无有效行 / 提交失败
    async fn import_file(&self, file: AcquiredFile, labs: &[Lab]) -> ImportResult<ImportReport>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 表格解码（阶段 1）
// 实现者: ExcelParser, CsvParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行（首行为表头，仅第一个工作表）
    fn parse_to_raw_rows(&self, file: &AcquiredFile) -> ImportResult<Vec<RawRow>>;
}

// ==========================================
// RowTransformer Trait
// ==========================================
// 用途: 原始行 → 候选设备（阶段 2）
// 实现者: FieldMapper
pub trait RowTransformer: Send + Sync {
    /// 转换单行
    ///
    /// # 参数
    /// - row: 原始行
    /// - row_number: 1-based 行号（用于自动序列号）
    /// - ctx: 实验室列表 / 当前年份 / 默认值表
    fn map_to_candidate(
        &self,
        row: &RawRow,
        row_number: usize,
        ctx: &TransformContext<'_>,
    ) -> EquipmentCandidate;
}

/// 行转换上下文
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    pub labs: &'a [Lab],
    pub year: i32,
    pub defaults: &'a ImportDefaults,
}

// ==========================================
// EquipmentValidator Trait
// ==========================================
// 用途: 行级校验（阶段 3）
// 实现者: DqValidator
pub trait EquipmentValidator: Send + Sync {
    /// 校验单条候选记录（所有规则均执行，不短路）
    fn validate_candidate(
        &self,
        row_number: usize,
        candidate: EquipmentCandidate,
        labs: &[Lab],
    ) -> ValidationOutcome;

    /// 校验整批（行号按输入顺序 1-based）
    fn validate_batch(
        &self,
        candidates: Vec<EquipmentCandidate>,
        labs: &[Lab],
    ) -> Vec<ValidationOutcome> {
        candidates
            .into_iter()
            .enumerate()
            .map(|(idx, c)| self.validate_candidate(idx + 1, c, labs))
            .collect()
    }
}

// ==========================================
// BulkImportClient Trait
// ==========================================
// 用途: 外部批量创建接口（阶段 4）
// 实现者: HttpBulkImportClient
#[async_trait]
pub trait BulkImportClient: Send + Sync {
    /// 一次性提交整批有效记录
    ///
    /// # 返回
    /// - Ok(ImportBatchResult): 接口返回的成功/失败计数与失败原因
    /// - Err(SubmissionError): 网络错误或接口错误
    async fn bulk_create(&self, batch: &[EquipmentPayload]) -> ImportResult<ImportBatchResult>;
}
