// ==========================================
// 实验室设备导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入管道所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入管道所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== 缺省值配置 =====

    /// 获取回退实验室 ID（实验室列表为空时使用）
    ///
    /// # 默认值
    /// - 1
    async fn get_fallback_lab_id(&self) -> ImportResult<i64>;

    /// 获取当前价值折旧率（current_value = purchase_price × rate）
    ///
    /// # 默认值
    /// - 0.8
    async fn get_depreciation_rate(&self) -> ImportResult<f64>;

    // ===== 上传限制 =====

    /// 获取文件大小上限（字节）
    ///
    /// # 默认值
    /// - 10485760 (10MB)
    async fn get_max_file_bytes(&self) -> ImportResult<u64>;

    /// 获取数据行数上限
    ///
    /// # 默认值
    /// - 1000
    async fn get_max_rows(&self) -> ImportResult<usize>;

    // ===== 外部接口 =====

    /// 获取批量导入接口基础地址
    ///
    /// # 默认值
    /// - http://localhost:5000
    async fn get_api_base_url(&self) -> ImportResult<String>;
}
