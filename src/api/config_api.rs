// ==========================================
// 实验室设备导入 - 配置管理 API
// ==========================================
// 职责: 配置查询、更新（写入前按键校验取值）
// 存储: config_kv 表（global scope）
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::{config_keys, ConfigManager};
use crate::config::import_settings::{
    DEFAULT_API_BASE_URL, DEFAULT_DEPRECIATION_RATE, DEFAULT_FALLBACK_LAB_ID,
    DEFAULT_MAX_FILE_BYTES, DEFAULT_MAX_ROWS,
};

/// 配置项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigItem {
    pub key: String,
    pub value: String,
    /// "stored" 或 "default"
    pub source: String,
}

// ==========================================
// ConfigApi - 配置管理 API
// ==========================================
pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    /// 查询所有已知配置（未写入的显示默认值）
    pub fn list_configs(&self) -> ApiResult<Vec<ConfigItem>> {
        let stored = self.config_manager.list_global_config()?;

        let items = config_keys::ALL
            .iter()
            .map(|key| match stored.iter().find(|(k, _)| k == key) {
                Some((_, value)) => ConfigItem {
                    key: key.to_string(),
                    value: value.clone(),
                    source: "stored".to_string(),
                },
                None => ConfigItem {
                    key: key.to_string(),
                    value: default_value(key).unwrap_or_default(),
                    source: "default".to_string(),
                },
            })
            .collect();
        Ok(items)
    }

    /// 查询单个配置
    pub fn get_config(&self, key: &str) -> ApiResult<ConfigItem> {
        let default = default_value(key)
            .ok_or_else(|| ApiError::NotFound(format!("未知配置键: {}", key)))?;

        let item = match self.config_manager.get_global_config_value(key)? {
            Some(value) => ConfigItem {
                key: key.to_string(),
                value,
                source: "stored".to_string(),
            },
            None => ConfigItem {
                key: key.to_string(),
                value: default,
                source: "default".to_string(),
            },
        };
        Ok(item)
    }

    /// 更新配置
    ///
    /// # 错误
    /// - NotFound: 未知配置键
    /// - InvalidInput: 取值不合法
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<()> {
        if default_value(key).is_none() {
            return Err(ApiError::NotFound(format!("未知配置键: {}", key)));
        }
        let value = value.trim();
        validate_value(key, value)?;

        self.config_manager.set_global_config_value(key, value)?;
        Ok(())
    }
}

/// 配置键的默认值
pub fn default_value(key: &str) -> Option<String> {
    let value = match key {
        config_keys::FALLBACK_LAB_ID => DEFAULT_FALLBACK_LAB_ID.to_string(),
        config_keys::DEPRECIATION_RATE => DEFAULT_DEPRECIATION_RATE.to_string(),
        config_keys::MAX_FILE_BYTES => DEFAULT_MAX_FILE_BYTES.to_string(),
        config_keys::MAX_ROWS => DEFAULT_MAX_ROWS.to_string(),
        config_keys::API_BASE_URL => DEFAULT_API_BASE_URL.to_string(),
        _ => return None,
    };
    Some(value)
}

fn validate_value(key: &str, value: &str) -> ApiResult<()> {
    let invalid = |reason: &str| ApiError::InvalidInput(format!("{} = {}: {}", key, value, reason));

    match key {
        config_keys::FALLBACK_LAB_ID => {
            value.parse::<i64>().map_err(|_| invalid("应为整数"))?;
        }
        config_keys::DEPRECIATION_RATE => {
            let rate = value.parse::<f64>().map_err(|_| invalid("应为小数"))?;
            if !(0.0..=1.0).contains(&rate) {
                return Err(invalid("应在 [0, 1] 区间内"));
            }
        }
        config_keys::MAX_FILE_BYTES => {
            if value.parse::<u64>().map_err(|_| invalid("应为正整数"))? == 0 {
                return Err(invalid("应为正整数"));
            }
        }
        config_keys::MAX_ROWS => {
            if value.parse::<usize>().map_err(|_| invalid("应为正整数"))? == 0 {
                return Err(invalid("应为正整数"));
            }
        }
        config_keys::API_BASE_URL => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(invalid("应以 http:// 或 https:// 开头"));
            }
        }
        _ => {}
    }
    Ok(())
}
