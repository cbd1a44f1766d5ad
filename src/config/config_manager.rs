// ==========================================
// 实验室设备导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::config::import_settings::{
    DEFAULT_API_BASE_URL, DEFAULT_DEPRECIATION_RATE, DEFAULT_FALLBACK_LAB_ID,
    DEFAULT_MAX_FILE_BYTES, DEFAULT_MAX_ROWS,
};
use crate::db::open_sqlite_connection;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

/// 配置键
pub mod config_keys {
    pub const FALLBACK_LAB_ID: &str = "import.fallback_lab_id";
    pub const DEPRECIATION_RATE: &str = "import.depreciation_rate";
    pub const MAX_FILE_BYTES: &str = "import.max_file_bytes";
    pub const MAX_ROWS: &str = "import.max_rows";
    pub const API_BASE_URL: &str = "api.base_url";

    pub const ALL: [&str; 5] = [
        FALLBACK_LAB_ID,
        DEPRECIATION_RATE,
        MAX_FILE_BYTES,
        MAX_ROWS,
        API_BASE_URL,
    ];
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = lock(&self.conn)?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        if !config_keys::ALL.contains(&key) {
            return Err(ImportError::ConfigValueError {
                key: key.to_string(),
                value: value.to_string(),
                message: "未知配置键".to_string(),
            });
        }

        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 列出全部 global 配置（按 key 排序）
    pub fn list_global_config(&self) -> ImportResult<Vec<(String, String)>> {
        let conn = lock(&self.conn)?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ImportResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 读取并解析；格式错误时记录告警并回退默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ImportResult<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Display,
    {
        match self.get_global_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(
                        config_key = key,
                        raw_value = %raw,
                        default = %default,
                        "配置值格式错误，使用默认值"
                    );
                    Ok(default)
                }
            },
        }
    }
}

fn lock(conn: &Arc<Mutex<Connection>>) -> ImportResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| ImportError::InternalError(format!("锁获取失败: {}", e)))
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_fallback_lab_id(&self) -> ImportResult<i64> {
        self.get_parsed_or_default(config_keys::FALLBACK_LAB_ID, DEFAULT_FALLBACK_LAB_ID)
    }

    async fn get_depreciation_rate(&self) -> ImportResult<f64> {
        let rate =
            self.get_parsed_or_default(config_keys::DEPRECIATION_RATE, DEFAULT_DEPRECIATION_RATE)?;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ImportError::ConfigValueError {
                key: config_keys::DEPRECIATION_RATE.to_string(),
                value: rate.to_string(),
                message: "折旧率必须在 [0, 1] 区间内".to_string(),
            });
        }
        Ok(rate)
    }

    async fn get_max_file_bytes(&self) -> ImportResult<u64> {
        self.get_parsed_or_default(config_keys::MAX_FILE_BYTES, DEFAULT_MAX_FILE_BYTES)
    }

    async fn get_max_rows(&self) -> ImportResult<usize> {
        self.get_parsed_or_default(config_keys::MAX_ROWS, DEFAULT_MAX_ROWS)
    }

    async fn get_api_base_url(&self) -> ImportResult<String> {
        let url = self.get_config_or_default(config_keys::API_BASE_URL, DEFAULT_API_BASE_URL)?;
        Ok(url.trim().trim_end_matches('/').to_string())
    }
}
