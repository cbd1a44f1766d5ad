// ==========================================
// 实验室设备导入 - 数据清洗器
// ==========================================
// 职责: 旧版台账金额与日期解析 / 类别推断 / 序列号片段
// ==========================================

use crate::domain::{CellValue, Category};
use chrono::{DateTime, NaiveDate};

/// 旧版台账类别关键字表（按顺序匹配，首个命中生效）
pub const CATEGORY_KEYWORDS: &[(&str, Category)] = &[
    ("desktop", Category::Computer),
    ("computer", Category::Computer),
    ("projector", Category::Projector),
    ("display", Category::Projector),
    ("printer", Category::Printer),
    ("network", Category::NetworkEquipment),
    ("switch", Category::NetworkEquipment),
    ("microscope", Category::Microscope),
];

pub struct DataCleaner;

impl DataCleaner {
    /// 类别推断：设备名称大小写不敏感子串匹配关键字表
    pub fn infer_category(&self, label: &str) -> Category {
        let lower = label.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, category)| *category)
            .unwrap_or(Category::LabEquipment)
    }

    /// 旧版金额解析
    ///
    /// 取括号前的前导数字串，去掉千分位后解析；失败返回 0
    /// 例: "63,998 (2*31,999)" → 63998
    pub fn parse_legacy_cost(&self, value: Option<&CellValue>) -> f64 {
        match value {
            Some(CellValue::Number(n)) if n.is_finite() => *n,
            Some(CellValue::Text(s)) => {
                let head = s.split('(').next().unwrap_or("").trim();
                let digits: String = head
                    .chars()
                    .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
                    .filter(|c| *c != ',')
                    .collect();
                digits
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .unwrap_or(0.0)
            }
            _ => 0.0,
        }
    }

    /// 旧版日期解析（DD.MM.YYYY → YYYY-MM-DD，ISO 文本原样接受）
    ///
    /// 不是恰好三段时返回 None；日期合法性由校验器判定
    pub fn parse_legacy_date(&self, value: &str) -> Option<String> {
        // xlsx 日期单元格已由解码器转为 ISO 文本
        if let Ok(date) = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
            return Some(date.format("%Y-%m-%d").to_string());
        }

        let parts: Vec<&str> = value.trim().split('.').collect();
        if parts.len() != 3 {
            return None;
        }
        let pad = |p: &str| {
            let p = p.trim();
            if p.len() == 1 && p.chars().all(|c| c.is_ascii_digit()) {
                format!("0{}", p)
            } else {
                p.to_string()
            }
        };
        Some(format!("{}-{}-{}", parts[2].trim(), pad(parts[1]), pad(parts[0])))
    }

    /// 日历日期解析
    ///
    /// 支持: YYYY-MM-DD / YYYY/MM/DD / DD.MM.YYYY / RFC 3339
    pub fn parse_calendar_date(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(value, "%Y/%m/%d"))
            .or_else(|_| NaiveDate::parse_from_str(value, "%d.%m.%Y"))
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(value)
                    .ok()
                    .map(|dt| dt.date_naive())
            })
    }

    /// 正整数解析（数量）
    pub fn parse_positive_int(&self, value: Option<&CellValue>) -> Option<u32> {
        let n = value?.as_f64()?;
        if n >= 1.0 && n.fract() == 0.0 && n <= u32::MAX as f64 {
            Some(n as u32)
        } else {
            None
        }
    }

    /// 实验室 ID 解析（接受 "3" 与 "3.0"）
    pub fn parse_lab_id(&self, value: &str) -> Option<i64> {
        let value = value.trim();
        value.parse::<i64>().ok().or_else(|| {
            value
                .parse::<f64>()
                .ok()
                .filter(|v| v.fract() == 0.0 && v.is_finite())
                .map(|v| v as i64)
        })
    }

    /// 序列号厂商段（大写、去空白；空白时用兜底值）
    pub fn serial_make_token(&self, make: Option<&str>, fallback: &str) -> String {
        let token: String = make
            .unwrap_or("")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        if token.is_empty() {
            fallback.to_string()
        } else {
            token
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_infer_category_keyword_order() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.infer_category("Desktop System"), Category::Computer);
        assert_eq!(cleaner.infer_category("Pen Tablet"), Category::LabEquipment);
        assert_eq!(cleaner.infer_category("Projector"), Category::Projector);
        assert_eq!(cleaner.infer_category("LED Display Panel"), Category::Projector);
        assert_eq!(cleaner.infer_category("Laser PRINTER"), Category::Printer);
        assert_eq!(cleaner.infer_category("24 port switch"), Category::NetworkEquipment);
        assert_eq!(cleaner.infer_category("Compound Microscope"), Category::Microscope);
        // 同时命中 computer 与 network 时按表序取 computer
        assert_eq!(cleaner.infer_category("Network Computer"), Category::Computer);
    }

    #[test]
    fn test_parse_legacy_cost() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_legacy_cost(Some(&text("63,998 (2*31,999)"))), 63998.0);
        assert_eq!(cleaner.parse_legacy_cost(Some(&text("1,35,000"))), 135000.0);
        assert_eq!(cleaner.parse_legacy_cost(Some(&text("4500.50"))), 4500.5);
        assert_eq!(cleaner.parse_legacy_cost(Some(&CellValue::Number(1200.0))), 1200.0);
        assert_eq!(cleaner.parse_legacy_cost(Some(&text("N/A"))), 0.0);
        assert_eq!(cleaner.parse_legacy_cost(Some(&CellValue::Empty)), 0.0);
        assert_eq!(cleaner.parse_legacy_cost(None), 0.0);
    }

    #[test]
    fn test_parse_legacy_date() {
        let cleaner = DataCleaner;
        assert_eq!(
            cleaner.parse_legacy_date("08.11.2011"),
            Some("2011-11-08".to_string())
        );
        assert_eq!(
            cleaner.parse_legacy_date("8.3.2012"),
            Some("2012-03-08".to_string())
        );
        assert_eq!(
            cleaner.parse_legacy_date("2011-11-08"),
            Some("2011-11-08".to_string())
        );
        assert_eq!(cleaner.parse_legacy_date("2011-13-08"), None);
        assert_eq!(cleaner.parse_legacy_date("08/11/2011"), None);
        assert_eq!(cleaner.parse_legacy_date("08.11"), None);
        assert_eq!(cleaner.parse_legacy_date("01.02.03.2004"), None);
    }

    #[test]
    fn test_parse_calendar_date() {
        let cleaner = DataCleaner;
        let expected = NaiveDate::from_ymd_opt(2011, 11, 8);
        assert_eq!(cleaner.parse_calendar_date("2011-11-08"), expected);
        assert_eq!(cleaner.parse_calendar_date("2011/11/08"), expected);
        assert_eq!(cleaner.parse_calendar_date("08.11.2011"), expected);
        assert_eq!(cleaner.parse_calendar_date("2011-11-08T10:00:00Z"), expected);
        assert_eq!(cleaner.parse_calendar_date("2011-02-30"), None);
        assert_eq!(cleaner.parse_calendar_date("next week"), None);
    }

    #[test]
    fn test_parse_positive_int() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_positive_int(Some(&CellValue::Number(2.0))), Some(2));
        assert_eq!(cleaner.parse_positive_int(Some(&text("3"))), Some(3));
        assert_eq!(cleaner.parse_positive_int(Some(&text("0"))), None);
        assert_eq!(cleaner.parse_positive_int(Some(&text("-1"))), None);
        assert_eq!(cleaner.parse_positive_int(Some(&text("1.5"))), None);
        assert_eq!(cleaner.parse_positive_int(None), None);
    }

    #[test]
    fn test_parse_lab_id() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_lab_id("3"), Some(3));
        assert_eq!(cleaner.parse_lab_id(" 3.0 "), Some(3));
        assert_eq!(cleaner.parse_lab_id("Lab A"), None);
    }

    #[test]
    fn test_serial_make_token() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.serial_make_token(Some("Hewlett Packard"), "GENERIC"), "HEWLETTPACKARD");
        assert_eq!(cleaner.serial_make_token(None, "GENERIC"), "GENERIC");
    }
}
