//! 操作员的选择：板数、板类型、条码

use crate::error::SelectionError;
use regex::Regex;
use std::sync::OnceLock;

/// 文件名中不允许出现的字符（控制字符、Windows 保留字符以及 `!`）
fn invalid_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[\x00-\x1F<>:"/\\|?*!]"#).expect("static regex"))
}

/// 去掉条码中不能出现在文件名里的字符，并去除首尾空白
pub fn sanitize_identifier(raw: &str) -> String {
    invalid_chars().replace_all(raw.trim(), "").trim().to_string()
}

/// 一次运行的板选择
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlateSelection {
    /// 本次读取的板数
    pub plate_count: usize,
    /// 板类型代码，每个字符对应一块板（从 1 开始编号）
    pub plate_type: String,
    /// 操作员输入的原始条码
    pub barcode: String,
}

impl PlateSelection {
    pub fn new(plate_count: usize, plate_type: impl Into<String>, barcode: impl Into<String>) -> Self {
        Self {
            plate_count,
            plate_type: plate_type.into(),
            barcode: barcode.into(),
        }
    }

    /// 显示和文件挑选时使用的板数，未设置时按 1 处理
    pub fn effective_count(&self) -> usize {
        self.plate_count.max(1)
    }

    /// 清洗后的条码
    pub fn identifier(&self) -> String {
        sanitize_identifier(&self.barcode)
    }

    /// 板类型和条码都必须已填写
    pub fn require_complete(&self) -> Result<(), SelectionError> {
        if self.plate_type.trim().is_empty() || self.identifier().is_empty() {
            return Err(SelectionError::MissingSelection);
        }
        Ok(())
    }

    /// 启动前板数必须大于 0
    pub fn require_plates(&self) -> Result<usize, SelectionError> {
        if self.plate_count == 0 {
            return Err(SelectionError::NoPlatesSelected);
        }
        Ok(self.plate_count)
    }

    /// 第 `plate_index` 块板的板变量；代码长度不足时返回调用方给的默认值
    pub fn plate_var(&self, plate_index: usize, default: &str) -> String {
        plate_var_at(&self.plate_type, plate_index, default)
    }
}

/// 取板类型代码中第 `plate_index` 个字符（从 1 开始）
pub fn plate_var_at(plate_type: &str, plate_index: usize, default: &str) -> String {
    if plate_index == 0 {
        return default.to_string();
    }
    plate_type
        .chars()
        .nth(plate_index - 1)
        .map(|c| c.to_string())
        .unwrap_or_else(|| default.to_string())
}
