//! 板处理上下文
//!
//! 封装"我正在启动本次运行的第几块板"这一信息

use std::fmt::Display;

/// 板处理上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlateCtx {
    /// 板号（从1开始）
    pub plate_index: usize,

    /// 本次运行的板数
    pub plate_count: usize,

    /// 本块板的板变量
    pub plate_var: String,

    /// 清洗后的条码
    pub identifier: String,
}

impl PlateCtx {
    /// 创建新的板上下文
    pub fn new(plate_index: usize, plate_count: usize, plate_var: String, identifier: String) -> Self {
        Self {
            plate_index,
            plate_count,
            plate_var,
            identifier,
        }
    }
}

impl Display for PlateCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[板 {}/{} 板变量#{} 条码#{}]",
            self.plate_index, self.plate_count, self.plate_var, self.identifier
        )
    }
}
